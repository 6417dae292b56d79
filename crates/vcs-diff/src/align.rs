//! Block alignment: fine-grained correspondence between the deleted and
//! inserted lines of one changed region.
//!
//! Small blocks get a Wagner minimum-edit-distance dynamic program with a
//! similarity-weighted substitution cost. Large blocks are first attacked
//! with a whitespace-insensitive LCS pre-split (which salvages re-indent
//! edits cheaply) and otherwise split divide-and-conquer style, so cost
//! stays near-linear instead of quadratic.

use crate::engine::common_block_ignore_ws;
use crate::tokenize::Unit;

/// Maximum `left * right` cell product handled by the exact DP.
pub const ALIGN_COMPLEXITY_BUDGET: usize = 1225;

/// Cost of deleting or inserting one line in the DP.
pub const INDEL_COST: u32 = 50;

/// Minimum run length accepted from the whitespace-insensitive pre-split.
pub const PRESPLIT_MIN_RUN: usize = 5;

/// Per-line byte window examined by [`match_dline`].
pub const MATCH_WINDOW: usize = 250;

/// One step of a block alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignOp {
    /// Consume one left line with no counterpart.
    Delete,
    /// Consume one right line with no counterpart.
    Insert,
    /// One left line was edited in place into one right line.
    Edit,
    /// One left line was wholly replaced by one right line.
    Replace,
}

/// Similarity score between two lines: 0 (identical after whitespace
/// trimming) through 100 (nothing in common).
///
/// The score is derived from the longer of the common prefix and the
/// longest common substring, looking at no more than [`MATCH_WINDOW`]
/// bytes of each line.
pub fn match_dline(a: &Unit<'_>, b: &Unit<'_>) -> u32 {
    let mut za = a.trimmed();
    let mut zb = b.trimmed();
    if za.len() > MATCH_WINDOW {
        za = &za[..MATCH_WINDOW];
    }
    if zb.len() > MATCH_WINDOW {
        zb = &zb[..MATCH_WINDOW];
    }
    if za == zb {
        return 0;
    }
    let avg = (za.len() + zb.len()) / 2;
    if avg == 0 {
        return 0;
    }

    let mut best = za
        .iter()
        .zip(zb.iter())
        .take_while(|(x, y)| x == y)
        .count();

    // Longest common substring by direct scan; lines are short and the
    // window bounds the worst case.
    for i in 0..za.len() {
        if za.len() - i <= best {
            break;
        }
        for j in 0..zb.len() {
            if za[i] != zb[j] {
                continue;
            }
            let mut k = 1;
            while i + k < za.len() && j + k < zb.len() && za[i + k] == zb[j + k] {
                k += 1;
            }
            if k > best {
                best = k;
            }
        }
    }

    if best >= avg {
        5
    } else {
        (5 + (avg - best) * 95 / avg) as u32
    }
}

/// Align `left` against `right`, producing at most `left.len() +
/// right.len()` operations whose left/right consumption covers each side
/// exactly.
///
/// `ws_significant` enables the whitespace-insensitive pre-split for
/// oversized blocks (pointless when the comparison already ignores
/// whitespace).
pub fn block_align(left: &[Unit<'_>], right: &[Unit<'_>], ws_significant: bool) -> Vec<AlignOp> {
    let mut raw = Vec::with_capacity(left.len() + right.len());
    align_inner(left, right, ws_significant, &mut raw);
    // Pairing runs once over the assembled list so delete and insert runs
    // that meet at a recursive split boundary still fuse into Replace rows.
    let mut out = Vec::with_capacity(raw.len());
    pair_replacements(raw, &mut out);
    out
}

fn align_inner(
    left: &[Unit<'_>],
    right: &[Unit<'_>],
    ws_significant: bool,
    out: &mut Vec<AlignOp>,
) {
    if left.is_empty() {
        out.extend(std::iter::repeat(AlignOp::Insert).take(right.len()));
        return;
    }
    if right.is_empty() {
        out.extend(std::iter::repeat(AlignOp::Delete).take(left.len()));
        return;
    }
    if left.len() * right.len() > ALIGN_COMPLEXITY_BUDGET {
        if ws_significant && presplit(left, right, out) {
            return;
        }
        divide(left, right, ws_significant, out);
        return;
    }
    wagner(left, right, out);
}

/// Exact alignment by Wagner's minimum-edit-distance algorithm.
fn wagner(left: &[Unit<'_>], right: &[Unit<'_>], out: &mut Vec<AlignOp>) {
    let ma = left.len();
    let mb = right.len();
    let cols = mb + 1;

    // Back-pointers: 1 = delete, 2 = insert, 3 = substitute.
    let mut cost = vec![0u32; (ma + 1) * cols];
    let mut dir = vec![0u8; (ma + 1) * cols];
    for j in 1..=mb {
        cost[j] = cost[j - 1] + INDEL_COST;
        dir[j] = 2;
    }
    for i in 1..=ma {
        cost[i * cols] = cost[(i - 1) * cols] + INDEL_COST;
        dir[i * cols] = 1;
        for j in 1..=mb {
            let mut c = cost[i * cols + j - 1] + INDEL_COST;
            let mut d = 2u8;
            let x = cost[(i - 1) * cols + j] + INDEL_COST;
            if x < c {
                c = x;
                d = 1;
            }
            let x = cost[(i - 1) * cols + j - 1] + match_dline(&left[i - 1], &right[j - 1]);
            if x < c {
                c = x;
                d = 3;
            }
            cost[i * cols + j] = c;
            dir[i * cols + j] = d;
        }
    }

    let mut rev = Vec::with_capacity(ma + mb);
    let (mut i, mut j) = (ma, mb);
    while i > 0 || j > 0 {
        match dir[i * cols + j] {
            1 => {
                rev.push(AlignOp::Delete);
                i -= 1;
            }
            2 => {
                rev.push(AlignOp::Insert);
                j -= 1;
            }
            _ => {
                rev.push(AlignOp::Edit);
                i -= 1;
                j -= 1;
            }
        }
    }
    rev.reverse();
    out.extend(rev);
}

/// Pair each delete run with the insert run that follows it: the matched
/// prefix becomes one Replace per line pair, keeping side-by-side output
/// to one row per replaced line. Applied to the complete alignment, never
/// to the fragments of one recursion step.
fn pair_replacements(ops: Vec<AlignOp>, out: &mut Vec<AlignOp>) {
    let mut k = 0;
    while k < ops.len() {
        if ops[k] != AlignOp::Delete {
            out.push(ops[k]);
            k += 1;
            continue;
        }
        let mut nd = 0;
        while k + nd < ops.len() && ops[k + nd] == AlignOp::Delete {
            nd += 1;
        }
        let mut ni = 0;
        while k + nd + ni < ops.len() && ops[k + nd + ni] == AlignOp::Insert {
            ni += 1;
        }
        let npair = nd.min(ni);
        out.extend(std::iter::repeat(AlignOp::Replace).take(npair));
        out.extend(std::iter::repeat(AlignOp::Delete).take(nd - npair));
        out.extend(std::iter::repeat(AlignOp::Insert).take(ni - npair));
        k += nd + ni;
    }
}

/// Re-hash both blocks ignoring whitespace and look for a long common
/// run. When one exists the two sides of the run are aligned recursively
/// and the run itself is emitted pairwise.
fn presplit(left: &[Unit<'_>], right: &[Unit<'_>], out: &mut Vec<AlignOp>) -> bool {
    let Some((sx, sy, n)) = common_block_ignore_ws(left, right) else {
        return false;
    };
    if n < PRESPLIT_MIN_RUN {
        return false;
    }
    align_inner(&left[..sx], &right[..sy], true, out);
    out.extend(std::iter::repeat(AlignOp::Edit).take(n));
    align_inner(&left[sx + n..], &right[sy + n..], true, out);
    true
}

/// Divide and conquer: split the larger block at its midpoint, find the
/// best-matching line in the smaller block (biased toward its
/// proportional position), and recurse on both halves.
fn divide(left: &[Unit<'_>], right: &[Unit<'_>], ws_significant: bool, out: &mut Vec<AlignOp>) {
    if left.len() >= right.len() {
        let mid = left.len() / 2;
        let split = best_split(&left[mid], right, mid * right.len() / left.len());
        align_inner(&left[..mid], &right[..split], ws_significant, out);
        align_inner(&left[mid..], &right[split..], ws_significant, out);
    } else {
        let mid = right.len() / 2;
        let split = best_split(&right[mid], left, mid * left.len() / right.len());
        align_inner(&left[..split], &right[..mid], ws_significant, out);
        align_inner(&left[split..], &right[mid..], ws_significant, out);
    }
}

/// Index in `candidates` best matching `pivot`, scoring similarity plus a
/// penalty for distance from the proportional position.
fn best_split(pivot: &Unit<'_>, candidates: &[Unit<'_>], proportional: usize) -> usize {
    let n = candidates.len();
    let mut best_idx = proportional.min(n);
    let mut best_score = u32::MAX;
    for (j, cand) in candidates.iter().enumerate() {
        let dist = j.abs_diff(proportional);
        let penalty = (dist * 100 / n.max(1)) as u32;
        let score = match_dline(pivot, cand) + penalty;
        if score < best_score {
            best_score = score;
            best_idx = j;
        }
    }
    best_idx
}
