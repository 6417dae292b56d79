//! The LCS engine: turns two tokenized sequences into an edit script.
//!
//! The script is a flat list of `(copy, delete, insert)` triples. The
//! engine strips the common prefix and suffix, then recursively splits
//! the remaining range around the best common block found through the
//! hash-chain index, falling back to an exhaustive scan for small ranges
//! where the heuristic finds nothing.

use crate::tokenize::{same_unit, Compare, Tokenized, Unit};
use crate::EditTriple;

/// Initial bound on hash-chain candidates examined per unit.
pub const CHAIN_CUTOFF_INIT: u32 = 4;

/// Escalation factor applied when a truncated chain walk found no match.
pub const CHAIN_CUTOFF_STEP: u32 = 4;

/// Largest chain cutoff tried before giving up on the heuristic.
pub const CHAIN_CUTOFF_MAX: u32 = 64;

/// Ranges whose cell product is below this get the exhaustive O(n*m)
/// search when the hash-chain heuristic finds no match.
pub const OPTIMAL_LCS_BUDGET: usize = 2500;

/// A common block is always interesting when it covers at least 1/Nth of
/// the surrounding range.
pub const INTEREST_FRACTION: usize = 7;

/// A maximal common block: `from[sx..ex]` matches `to[sy..ey]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CommonBlock {
    pub sx: usize,
    pub ex: usize,
    pub sy: usize,
    pub ey: usize,
}

impl CommonBlock {
    fn len(&self) -> usize {
        self.ex - self.sx
    }
}

/// State for one diff computation over two tokenized buffers.
pub(crate) struct DiffContext<'t, 'a> {
    from: &'t Tokenized<'a>,
    to: &'t Tokenized<'a>,
    cmp: Compare,
    triples: Vec<EditTriple>,
}

impl<'t, 'a> DiffContext<'t, 'a> {
    pub fn new(from: &'t Tokenized<'a>, to: &'t Tokenized<'a>, cmp: Compare) -> Self {
        DiffContext {
            from,
            to,
            cmp,
            triples: Vec::new(),
        }
    }

    fn same(&self, i: usize, j: usize) -> bool {
        same_unit(&self.from.units()[i], &self.to.units()[j], self.cmp)
    }

    /// Compute the full edit script.
    pub fn diff_all(mut self) -> Vec<EditTriple> {
        let n1 = self.from.len();
        let n2 = self.to.len();

        // Identical prefix and suffix are handled without recursion; this
        // covers the common case of a single interior edit.
        let mut s1 = 0;
        let mut s2 = 0;
        while s1 < n1 && s2 < n2 && self.same(s1, s2) {
            s1 += 1;
            s2 += 1;
        }
        let mut e1 = n1;
        let mut e2 = n2;
        while e1 > s1 && e2 > s2 && self.same(e1 - 1, e2 - 1) {
            e1 -= 1;
            e2 -= 1;
        }

        if s1 > 0 {
            self.append(s1, 0, 0);
        }
        self.step(s1, e1, s2, e2);
        if n1 > e1 {
            self.append(n1 - e1, 0, 0);
        }

        debug_assert_eq!(
            self.triples.iter().map(|t| (t.copy + t.del) as usize).sum::<usize>(),
            n1
        );
        debug_assert_eq!(
            self.triples.iter().map(|t| (t.copy + t.ins) as usize).sum::<usize>(),
            n2
        );
        self.triples
    }

    fn step(&mut self, s1: usize, e1: usize, s2: usize, e2: usize) {
        if s1 >= e1 && s2 >= e2 {
            return;
        }
        if s1 >= e1 {
            self.append(0, 0, e2 - s2);
            return;
        }
        if s2 >= e2 {
            self.append(0, e1 - s1, 0);
            return;
        }
        match self.longest_common_sequence(s1, e1, s2, e2) {
            Some(b) => {
                self.step(s1, b.sx, s2, b.sy);
                self.append(b.len(), 0, 0);
                self.step(b.ex, e1, b.ey, e2);
            }
            None => self.append(0, e1 - s1, e2 - s2),
        }
    }

    /// Find the best interesting common block within the given range.
    fn longest_common_sequence(
        &self,
        s1: usize,
        e1: usize,
        s2: usize,
        e2: usize,
    ) -> Option<CommonBlock> {
        let found = self.search_common_block(s1, e1, s2, e2);
        match found {
            Some(b) if self.is_interesting(&b, s1, e1, s2, e2) => Some(b),
            _ => None,
        }
    }

    /// Hash-chain search with cutoff escalation, then the exhaustive
    /// fallback for small ranges. No interestingness gating.
    pub(crate) fn search_common_block(
        &self,
        s1: usize,
        e1: usize,
        s2: usize,
        e2: usize,
    ) -> Option<CommonBlock> {
        let mut cutoff = CHAIN_CUTOFF_INIT;
        loop {
            let (best, truncated) = self.chain_search(s1, e1, s2, e2, cutoff);
            if best.is_some() {
                return best;
            }
            if !truncated || cutoff >= CHAIN_CUTOFF_MAX {
                break;
            }
            cutoff *= CHAIN_CUTOFF_STEP;
        }
        if (e1 - s1) * (e2 - s2) < OPTIMAL_LCS_BUDGET {
            return self.optimal_lcs(s1, e1, s2, e2);
        }
        None
    }

    /// One pass over the range, walking each from-unit's hash chain into
    /// `to` and scoring every verified match. Returns the best block and
    /// whether any chain walk was truncated by `cutoff`.
    fn chain_search(
        &self,
        s1: usize,
        e1: usize,
        s2: usize,
        e2: usize,
        cutoff: u32,
    ) -> (Option<CommonBlock>, bool) {
        let from = self.from.units();
        let to = self.to.units();
        let span = ((e1 - s1) + (e2 - s2)) as i64;
        let mut best: Option<(i64, i64, CommonBlock)> = None;
        let mut truncated = false;

        for i in s1..e1 {
            let mut tried = 0u32;
            for j in self.to.chain(from[i].hash()) {
                if j < s2 || j >= e2 {
                    continue;
                }
                tried += 1;
                if tried > cutoff {
                    truncated = true;
                    break;
                }
                if !self.same(i, j) {
                    continue;
                }

                // Extend the match in both directions.
                let (mut sx, mut sy) = (i, j);
                while sx > s1 && sy > s2 && self.same(sx - 1, sy - 1) {
                    sx -= 1;
                    sy -= 1;
                }
                let (mut ex, mut ey) = (i + 1, j + 1);
                while ex < e1 && ey < e2 && self.same(ex, ey) {
                    ex += 1;
                    ey += 1;
                }

                let b = CommonBlock { sx, ex, sy, ey };
                let skew = ((sx - s1) as i64 - (sy - s2) as i64).abs();
                let dist = ((sx + ex) as i64 - (s1 + e1) as i64).abs()
                    + ((sy + ey) as i64 - (s2 + e2) as i64).abs();
                let score = b.len() as i64 * span - (skew + dist);
                let better = match &best {
                    None => true,
                    Some((bs, bd, _)) => score > *bs || (score == *bs && dist < *bd),
                };
                if better {
                    best = Some((score, dist, b));
                }
            }
        }
        (best.map(|(_, _, b)| b), truncated)
    }

    /// Exhaustive search for the longest common run. Quadratic, used only
    /// when the range is small and the heuristic came up empty; the hash
    /// chains can miss the true answer on adversarial inputs.
    fn optimal_lcs(&self, s1: usize, e1: usize, s2: usize, e2: usize) -> Option<CommonBlock> {
        let mut best: Option<CommonBlock> = None;
        let mut best_len = 0;
        for i in s1..e1 {
            for j in s2..e2 {
                if !self.same(i, j) {
                    continue;
                }
                let mut k = 1;
                while i + k < e1 && j + k < e2 && self.same(i + k, j + k) {
                    k += 1;
                }
                if k > best_len {
                    best_len = k;
                    best = Some(CommonBlock {
                        sx: i,
                        ex: i + k,
                        sy: j,
                        ey: j + k,
                    });
                }
            }
        }
        best
    }

    /// Reject common blocks that are probably just shared indentation from
    /// a re-indent edit rather than genuinely matching content.
    fn is_interesting(
        &self,
        b: &CommonBlock,
        s1: usize,
        e1: usize,
        s2: usize,
        e2: usize,
    ) -> bool {
        let from = self.from.units();
        let to = self.to.units();

        if b.len() * INTEREST_FRACTION >= (e1 - s1).min(e2 - s2) {
            return true;
        }

        // A block of nothing but blank and one-character lines is noise.
        if from[b.sx..b.ex].iter().all(|u| u.trim_len() <= 1) {
            return false;
        }

        // Accept only if some line in the block is, after trimming, unique
        // within the whole surrounding range on both sides. Repeated
        // boilerplate fails this test.
        for k in b.sx..b.ex {
            let z = from[k].trimmed();
            let n_from = from[s1..e1].iter().filter(|u| u.trimmed() == z).count();
            if n_from != 1 {
                continue;
            }
            let n_to = to[s2..e2].iter().filter(|u| u.trimmed() == z).count();
            if n_to == 1 {
                return true;
            }
        }
        false
    }

    /// Append a triple, coalescing with the previous one when the script's
    /// meaning is unchanged.
    fn append(&mut self, copy: usize, del: usize, ins: usize) {
        if let Some(last) = self.triples.last_mut() {
            if last.ins == 0 {
                if last.del == 0 {
                    last.copy += copy as u32;
                    last.del += del as u32;
                    last.ins += ins as u32;
                    return;
                }
                if copy == 0 {
                    last.del += del as u32;
                    last.ins += ins as u32;
                    return;
                }
            } else if copy == 0 && del == 0 {
                last.ins += ins as u32;
                return;
            }
        }
        self.triples.push(EditTriple {
            copy: copy as u32,
            del: del as u32,
            ins: ins as u32,
        });
    }
}

/// Best common block between two standalone unit slices, compared with
/// whitespace ignored. Used by the block aligner's pre-split.
pub(crate) fn common_block_ignore_ws<'a>(
    left: &[Unit<'a>],
    right: &[Unit<'a>],
) -> Option<(usize, usize, usize)> {
    let lw = Tokenized::rehash_ignore_ws(left);
    let rw = Tokenized::rehash_ignore_ws(right);
    let ctx = DiffContext::new(&lw, &rw, Compare::IgnoreAllWs);
    ctx.search_common_block(0, lw.len(), 0, rw.len())
        .map(|b| (b.sx, b.sy, b.len()))
}
