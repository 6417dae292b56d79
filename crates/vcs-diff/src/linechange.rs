//! Intra-line change detection.
//!
//! Given two lines already known to be similar, find a small set of byte
//! spans that differ: strip the common prefix and suffix (without ever
//! splitting a multi-byte UTF-8 sequence), then recursively carve the
//! remainder around long common substrings, stopping at
//! [`MAX_SPANS`] spans or when no common substring of at least
//! [`MIN_COMMON_SUBSTR`] bytes remains.

use serde::Serialize;

/// Maximum number of change spans reported per line pair.
pub const MAX_SPANS: usize = 8;

/// Shortest common substring worth recursing around.
pub const MIN_COMMON_SUBSTR: usize = 6;

/// One differing byte range. Zero `left_len` is a pure insertion, zero
/// `right_len` a pure deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeSpan {
    pub left_start: u32,
    pub left_len: u32,
    pub right_start: u32,
    pub right_len: u32,
}

/// The ordered, non-overlapping change spans for one pair of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineChange {
    pub spans: Vec<ChangeSpan>,
}

impl LineChange {
    /// True when the lines are identical.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

#[inline]
fn is_utf8_continuation(b: u8) -> bool {
    b & 0xc0 == 0x80
}

#[inline]
fn is_ws(b: u8) -> bool {
    crate::tokenize::is_ws(b)
}

fn is_word_boundary(b: u8) -> bool {
    !b.is_ascii_alphanumeric() && b < 0x80
}

/// Compute the minimal change spans between two lines.
pub fn one_line_change(left: &[u8], right: &[u8]) -> LineChange {
    let mut chg = LineChange::default();
    if left == right {
        return chg;
    }

    // Common prefix, never ending inside a multi-byte sequence.
    let mut pre = left
        .iter()
        .zip(right.iter())
        .take_while(|(a, b)| a == b)
        .count();
    while pre > 0
        && (left.get(pre).is_some_and(|&b| is_utf8_continuation(b))
            || right.get(pre).is_some_and(|&b| is_utf8_continuation(b)))
    {
        pre -= 1;
    }

    // Common suffix, computed over the whole lines so that a prefix/suffix
    // overlap (the pure insertion or deletion case) is visible.
    let mut suf = left
        .iter()
        .rev()
        .zip(right.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    while suf > 0 && is_utf8_continuation(left[left.len() - suf]) {
        suf -= 1;
    }

    // When the prefix and suffix overlap, the shorter line is wholly
    // contained in the longer and the attachment point of the insertion
    // (or deletion) is ambiguous. Slide it to the nicest boundary.
    let min_len = left.len().min(right.len());
    let overlap = (pre + suf).saturating_sub(min_len);
    if overlap > 0 {
        pre = nicer_break(left, right, pre, overlap);
        suf = min_len - pre;
    }

    split_spans(
        &left[pre..left.len() - suf],
        &right[pre..right.len() - suf],
        pre as u32,
        pre as u32,
        MAX_SPANS,
        &mut chg.spans,
    );
    chg
}

/// Choose the alignment point for an ambiguous pure insertion/deletion:
/// the break may move left by up to `overlap` bytes from `pre`. Prefer
/// column 0 for indentation-only changes, then whitespace, then
/// punctuation, rather than landing mid-word.
fn nicer_break(left: &[u8], right: &[u8], pre: usize, overlap: usize) -> usize {
    let lo = pre - overlap;
    // Indentation-only change: pin it to column 0.
    if left[..pre].iter().all(|&b| is_ws(b)) && lo == 0 {
        return 0;
    }
    let longer = if left.len() >= right.len() { left } else { right };
    let mut best = pre;
    let mut best_rank = 0;
    for p in (lo..=pre).rev() {
        let rank = match p.checked_sub(1).map(|q| longer[q]) {
            None => 3,
            Some(b) if is_ws(b) => 2,
            Some(b) if is_word_boundary(b) => 1,
            Some(_) => 0,
        };
        if rank > best_rank {
            best_rank = rank;
            best = p;
        }
    }
    best
}

/// Recursively split the differing region around its longest common
/// substring. `budget` is the number of spans this region may still emit.
fn split_spans(
    left: &[u8],
    right: &[u8],
    loff: u32,
    roff: u32,
    budget: usize,
    out: &mut Vec<ChangeSpan>,
) {
    if left.is_empty() && right.is_empty() {
        return;
    }
    let whole = ChangeSpan {
        left_start: loff,
        left_len: left.len() as u32,
        right_start: roff,
        right_len: right.len() as u32,
    };
    if budget <= 1 || left.is_empty() || right.is_empty() {
        out.push(whole);
        return;
    }
    match longest_common_substring(left, right) {
        Some((i, j, n)) if n >= MIN_COMMON_SUBSTR => {
            let before = out.len();
            // The left region may spend all but one span; the remainder is
            // reserved for the right region.
            split_spans(&left[..i], &right[..j], loff, roff, budget - 1, out);
            let emitted = out.len() - before;
            split_spans(
                &left[i + n..],
                &right[j + n..],
                loff + (i + n) as u32,
                roff + (j + n) as u32,
                budget.saturating_sub(emitted).max(1),
                out,
            );
        }
        _ => out.push(whole),
    }
}

/// Longest common substring by direct scan; fine for single lines.
fn longest_common_substring(a: &[u8], b: &[u8]) -> Option<(usize, usize, usize)> {
    let mut best: Option<(usize, usize, usize)> = None;
    let mut best_n = 0;
    for i in 0..a.len() {
        if a.len() - i <= best_n {
            break;
        }
        for j in 0..b.len() {
            if a[i] != b[j] {
                continue;
            }
            let mut n = 1;
            while i + n < a.len() && j + n < b.len() && a[i + n] == b[j + n] {
                n += 1;
            }
            if n > best_n {
                best_n = n;
                best = Some((i, j, n));
            }
        }
    }
    best
}
