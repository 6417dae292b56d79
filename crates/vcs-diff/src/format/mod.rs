//! Diff rendering: the builder abstraction and the formatting driver.
//!
//! A [`DiffBuilder`] receives the final, aligned edit script as a series
//! of calls and accumulates its output format. The driver walks the
//! optimized triples, merges change blocks separated by small context
//! gaps, applies the optional regex filter, and dispatches each block
//! through the block aligner.

pub mod debug;
pub mod html;
pub mod json;
pub mod split;
pub mod tcl;
pub mod unified;

use bstr::BStr;

use crate::align::{block_align, AlignOp, ALIGN_COMPLEXITY_BUDGET};
use crate::tokenize::{Compare, Unit};
use crate::{DiffConfig, DiffFormat, EditTriple};

/// Gaps of at most this many context lines always merge the neighboring
/// change blocks.
pub const GAP_MERGE_MAX: u32 = 2;

/// Larger gaps merge when `gap * GAP_MERGE_RATIO` does not exceed the
/// surrounding change volume.
pub const GAP_MERGE_RATIO: u32 = 8;

/// The pluggable renderer: one implementation per output format.
///
/// Implementations own their running left/right line counters and any
/// pending-output buffers; a builder lives for exactly one diff and its
/// accumulated output is taken by [`DiffBuilder::end`].
pub trait DiffBuilder {
    /// `n_left`/`n_right` lines elided from the two sides. `is_final` is
    /// set when nothing follows the skip.
    fn skip(&mut self, n_left: u32, n_right: u32, is_final: bool);
    /// A line present on both sides.
    fn common(&mut self, line: &BStr);
    /// A line present only on the right.
    fn insert(&mut self, line: &BStr);
    /// A line present only on the left.
    fn delete(&mut self, line: &BStr);
    /// A left line wholly replaced by a right line.
    fn replace(&mut self, left: &BStr, right: &BStr);
    /// A left line edited in place into a right line.
    fn edit(&mut self, left: &BStr, right: &BStr);
    /// Finish and take the rendered output.
    fn end(&mut self) -> String;
}

/// Construct the builder selected by the configuration.
pub fn make_builder(cfg: &DiffConfig) -> Box<dyn DiffBuilder> {
    match cfg.format {
        DiffFormat::Unified => Box::new(unified::UnifiedBuilder::new(cfg)),
        DiffFormat::UnifiedHtml => Box::new(html::UnifiedHtmlBuilder::new(cfg)),
        DiffFormat::SideBySideHtml => Box::new(html::SplitHtmlBuilder::new(cfg)),
        DiffFormat::SideBySide => Box::new(split::SplitTextBuilder::new(cfg)),
        DiffFormat::Json => Box::new(json::JsonBuilder::new()),
        DiffFormat::Tcl => Box::new(tcl::TclBuilder::new()),
        DiffFormat::Debug => Box::new(debug::DebugBuilder::new()),
    }
}

/// Merge change blocks separated by short context gaps, so one conceptual
/// edit is aligned as one block instead of being visually fragmented. The
/// gap lines join both sides of the merged block and stay within the
/// aligner's complexity budget.
fn merge_small_gaps(triples: &[EditTriple]) -> Vec<EditTriple> {
    let mut t: Vec<EditTriple> = triples.to_vec();
    let mut i = 0;
    while i + 1 < t.len() {
        let gap = t[i + 1].copy;
        let vol = t[i].del + t[i].ins + t[i + 1].del + t[i + 1].ins;
        let big_l = t[i].del + gap + t[i + 1].del;
        let big_r = t[i].ins + gap + t[i + 1].ins;
        let mergeable = t[i].del + t[i].ins > 0
            && t[i + 1].del + t[i + 1].ins > 0
            && (gap <= GAP_MERGE_MAX || gap * GAP_MERGE_RATIO <= vol)
            && (big_l as usize) * (big_r as usize) <= ALIGN_COMPLEXITY_BUDGET;
        if mergeable {
            t[i].del = big_l;
            t[i].ins = big_r;
            t.remove(i + 1);
        } else {
            i += 1;
        }
    }
    t
}

/// Walk the optimized triples and feed the builder.
pub(crate) fn run_formatter(
    builder: &mut dyn DiffBuilder,
    from: &[Unit<'_>],
    to: &[Unit<'_>],
    triples: &[EditTriple],
    cfg: &DiffConfig,
) -> String {
    let cmp = Compare::from_config(cfg);
    let triples = merge_small_gaps(triples);
    let mut i1 = 0usize;
    let mut i2 = 0usize;

    for (idx, tr) in triples.iter().enumerate() {
        let ncopy = tr.copy as usize;
        let has_change = tr.del + tr.ins > 0;

        // Context lines around the copy run: trailing context belongs to
        // the previous change, leading context to this triple's change.
        let trailing = if idx > 0 { cfg.context } else { Some(0) };
        let leading = if has_change { cfg.context } else { Some(0) };
        match (trailing, leading) {
            (Some(t_ctx), Some(l_ctx)) => {
                let t_ctx = t_ctx as usize;
                let l_ctx = l_ctx as usize;
                if ncopy <= t_ctx + l_ctx {
                    for k in 0..ncopy {
                        builder.common(from[i1 + k].as_bstr());
                    }
                } else {
                    for k in 0..t_ctx {
                        builder.common(from[i1 + k].as_bstr());
                    }
                    let skipped = (ncopy - t_ctx - l_ctx) as u32;
                    builder.skip(skipped, skipped, !has_change);
                    for k in ncopy - l_ctx..ncopy {
                        builder.common(from[i1 + k].as_bstr());
                    }
                }
            }
            // Unlimited context: render every common line.
            _ => {
                for k in 0..ncopy {
                    builder.common(from[i1 + k].as_bstr());
                }
            }
        }
        i1 += ncopy;
        i2 += ncopy;

        if !has_change {
            continue;
        }
        let del = tr.del as usize;
        let ins = tr.ins as usize;
        let lseg = &from[i1..i1 + del];
        let rseg = &to[i2..i2 + ins];

        // A block where the filter's match status is the same on both
        // sides did not change what the caller cares about: elide it.
        if let Some(re) = &cfg.filter {
            let lm = lseg.iter().any(|u| re.is_match(u.bytes()));
            let rm = rseg.iter().any(|u| re.is_match(u.bytes()));
            if lm == rm {
                builder.skip(del as u32, ins as u32, false);
                i1 += del;
                i2 += ins;
                continue;
            }
        }

        let ops = block_align(lseg, rseg, cmp == Compare::Exact);
        let (mut a, mut b) = (i1, i2);
        for op in ops {
            match op {
                AlignOp::Delete => {
                    builder.delete(from[a].as_bstr());
                    a += 1;
                }
                AlignOp::Insert => {
                    builder.insert(to[b].as_bstr());
                    b += 1;
                }
                AlignOp::Replace => {
                    builder.replace(from[a].as_bstr(), to[b].as_bstr());
                    a += 1;
                    b += 1;
                }
                AlignOp::Edit => {
                    // Identical pairs show up when a merged gap line aligns
                    // with itself; render those as common lines. Terminator
                    // presence is part of identity here, or a final line
                    // losing its newline would vanish from the output.
                    if from[a].bytes() == to[b].bytes() && from[a].has_eol() == to[b].has_eol() {
                        builder.common(from[a].as_bstr());
                    } else {
                        builder.edit(from[a].as_bstr(), to[b].as_bstr());
                    }
                    a += 1;
                    b += 1;
                }
            }
        }
        i1 += del;
        i2 += ins;
    }

    builder.end()
}

/// Escape a byte string for HTML element content.
pub(crate) fn html_escape(z: &[u8]) -> String {
    let mut out = String::with_capacity(z.len());
    for piece in String::from_utf8_lossy(z).chars() {
        match piece {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(copy: u32, del: u32, ins: u32) -> EditTriple {
        EditTriple { copy, del, ins }
    }

    #[test]
    fn tiny_gap_merges() {
        let merged = merge_small_gaps(&[t(1, 1, 1), t(2, 1, 1), t(3, 0, 0)]);
        assert_eq!(merged, vec![t(1, 4, 4), t(3, 0, 0)]);
    }

    #[test]
    fn wide_gap_stays() {
        let merged = merge_small_gaps(&[t(1, 1, 1), t(40, 1, 1)]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn oversized_merge_is_refused() {
        // Merging would exceed the aligner budget even though the gap
        // ratio allows it.
        let merged = merge_small_gaps(&[t(0, 30, 30), t(2, 30, 30)]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn escape_html() {
        assert_eq!(html_escape(b"a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
