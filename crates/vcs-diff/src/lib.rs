//! Text diff engine: tokenization, longest-common-sequence search,
//! edit-script optimization, changed-block alignment, intra-line change
//! detection, and multiple output formats (unified, side-by-side, HTML,
//! JSON, Tcl).
//!
//! The pipeline is: [`tokenize`] both inputs into hashed units,
//! compute the raw edit script as copy/delete/insert triples, slide
//! triple boundaries into more readable positions, then render through
//! a [`DiffBuilder`], which aligns each changed block line-by-line and
//! marks up intra-line changes where the format supports them.

pub mod align;
pub mod engine;
pub mod format;
pub mod linechange;
pub mod optimize;
pub mod tokenize;

use thiserror::Error;

pub use align::{block_align, match_dline, AlignOp};
pub use format::{make_builder, DiffBuilder};
pub use linechange::{one_line_change, ChangeSpan, LineChange};
pub use tokenize::{looks_binary, tokenize, Compare, Tokenized, Unit};

use engine::DiffContext;

/// Errors reported by the diff pipeline.
#[derive(Debug, Error)]
pub enum DiffError {
    /// Input contains a NUL byte in its sniff window, or a line too long
    /// to hash.
    #[error("cannot compute difference between binary files")]
    BinaryInput,
    /// The number of changed lines exceeded the configured ceiling.
    #[error("diff has more than {limit} changed lines")]
    TooManyChanges { limit: u32 },
}

/// The output format to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffFormat {
    /// Classic unified text diff.
    #[default]
    Unified,
    /// Unified diff as an HTML table.
    UnifiedHtml,
    /// Side-by-side HTML table.
    SideBySideHtml,
    /// Side-by-side plain text.
    SideBySide,
    /// Array of tagged JSON events.
    Json,
    /// One Tcl list per event.
    Tcl,
    /// Raw event stream with line numbers.
    Debug,
}

/// Options controlling diff behavior.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Ignore trailing whitespace when comparing lines.
    pub ignore_eol_ws: bool,
    /// Ignore all whitespace when comparing lines.
    pub ignore_all_ws: bool,
    /// Strip a carriage return preceding each newline before comparing.
    pub strip_cr: bool,
    /// Diff by word-ish tokens instead of lines.
    pub by_token: bool,
    /// Swap the two inputs (and un-swap the result).
    pub invert: bool,
    /// Show line numbers where the format supports them.
    pub line_numbers: bool,
    /// Context lines around each change; `None` renders everything.
    pub context: Option<u32>,
    /// Total output width for side-by-side text (default 80).
    pub width: u32,
    /// Output format to produce.
    pub format: DiffFormat,
    /// Only show change blocks where exactly one side matches.
    pub filter: Option<regex::bytes::Regex>,
    /// Fail with [`DiffError::TooManyChanges`] past this many changed
    /// lines.
    pub max_changes: Option<u32>,
    /// Base for HTML element ids, so several diffs can share a page.
    pub html_id_base: u32,
}

impl Default for DiffConfig {
    fn default() -> Self {
        DiffConfig {
            ignore_eol_ws: false,
            ignore_all_ws: false,
            strip_cr: false,
            by_token: false,
            invert: false,
            line_numbers: false,
            context: Some(5),
            width: 80,
            format: DiffFormat::Unified,
            filter: None,
            max_changes: None,
            html_id_base: 0,
        }
    }
}

/// One run of the edit script: `copy` common units, then `del` units
/// present only on the left and `ins` units present only on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditTriple {
    pub copy: u32,
    pub del: u32,
    pub ins: u32,
}

impl EditTriple {
    pub fn new(copy: u32, del: u32, ins: u32) -> Self {
        EditTriple { copy, del, ins }
    }
}

/// Outcome of [`text_diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffResult {
    /// The rendered diff.
    Rendered(String),
    /// The inputs are byte-identical.
    Identical,
    /// The inputs differ only in ways the whitespace flags ignore.
    Whitespace,
}

/// Total number of changed lines in an edit script.
pub fn changed_lines(triples: &[EditTriple]) -> u32 {
    triples.iter().map(|t| t.del + t.ins).sum()
}

/// Swap the roles of the two sides of an edit script in place.
pub fn invert_triples(triples: &mut [EditTriple]) {
    for t in triples {
        std::mem::swap(&mut t.del, &mut t.ins);
    }
}

/// Compute the optimized edit script between two texts without
/// rendering it.
pub fn diff_triples(
    left: &[u8],
    right: &[u8],
    cfg: &DiffConfig,
) -> Result<Vec<EditTriple>, DiffError> {
    let (a, b) = if cfg.invert { (right, left) } else { (left, right) };
    if looks_binary(a) || looks_binary(b) {
        return Err(DiffError::BinaryInput);
    }
    let from = tokenize(a, cfg)?;
    let to = tokenize(b, cfg)?;
    let cmp = Compare::from_config(cfg);
    let mut triples = DiffContext::new(&from, &to, cmp).diff_all();
    optimize::optimize(&mut triples, from.units(), to.units());
    if cfg.invert {
        invert_triples(&mut triples);
    }
    Ok(triples)
}

/// Diff two texts and render the result in the configured format.
pub fn text_diff(left: &[u8], right: &[u8], cfg: &DiffConfig) -> Result<DiffResult, DiffError> {
    let (a, b) = if cfg.invert { (right, left) } else { (left, right) };
    if looks_binary(a) || looks_binary(b) {
        return Err(DiffError::BinaryInput);
    }
    let from = tokenize(a, cfg)?;
    let to = tokenize(b, cfg)?;
    let cmp = Compare::from_config(cfg);
    let mut triples = DiffContext::new(&from, &to, cmp).diff_all();
    optimize::optimize(&mut triples, from.units(), to.units());

    if changed_lines(&triples) == 0 {
        if a == b {
            return Ok(DiffResult::Identical);
        }
        // Units compared equal but bytes differ, so the only differences
        // are ones the comparison flags discard.
        if cmp != Compare::Exact || cfg.strip_cr {
            return Ok(DiffResult::Whitespace);
        }
        return Ok(DiffResult::Identical);
    }
    if let Some(limit) = cfg.max_changes {
        if changed_lines(&triples) > limit {
            return Err(DiffError::TooManyChanges { limit });
        }
    }

    let mut builder = make_builder(cfg);
    let out = format::run_formatter(builder.as_mut(), from.units(), to.units(), &triples, cfg);
    Ok(DiffResult::Rendered(out))
}
