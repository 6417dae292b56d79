//! Plain-text side-by-side builder.

use bstr::{BStr, ByteSlice};
use unicode_width::UnicodeWidthChar;

use super::DiffBuilder;
use crate::DiffConfig;

/// Two-column text diff. Each row is
/// `[lineno] left-text marker [lineno] right-text` where the marker is
/// one of space (common), `<` (left only), `>` (right only) or `|`
/// (changed). Columns are padded by display width so that multibyte
/// and wide characters keep the gutter aligned.
pub struct SplitTextBuilder {
    out: String,
    width: usize,
    numbers: bool,
    ln_left: u32,
    ln_right: u32,
}

/// Truncate `line` to at most `width` display columns, padding with
/// spaces up to exactly `width`.
fn pad_to_width(line: &BStr, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in line.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(1);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    for _ in used..width {
        out.push(' ');
    }
    out
}

impl SplitTextBuilder {
    pub fn new(cfg: &DiffConfig) -> Self {
        SplitTextBuilder {
            out: String::new(),
            width: cfg.width.max(20) as usize / 2,
            numbers: cfg.line_numbers,
            ln_left: 0,
            ln_right: 0,
        }
    }

    fn row(&mut self, left: Option<&BStr>, mark: char, right: Option<&BStr>) {
        let empty = BStr::new(b"");
        if self.numbers {
            match left {
                Some(_) => self.out.push_str(&format!("{:5} ", self.ln_left + 1)),
                None => self.out.push_str("      "),
            }
        }
        self.out
            .push_str(&pad_to_width(left.unwrap_or(empty), self.width));
        self.out.push(' ');
        self.out.push(mark);
        self.out.push(' ');
        if self.numbers {
            match right {
                Some(_) => self.out.push_str(&format!("{:5} ", self.ln_right + 1)),
                None => self.out.push_str("      "),
            }
        }
        // Right column is not padded; trailing blanks would be noise.
        let r = String::from_utf8_lossy(right.unwrap_or(empty));
        self.out.push_str(r.trim_end_matches(' '));
        self.out.push('\n');
        if left.is_some() {
            self.ln_left += 1;
        }
        if right.is_some() {
            self.ln_right += 1;
        }
    }
}

impl DiffBuilder for SplitTextBuilder {
    fn skip(&mut self, n_left: u32, n_right: u32, is_final: bool) {
        self.ln_left += n_left;
        self.ln_right += n_right;
        if !is_final {
            for _ in 0..self.width + 2 {
                self.out.push('.');
            }
            self.out.push('\n');
        }
    }

    fn common(&mut self, line: &BStr) {
        self.row(Some(line), ' ', Some(line));
    }

    fn insert(&mut self, line: &BStr) {
        self.row(None, '>', Some(line));
    }

    fn delete(&mut self, line: &BStr) {
        self.row(Some(line), '<', None);
    }

    fn replace(&mut self, left: &BStr, right: &BStr) {
        self.row(Some(left), '|', Some(right));
    }

    fn edit(&mut self, left: &BStr, right: &BStr) {
        self.row(Some(left), '|', Some(right));
    }

    fn end(&mut self) -> String {
        std::mem::take(&mut self.out)
    }
}
