//! Plain-text unified diff builder.
//!
//! Classic `@@ -l,n +r,m @@` hunks with space/minus/plus line prefixes.
//! Hunk boundaries fall wherever the driver skips common lines; within a
//! change run all deletions are emitted before the insertions.

use bstr::{BStr, ByteSlice};

use super::DiffBuilder;
use crate::DiffConfig;

/// Render one side of a hunk range. `start` is 0-based. A count of 1 is
/// elided; a count of 0 names the line before the change, so the number
/// stays 0-based (`patch` reads `-N,0` as "insert after line N").
fn range(start: u32, count: u32) -> String {
    match count {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        n => format!("{},{}", start + 1, n),
    }
}

pub struct UnifiedBuilder {
    out: String,
    hunk: String,
    pend_del: String,
    pend_ins: String,
    ln_left: u32,
    ln_right: u32,
    hunk_start_left: u32,
    hunk_start_right: u32,
    hunk_left: u32,
    hunk_right: u32,
}

impl UnifiedBuilder {
    pub fn new(_cfg: &DiffConfig) -> Self {
        UnifiedBuilder {
            out: String::new(),
            hunk: String::new(),
            pend_del: String::new(),
            pend_ins: String::new(),
            ln_left: 0,
            ln_right: 0,
            hunk_start_left: 0,
            hunk_start_right: 0,
            hunk_left: 0,
            hunk_right: 0,
        }
    }

    fn note_hunk_start(&mut self) {
        if self.hunk.is_empty() && self.pend_del.is_empty() && self.pend_ins.is_empty() {
            self.hunk_start_left = self.ln_left;
            self.hunk_start_right = self.ln_right;
        }
    }

    fn push_pending(&mut self) {
        self.hunk.push_str(&self.pend_del);
        self.hunk.push_str(&self.pend_ins);
        self.pend_del.clear();
        self.pend_ins.clear();
    }

    fn flush_hunk(&mut self) {
        self.push_pending();
        if self.hunk.is_empty() {
            return;
        }
        self.out.push_str(&format!(
            "@@ -{} +{} @@\n",
            range(self.hunk_start_left, self.hunk_left),
            range(self.hunk_start_right, self.hunk_right)
        ));
        self.out.push_str(&self.hunk);
        self.hunk.clear();
        self.hunk_left = 0;
        self.hunk_right = 0;
    }
}

impl DiffBuilder for UnifiedBuilder {
    fn skip(&mut self, n_left: u32, n_right: u32, _is_final: bool) {
        self.flush_hunk();
        self.ln_left += n_left;
        self.ln_right += n_right;
    }

    fn common(&mut self, line: &BStr) {
        self.note_hunk_start();
        self.push_pending();
        self.hunk.push(' ');
        self.hunk.push_str(&line.to_str_lossy());
        self.hunk.push('\n');
        self.ln_left += 1;
        self.ln_right += 1;
        self.hunk_left += 1;
        self.hunk_right += 1;
    }

    fn insert(&mut self, line: &BStr) {
        self.note_hunk_start();
        self.pend_ins.push('+');
        self.pend_ins.push_str(&line.to_str_lossy());
        self.pend_ins.push('\n');
        self.ln_right += 1;
        self.hunk_right += 1;
    }

    fn delete(&mut self, line: &BStr) {
        self.note_hunk_start();
        self.pend_del.push('-');
        self.pend_del.push_str(&line.to_str_lossy());
        self.pend_del.push('\n');
        self.ln_left += 1;
        self.hunk_left += 1;
    }

    fn replace(&mut self, left: &BStr, right: &BStr) {
        self.delete(left);
        self.insert(right);
    }

    fn edit(&mut self, left: &BStr, right: &BStr) {
        self.delete(left);
        self.insert(right);
    }

    fn end(&mut self) -> String {
        self.flush_hunk();
        std::mem::take(&mut self.out)
    }
}
