//! HTML diff builders: unified table and side-by-side table.
//!
//! Both builders accumulate their table columns in parallel scratch
//! buffers and splice them into `<td><pre>` cells when a block ends at a
//! skip boundary. Element ids are derived from the session's id counter,
//! never from process-wide state.

use bstr::BStr;

use super::{html_escape, DiffBuilder};
use crate::linechange::one_line_change;
use crate::DiffConfig;

/// Wrap `tag` markup around the changed spans of one side of a line.
/// `spans` holds `(start, len)` pairs in ascending order.
fn mark_spans(line: &[u8], spans: &[(usize, usize)], tag: &str) -> String {
    let mut out = String::new();
    let mut pos = 0;
    for &(start, len) in spans {
        if len == 0 {
            continue;
        }
        out.push_str(&html_escape(&line[pos..start]));
        out.push_str(&format!("<{tag}>"));
        out.push_str(&html_escape(&line[start..start + len]));
        out.push_str(&format!("</{tag}>"));
        pos = start + len;
    }
    out.push_str(&html_escape(&line[pos..]));
    out
}

fn edited_sides(left: &[u8], right: &[u8]) -> (String, String) {
    let chg = one_line_change(left, right);
    let lspans: Vec<(usize, usize)> = chg
        .spans
        .iter()
        .map(|s| (s.left_start as usize, s.left_len as usize))
        .collect();
    let rspans: Vec<(usize, usize)> = chg
        .spans
        .iter()
        .map(|s| (s.right_start as usize, s.right_len as usize))
        .collect();
    (
        mark_spans(left, &lspans, "del"),
        mark_spans(right, &rspans, "ins"),
    )
}

/// Unified diff rendered as a three-column HTML table: left line number,
/// right line number, text.
pub struct UnifiedHtmlBuilder {
    out: String,
    col_ln1: String,
    col_ln2: String,
    col_txt: String,
    ln_left: u32,
    ln_right: u32,
    id: u32,
}

impl UnifiedHtmlBuilder {
    pub fn new(cfg: &DiffConfig) -> Self {
        let id = cfg.html_id_base;
        UnifiedHtmlBuilder {
            out: format!("<table class=\"udiff\" id=\"udiff-{id}\">\n"),
            col_ln1: String::new(),
            col_ln2: String::new(),
            col_txt: String::new(),
            ln_left: 0,
            ln_right: 0,
            id,
        }
    }

    fn row(&mut self, ln1: Option<u32>, ln2: Option<u32>, txt: String) {
        match ln1 {
            Some(n) => self.col_ln1.push_str(&format!("{}\n", n + 1)),
            None => self.col_ln1.push('\n'),
        }
        match ln2 {
            Some(n) => self.col_ln2.push_str(&format!("{}\n", n + 1)),
            None => self.col_ln2.push('\n'),
        }
        self.col_txt.push_str(&txt);
        self.col_txt.push('\n');
    }

    fn flush_block(&mut self) {
        if self.col_txt.is_empty() {
            return;
        }
        self.out.push_str("<tr>");
        self.out
            .push_str(&format!("<td class=\"lineno\"><pre>{}</pre></td>", self.col_ln1));
        self.out
            .push_str(&format!("<td class=\"lineno\"><pre>{}</pre></td>", self.col_ln2));
        self.out
            .push_str(&format!("<td class=\"difftxt\"><pre>{}</pre></td>", self.col_txt));
        self.out.push_str("</tr>\n");
        self.col_ln1.clear();
        self.col_ln2.clear();
        self.col_txt.clear();
    }
}

impl DiffBuilder for UnifiedHtmlBuilder {
    fn skip(&mut self, n_left: u32, n_right: u32, is_final: bool) {
        self.flush_block();
        self.ln_left += n_left;
        self.ln_right += n_right;
        if !is_final {
            self.out.push_str(&format!(
                "<tr class=\"diffskip\" id=\"skip-{}-{}\"><td colspan=\"3\">&#8230;</td></tr>\n",
                self.id, self.ln_left
            ));
        }
    }

    fn common(&mut self, line: &BStr) {
        let txt = html_escape(line);
        let (l, r) = (self.ln_left, self.ln_right);
        self.row(Some(l), Some(r), txt);
        self.ln_left += 1;
        self.ln_right += 1;
    }

    fn insert(&mut self, line: &BStr) {
        let txt = format!("<ins>{}</ins>", html_escape(line));
        let r = self.ln_right;
        self.row(None, Some(r), txt);
        self.ln_right += 1;
    }

    fn delete(&mut self, line: &BStr) {
        let txt = format!("<del>{}</del>", html_escape(line));
        let l = self.ln_left;
        self.row(Some(l), None, txt);
        self.ln_left += 1;
    }

    fn replace(&mut self, left: &BStr, right: &BStr) {
        self.delete(left);
        self.insert(right);
    }

    fn edit(&mut self, left: &BStr, right: &BStr) {
        let (l, r) = edited_sides(left, right);
        let (lno, rno) = (self.ln_left, self.ln_right);
        self.row(Some(lno), None, l);
        self.row(None, Some(rno), r);
        self.ln_left += 1;
        self.ln_right += 1;
    }

    fn end(&mut self) -> String {
        self.flush_block();
        self.out.push_str("</table>\n");
        std::mem::take(&mut self.out)
    }
}

/// Side-by-side HTML: left number, left text, marker, right number,
/// right text; five parallel columns per block.
pub struct SplitHtmlBuilder {
    out: String,
    col_ln1: String,
    col_txt1: String,
    col_mark: String,
    col_ln2: String,
    col_txt2: String,
    ln_left: u32,
    ln_right: u32,
    id: u32,
}

impl SplitHtmlBuilder {
    pub fn new(cfg: &DiffConfig) -> Self {
        let id = cfg.html_id_base;
        SplitHtmlBuilder {
            out: format!("<table class=\"sbsdiff\" id=\"sbsdiff-{id}\">\n"),
            col_ln1: String::new(),
            col_txt1: String::new(),
            col_mark: String::new(),
            col_ln2: String::new(),
            col_txt2: String::new(),
            ln_left: 0,
            ln_right: 0,
            id,
        }
    }

    fn row(
        &mut self,
        ln1: Option<u32>,
        txt1: String,
        mark: &str,
        ln2: Option<u32>,
        txt2: String,
    ) {
        match ln1 {
            Some(n) => self.col_ln1.push_str(&format!("{}\n", n + 1)),
            None => self.col_ln1.push('\n'),
        }
        self.col_txt1.push_str(&txt1);
        self.col_txt1.push('\n');
        self.col_mark.push_str(mark);
        self.col_mark.push('\n');
        match ln2 {
            Some(n) => self.col_ln2.push_str(&format!("{}\n", n + 1)),
            None => self.col_ln2.push('\n'),
        }
        self.col_txt2.push_str(&txt2);
        self.col_txt2.push('\n');
    }

    fn flush_block(&mut self) {
        if self.col_mark.is_empty() {
            return;
        }
        self.out.push_str("<tr>");
        for (class, col) in [
            ("lineno", &self.col_ln1),
            ("difftxt", &self.col_txt1),
            ("diffsep", &self.col_mark),
            ("lineno", &self.col_ln2),
            ("difftxt", &self.col_txt2),
        ] {
            self.out
                .push_str(&format!("<td class=\"{class}\"><pre>{col}</pre></td>"));
        }
        self.out.push_str("</tr>\n");
        self.col_ln1.clear();
        self.col_txt1.clear();
        self.col_mark.clear();
        self.col_ln2.clear();
        self.col_txt2.clear();
    }
}

impl DiffBuilder for SplitHtmlBuilder {
    fn skip(&mut self, n_left: u32, n_right: u32, is_final: bool) {
        self.flush_block();
        self.ln_left += n_left;
        self.ln_right += n_right;
        if !is_final {
            self.out.push_str(&format!(
                "<tr class=\"diffskip\" id=\"skip-{}-{}\"><td colspan=\"5\">&#8230;</td></tr>\n",
                self.id, self.ln_left
            ));
        }
    }

    fn common(&mut self, line: &BStr) {
        let txt = html_escape(line);
        let (l, r) = (self.ln_left, self.ln_right);
        self.row(Some(l), txt.clone(), " ", Some(r), txt);
        self.ln_left += 1;
        self.ln_right += 1;
    }

    fn insert(&mut self, line: &BStr) {
        let txt = format!("<ins>{}</ins>", html_escape(line));
        let r = self.ln_right;
        self.row(None, String::new(), "&gt;", Some(r), txt);
        self.ln_right += 1;
    }

    fn delete(&mut self, line: &BStr) {
        let txt = format!("<del>{}</del>", html_escape(line));
        let l = self.ln_left;
        self.row(Some(l), txt, "&lt;", None, String::new());
        self.ln_left += 1;
    }

    fn replace(&mut self, left: &BStr, right: &BStr) {
        let lt = format!("<del>{}</del>", html_escape(left));
        let rt = format!("<ins>{}</ins>", html_escape(right));
        let (l, r) = (self.ln_left, self.ln_right);
        self.row(Some(l), lt, "|", Some(r), rt);
        self.ln_left += 1;
        self.ln_right += 1;
    }

    fn edit(&mut self, left: &BStr, right: &BStr) {
        let (lt, rt) = edited_sides(left, right);
        let (l, r) = (self.ln_left, self.ln_right);
        self.row(Some(l), lt, "|", Some(r), rt);
        self.ln_left += 1;
        self.ln_right += 1;
    }

    fn end(&mut self) -> String {
        self.flush_block();
        self.out.push_str("</table>\n");
        std::mem::take(&mut self.out)
    }
}
