//! Tcl-list diff builder.
//!
//! Each builder event becomes one Tcl list on its own line, e.g.
//! `SKIP 4 4`, `COM {unchanged text}` or `EDIT {old} {new}`. Strings
//! are brace-quoted; content that braces cannot protect (unbalanced
//! braces, backslashes) falls back to backslash escaping.

use bstr::BStr;

use super::DiffBuilder;

/// Quote `s` as a single Tcl list element.
fn tcl_quote(s: &[u8]) -> String {
    let text = String::from_utf8_lossy(s);
    let mut depth: i32 = 0;
    let mut balanced = true;
    for ch in text.chars() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    balanced = false;
                }
            }
            '\\' | '\n' => balanced = false,
            _ => {}
        }
    }
    if balanced && depth == 0 {
        return format!("{{{text}}}");
    }
    let mut out = String::with_capacity(text.len() + 2);
    for ch in text.chars() {
        match ch {
            '{' | '}' | '\\' | '"' | '$' | '[' | ']' | ' ' | ';' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

pub struct TclBuilder {
    out: String,
}

impl TclBuilder {
    pub fn new() -> Self {
        TclBuilder { out: String::new() }
    }
}

impl DiffBuilder for TclBuilder {
    fn skip(&mut self, n_left: u32, n_right: u32, _is_final: bool) {
        self.out.push_str(&format!("SKIP {n_left} {n_right}\n"));
    }

    fn common(&mut self, line: &BStr) {
        self.out.push_str(&format!("COM {}\n", tcl_quote(line)));
    }

    fn insert(&mut self, line: &BStr) {
        self.out.push_str(&format!("INS {}\n", tcl_quote(line)));
    }

    fn delete(&mut self, line: &BStr) {
        self.out.push_str(&format!("DEL {}\n", tcl_quote(line)));
    }

    fn replace(&mut self, left: &BStr, right: &BStr) {
        self.out
            .push_str(&format!("REPL {} {}\n", tcl_quote(left), tcl_quote(right)));
    }

    fn edit(&mut self, left: &BStr, right: &BStr) {
        self.out
            .push_str(&format!("EDIT {} {}\n", tcl_quote(left), tcl_quote(right)));
    }

    fn end(&mut self) -> String {
        std::mem::take(&mut self.out)
    }
}
