//! Debug builder: one labelled line per event with running line
//! numbers on both sides. Useful when inspecting the raw event stream
//! the driver feeds the other builders.

use bstr::BStr;

use super::DiffBuilder;

pub struct DebugBuilder {
    out: String,
    ln_left: u32,
    ln_right: u32,
}

impl DebugBuilder {
    pub fn new() -> Self {
        DebugBuilder {
            out: String::new(),
            ln_left: 0,
            ln_right: 0,
        }
    }
}

impl DiffBuilder for DebugBuilder {
    fn skip(&mut self, n_left: u32, n_right: u32, is_final: bool) {
        self.ln_left += n_left;
        self.ln_right += n_right;
        self.out.push_str(&format!(
            "SKIP {n_left} {n_right}{}\n",
            if is_final { " (final)" } else { "" }
        ));
    }

    fn common(&mut self, line: &BStr) {
        self.ln_left += 1;
        self.ln_right += 1;
        self.out.push_str(&format!(
            "COM {:5} {:5} {}\n",
            self.ln_left,
            self.ln_right,
            String::from_utf8_lossy(line)
        ));
    }

    fn insert(&mut self, line: &BStr) {
        self.ln_right += 1;
        self.out.push_str(&format!(
            "INS       {:5} {}\n",
            self.ln_right,
            String::from_utf8_lossy(line)
        ));
    }

    fn delete(&mut self, line: &BStr) {
        self.ln_left += 1;
        self.out.push_str(&format!(
            "DEL {:5}       {}\n",
            self.ln_left,
            String::from_utf8_lossy(line)
        ));
    }

    fn replace(&mut self, left: &BStr, right: &BStr) {
        self.ln_left += 1;
        self.ln_right += 1;
        self.out.push_str(&format!(
            "REPL {:4} {:5} {} -> {}\n",
            self.ln_left,
            self.ln_right,
            String::from_utf8_lossy(left),
            String::from_utf8_lossy(right)
        ));
    }

    fn edit(&mut self, left: &BStr, right: &BStr) {
        self.ln_left += 1;
        self.ln_right += 1;
        self.out.push_str(&format!(
            "EDIT {:4} {:5} {} -> {}\n",
            self.ln_left,
            self.ln_right,
            String::from_utf8_lossy(left),
            String::from_utf8_lossy(right)
        ));
    }

    fn end(&mut self) -> String {
        std::mem::take(&mut self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_labelled_with_line_numbers() {
        let mut b = DebugBuilder::new();
        b.skip(2, 2, false);
        b.common(BStr::new(b"x"));
        b.delete(BStr::new(b"y"));
        let out = b.end();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "SKIP 2 2");
        assert!(lines[1].starts_with("COM "));
        assert!(lines[1].contains(" 3 "));
        assert!(lines[2].starts_with("DEL "));
        assert!(lines[2].contains(" 4 "));
    }
}
