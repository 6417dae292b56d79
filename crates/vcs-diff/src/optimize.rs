//! Edit-script optimizer.
//!
//! Slides the boundaries of insert-only and delete-only runs across
//! adjacent copy runs. A line may move across the boundary only when it
//! is byte-identical on both sides of the shift and the shift does not
//! increase the total encoded length of the boundary lines. In practice
//! this aligns block insertions with blank-line and brace boundaries
//! instead of splitting a block mid-way.

use crate::tokenize::Unit;
use crate::EditTriple;

fn ulen(units: &[Unit<'_>], i: usize) -> usize {
    units.get(i).map(|u| u.len()).unwrap_or(0)
}

fn same_text(a: &Unit<'_>, b: &Unit<'_>) -> bool {
    // A final line without a terminator is not interchangeable with a
    // terminated twin; sliding one across the boundary would change the
    // reconstructed bytes.
    a.bytes() == b.bytes() && a.has_eol() == b.has_eol()
}

/// Optimize the triple list in place.
pub(crate) fn optimize(triples: &mut Vec<EditTriple>, from: &[Unit<'_>], to: &[Unit<'_>]) {
    if triples.is_empty() {
        return;
    }
    // A trailing zero triple lets the last run donate shifted lines to a
    // following copy run; spurious zero triples are dropped afterwards.
    triples.push(EditTriple::default());

    let mut ln_from = 0usize;
    let mut ln_to = 0usize;
    let mut r = 0;
    while r + 1 < triples.len() {
        let mut cpy = triples[r].copy as usize;
        let del = triples[r].del as usize;
        let ins = triples[r].ins as usize;
        ln_from += cpy;
        ln_to += cpy;

        // Shift an insertion toward the beginning of the file.
        while cpy > 0 && del == 0 && ins > 0 {
            let top = ln_from - 1; // copy line just above the insert
            let btm = ln_to + ins - 1; // last inserted line
            if !same_text(&from[top], &to[btm]) {
                break;
            }
            if ulen(from, top + 1) + ulen(to, btm) < ulen(from, top) + ulen(to, btm - 1) {
                break;
            }
            ln_from -= 1;
            ln_to -= 1;
            triples[r].copy -= 1;
            triples[r + 1].copy += 1;
            cpy -= 1;
        }

        // Shift an insertion toward the end of the file.
        while triples[r + 1].copy > 0 && del == 0 && ins > 0 {
            let top = ln_to; // first inserted line
            let btm = ln_to + ins; // first copy line past the insert
            if !same_text(&to[top], &to[btm]) {
                break;
            }
            if ulen(to, top) + ulen(to, btm - 1) < ulen(to, top + 1) + ulen(to, btm) {
                break;
            }
            ln_from += 1;
            ln_to += 1;
            triples[r].copy += 1;
            triples[r + 1].copy -= 1;
            cpy += 1;
        }

        // Shift a deletion toward the beginning of the file.
        while cpy > 0 && ins == 0 && del > 0 {
            let top = ln_from - 1; // copy line just above the delete
            let btm = ln_from + del - 1; // last deleted line
            if !same_text(&from[top], &from[btm]) {
                break;
            }
            if ulen(from, top + 1) + ulen(from, btm) < ulen(from, top) + ulen(from, btm - 1) {
                break;
            }
            ln_from -= 1;
            ln_to -= 1;
            triples[r].copy -= 1;
            triples[r + 1].copy += 1;
            cpy -= 1;
        }

        // Shift a deletion toward the end of the file.
        while triples[r + 1].copy > 0 && ins == 0 && del > 0 {
            let top = ln_from; // first deleted line
            let btm = ln_from + del; // first copy line past the delete
            if !same_text(&from[top], &from[btm]) {
                break;
            }
            if ulen(from, top) + ulen(from, btm - 1) < ulen(from, top + 1) + ulen(from, btm) {
                break;
            }
            ln_from += 1;
            ln_to += 1;
            triples[r].copy += 1;
            triples[r + 1].copy -= 1;
            cpy += 1;
        }

        ln_from += del;
        ln_to += ins;
        r += 1;
    }

    triples.retain(|t| t.copy != 0 || t.del != 0 || t.ins != 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DiffContext;
    use crate::tokenize::{tokenize, Compare, Tokenized};
    use crate::DiffConfig;

    fn run<'a>(a: &'a [u8], b: &'a [u8]) -> (Tokenized<'a>, Tokenized<'a>, Vec<EditTriple>) {
        let cfg = DiffConfig::default();
        let ta = tokenize(a, &cfg).unwrap();
        let tb = tokenize(b, &cfg).unwrap();
        let mut tr = DiffContext::new(&ta, &tb, Compare::Exact).diff_all();
        optimize(&mut tr, ta.units(), tb.units());
        (ta, tb, tr)
    }

    fn assert_sums(tr: &[EditTriple], n1: u32, n2: u32) {
        assert_eq!(tr.iter().map(|t| t.copy + t.del).sum::<u32>(), n1);
        assert_eq!(tr.iter().map(|t| t.copy + t.ins).sum::<u32>(), n2);
    }

    #[test]
    fn noop_on_simple_change() {
        let (_, _, tr) = run(b"a\nb\nc\n", b"a\nx\nc\n");
        assert_eq!(
            tr,
            vec![
                EditTriple { copy: 1, del: 1, ins: 1 },
                EditTriple { copy: 1, del: 0, ins: 0 }
            ]
        );
    }

    #[test]
    fn invariants_survive_blank_line_slide() {
        // Appending a second "fn" block: the naive script splits the new
        // block across the shared blank line; sliding must keep the sums.
        let a = b"fn one() {\n    body\n}\n";
        let b = b"fn one() {\n    body\n}\n\nfn two() {\n    body\n}\n";
        let (_, _, tr) = run(a, b);
        assert_sums(&tr, 3, 7);
        let ins: u32 = tr.iter().map(|t| t.ins).sum();
        assert_eq!(ins, 4);
    }

    #[test]
    fn repeated_line_slide_keeps_sums() {
        let a = b"x\nx\nx\n";
        let b = b"x\nx\nx\nx\nx\n";
        let (_, _, tr) = run(a, b);
        assert_sums(&tr, 3, 5);
    }
}
