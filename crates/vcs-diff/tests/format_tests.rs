//! Output format tests: one suite per builder plus driver-level
//! behavior (context handling, gap merging, the regex filter).

use vcs_diff::{text_diff, DiffConfig, DiffError, DiffFormat, DiffResult};

fn render(left: &[u8], right: &[u8], cfg: &DiffConfig) -> String {
    match text_diff(left, right, cfg).unwrap() {
        DiffResult::Rendered(s) => s,
        other => panic!("expected rendered output, got {other:?}"),
    }
}

fn numbered(n: usize) -> String {
    (0..n).map(|i| format!("line {i}\n")).collect()
}

#[test]
fn unified_basic_shape() {
    let cfg = DiffConfig::default();
    let out = render(b"a\nb\nc\n", b"a\nx\nc\n", &cfg);
    assert!(out.contains("@@ -1,3 +1,3 @@"), "missing hunk header: {out}");
    assert!(out.contains("\n-b\n"), "missing deletion: {out}");
    assert!(out.contains("\n+x\n"), "missing insertion: {out}");
    assert!(out.contains(" a\n"), "missing context: {out}");
}

#[test]
fn hunk_header_for_empty_side_names_preceding_line() {
    let cfg = DiffConfig::default();
    let ins = render(b"", b"a\nb\n", &cfg);
    assert!(ins.starts_with("@@ -0,0 +1,2 @@"), "{ins}");
    let del = render(b"a\nb\n", b"", &cfg);
    assert!(del.starts_with("@@ -1,2 +0,0 @@"), "{del}");
}

#[test]
fn newline_at_eof_change_renders_as_edit() {
    let cfg = DiffConfig::default();
    let out = render(b"a\nb\n", b"a\nb", &cfg);
    assert!(out.contains("\n-b\n"), "{out}");
    assert!(out.contains("\n+b\n"), "{out}");
}

#[test]
fn unified_groups_deletions_before_insertions() {
    let cfg = DiffConfig::default();
    let out = render(b"a\nb\nc\nz\n", b"a\nx\ny\nz\n", &cfg);
    let db = out.find("-b").unwrap();
    let dc = out.find("-c").unwrap();
    let ix = out.find("+x").unwrap();
    let iy = out.find("+y").unwrap();
    assert!(db < dc && dc < ix && ix < iy, "bad ordering: {out}");
}

#[test]
fn unified_respects_context_setting() {
    let left = numbered(30);
    let right = left.replace("line 15\n", "changed\n");
    let cfg = DiffConfig {
        context: Some(2),
        ..DiffConfig::default()
    };
    let out = render(left.as_bytes(), right.as_bytes(), &cfg);
    assert!(out.contains(" line 13\n"));
    assert!(out.contains(" line 17\n"));
    assert!(!out.contains("line 12\n"), "too much context: {out}");
    assert!(!out.contains("line 18\n"), "too much context: {out}");
}

#[test]
fn unlimited_context_shows_every_line() {
    let left = numbered(20);
    let right = left.replace("line 10\n", "changed\n");
    let cfg = DiffConfig {
        context: None,
        ..DiffConfig::default()
    };
    let out = render(left.as_bytes(), right.as_bytes(), &cfg);
    assert!(out.contains(" line 0\n"));
    assert!(out.contains(" line 19\n"));
}

#[test]
fn nearby_changes_share_one_hunk() {
    // Two changes separated by a single common line must land in the
    // same hunk rather than producing two headers.
    let left = numbered(20);
    let right = left
        .replace("line 8\n", "eight\n")
        .replace("line 10\n", "ten\n");
    let cfg = DiffConfig::default();
    let out = render(left.as_bytes(), right.as_bytes(), &cfg);
    assert_eq!(out.matches("@@").count(), 2, "expected one hunk: {out}");
}

#[test]
fn side_by_side_markers() {
    let cfg = DiffConfig {
        format: DiffFormat::SideBySide,
        ..DiffConfig::default()
    };
    let out = render(b"a\nb\nc\n", b"a\nx\nc\n", &cfg);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines.iter().any(|l| l.contains(" | ")), "no change row: {out}");
    let del_only = render(b"a\nb\n", b"a\n", &cfg);
    assert!(del_only.lines().any(|l| l.contains(" < ")), "{del_only}");
    let ins_only = render(b"a\n", b"a\nb\n", &cfg);
    assert!(ins_only.lines().any(|l| l.contains(" > ")), "{ins_only}");
}

#[test]
fn side_by_side_line_numbers() {
    let cfg = DiffConfig {
        format: DiffFormat::SideBySide,
        line_numbers: true,
        ..DiffConfig::default()
    };
    let out = render(b"a\nb\n", b"a\nx\n", &cfg);
    assert!(out.contains("    1 "), "missing line number: {out}");
    assert!(out.contains("    2 "), "missing line number: {out}");
}

#[test]
fn html_unified_markup() {
    let cfg = DiffConfig {
        format: DiffFormat::UnifiedHtml,
        ..DiffConfig::default()
    };
    let out = render(b"a\nbad line\nc\n", b"a\nc\n", &cfg);
    assert!(out.starts_with("<table class=\"udiff\" id=\"udiff-0\">"));
    assert!(out.contains("<del>bad line</del>"), "{out}");
    assert!(out.ends_with("</table>\n"));
}

#[test]
fn html_escapes_content() {
    let cfg = DiffConfig {
        format: DiffFormat::UnifiedHtml,
        ..DiffConfig::default()
    };
    let out = render(b"x\n", b"<script>&\n", &cfg);
    assert!(out.contains("&lt;script&gt;&amp;"), "unescaped html: {out}");
}

#[test]
fn html_id_base_offsets_element_ids() {
    let cfg = DiffConfig {
        format: DiffFormat::SideBySideHtml,
        html_id_base: 7,
        ..DiffConfig::default()
    };
    let out = render(b"a\nb\n", b"a\nx\n", &cfg);
    assert!(out.contains("id=\"sbsdiff-7\""), "{out}");
}

#[test]
fn html_side_by_side_intraline_markup() {
    let cfg = DiffConfig {
        format: DiffFormat::SideBySideHtml,
        ..DiffConfig::default()
    };
    let out = render(b"the quick fox\n", b"the slow fox\n", &cfg);
    assert!(out.contains("<del>"), "no intraline delete: {out}");
    assert!(out.contains("<ins>"), "no intraline insert: {out}");
    // The unchanged words stay outside the markup.
    assert!(out.contains("the "), "{out}");
}

#[test]
fn json_is_parseable_and_ordered() {
    let cfg = DiffConfig {
        format: DiffFormat::Json,
        ..DiffConfig::default()
    };
    let out = render(b"a\nb\nc\n", b"a\nc\n", &cfg);
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    let ops: Vec<&str> = v
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["op"].as_str().unwrap())
        .collect();
    assert_eq!(ops, ["common", "delete", "common"]);
}

#[test]
fn tcl_output_one_event_per_line() {
    let cfg = DiffConfig {
        format: DiffFormat::Tcl,
        ..DiffConfig::default()
    };
    let out = render(b"a\nb\n", b"a\nx\n", &cfg);
    assert!(out.lines().any(|l| l.starts_with("COM {a}")), "{out}");
    assert!(
        out.lines().any(|l| l.starts_with("EDIT") || l.starts_with("REPL")),
        "{out}"
    );
}

#[test]
fn debug_output_lists_events() {
    let cfg = DiffConfig {
        format: DiffFormat::Debug,
        ..DiffConfig::default()
    };
    let out = render(b"a\nb\n", b"a\n", &cfg);
    assert!(out.lines().any(|l| l.starts_with("COM")), "{out}");
    assert!(out.lines().any(|l| l.starts_with("DEL")), "{out}");
}

#[test]
fn regex_filter_suppresses_unmatched_blocks() {
    let re = regex::bytes::Regex::new("interesting").unwrap();
    let cfg = DiffConfig {
        filter: Some(re),
        ..DiffConfig::default()
    };
    let left = numbered(30);
    let right = left
        .replace("line 5\n", "boring change\n")
        .replace("line 20\n", "interesting change\n");
    let out = render(left.as_bytes(), right.as_bytes(), &cfg);
    assert!(out.contains("+interesting change"), "{out}");
    assert!(!out.contains("boring change"), "filter leaked: {out}");
}

#[test]
fn too_many_changes_error_names_the_limit() {
    let cfg = DiffConfig {
        max_changes: Some(2),
        ..DiffConfig::default()
    };
    let err = text_diff(b"a\nb\nc\nd\n", b"w\nx\ny\nz\n", &cfg).unwrap_err();
    assert!(matches!(err, DiffError::TooManyChanges { limit: 2 }));
    assert_eq!(err.to_string(), "diff has more than 2 changed lines");
}
