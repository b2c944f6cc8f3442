//! Comment placement through the whole pipeline

use gml_core::cst::{CommentPlacement, attach_comments, build_ast, parse_gml};
use gml_core::{FormatOptions, format};

fn fmt(source: &str) -> String {
    format(source, &FormatOptions::default()).unwrap()
}

fn assert_stable(source: &str, expected: &str) {
    let once = fmt(source);
    assert_eq!(once, expected);
    assert_eq!(fmt(&once), once, "second pass changed the output");
}

#[test]
fn test_comment_in_empty_block_stays_inside() {
    assert_stable("if (a) {\n  // todo\n}", "if (a) {\n  // todo\n}\n");
}

#[test]
fn test_comment_in_empty_arguments_gets_own_line() {
    assert_stable("f(/* none */);", "f(\n  /* none */\n);\n");
}

#[test]
fn test_comment_in_empty_struct() {
    assert_stable("s = {\n  // nothing\n};", "s = {\n  // nothing\n};\n");
}

#[test]
fn test_trailing_comment_before_else() {
    assert_stable(
        "if (a) {\n  b();\n} // done\nelse {\n  c();\n}",
        "if (a) {\n  b();\n} // done\nelse {\n  c();\n}\n",
    );
}

#[test]
fn test_line_comment_after_argument_separator() {
    assert_stable("f(a, // first\n  b);", "f(\n  a, // first\n  b\n);\n");
}

#[test]
fn test_comment_at_end_of_file() {
    assert_stable("x = 1;\n\n// end\n", "x = 1;\n\n// end\n");
}

#[test]
fn test_blank_line_after_leading_comment() {
    assert_stable(
        "function f() {\n    // setup\n\n    x = 1;\n}",
        "function f() {\n  // setup\n\n  x = 1;\n}\n",
    );
}

#[test]
fn test_inline_block_comment() {
    assert_stable("x = /* inline */ 5;", "x = /* inline */ 5;\n");
}

#[test]
fn test_comment_before_brace_moves_into_body() {
    assert_stable(
        "while (running) // main loop\n{\n  tick();\n}",
        "while (running) {\n  // main loop\n  tick();\n}\n",
    );
}

#[test]
fn test_every_comment_is_attached_once() {
    let source = "// a\nvar x = 1; // b\nf(/* c */);\nif (x) {\n  /* d */\n}\n// e\n";
    let parsed = parse_gml(source).unwrap();
    let ast = build_ast(&parsed.root, &parsed.tokens).unwrap();
    let comments = attach_comments(&ast, &parsed.tokens, source).unwrap();

    assert_eq!(comments.total(), 5);
    let mut texts: Vec<&str> = comments.iter().map(|(_, c)| c.trimmed()).collect();
    texts.sort_unstable();
    assert_eq!(texts, vec!["/* c */", "/* d */", "// a", "// b", "// e"]);

    let placements: Vec<CommentPlacement> = comments.iter().map(|(_, c)| c.placement).collect();
    assert!(placements.contains(&CommentPlacement::Leading));
    assert!(placements.contains(&CommentPlacement::Trailing));
    assert!(placements.contains(&CommentPlacement::Dangling));
}
