//! End-to-end formatting properties: idempotence, comment preservation,
//! canonical spellings, blank lines, braces and width-sensitive wrapping.

use gml_core::{FormatOptions, GmlError, format};

fn fmt(source: &str) -> String {
    format(source, &FormatOptions::default()).unwrap()
}

fn fmt_width(source: &str, line_width: usize) -> String {
    let options = FormatOptions {
        line_width,
        ..FormatOptions::default()
    };
    format(source, &options).unwrap()
}

const PLAYER_STEP: &str = r#"// Player step event
var spd = 4;   // pixels per frame
if (keyboard_check(vk_left)) x -= spd;
else if (keyboard_check(vk_right)) { x += spd; }



/* multi
   line */
function take_damage(amount) {
    hp -= amount; // clamp later
    if (hp <= 0) instance_destroy();
}
"#;

const INVENTORY: &str = r#"
enum Item { Sword, Shield = 4, Potion }

function Inventory(_size) constructor {
    size = _size
    items = ds_list_create()
    static add = function(item) {
        if ds_list_size(items) >= size then return false
        ds_list_add(items, item);
        return true;
    }
}

var inv = new Inventory(10);
with (obj_player) { repeat (3) inv.add(Item.Potion); }
switch (state) {
    case "idle":
        sprite_index = spr_idle;
        break;

    default:
        sprite_index = spr_walk;
}
"#;

const EXPRESSIONS: &str = r#"
result = first_value * 2 + second_value * 3 - third_value / 4 + fourth_value mod 5 + more;
ok = (a and b) or (c xor d) and not e;
label = is_boss ? "Boss: " + name : name;
grid[# 2, 3] = list[| 0] + map[? "key"];
draw_sprite_ext(spr_player, image_index, x, y, image_xscale, image_yscale, image_angle, c_white, 1);
"#;

#[test]
fn test_idempotence() {
    for source in [PLAYER_STEP, INVENTORY, EXPRESSIONS] {
        let once = fmt(source);
        let twice = fmt(&once);
        assert_eq!(once, twice, "formatting is not idempotent for:\n{source}");
    }
}

#[test]
fn test_idempotence_of_small_constructs() {
    let cases = [
        "if (a);",
        "while (c);",
        "for (i = 0; i < n; i++);",
        "with (o);",
        "repeat (n);",
        "if (a); else if (b); else;",
        "switch (s) {\ncase 1:\n// one\ndefault:\n}",
        "x = a.b(function() { c(); }).d(function() { e(); });",
        "list.sort(function(l, r) { return l - r; }).reverse().first();",
        "f(function() {}, { a: 1 });",
    ];
    for source in cases {
        let once = fmt(source);
        assert_eq!(fmt(&once), once, "formatting is not idempotent for {source:?}");
        assert_eq!(fmt_width(&once, 30), fmt_width(&fmt_width(&once, 30), 30));
    }
}

#[test]
fn test_idempotence_at_narrow_width() {
    for source in [PLAYER_STEP, INVENTORY, EXPRESSIONS] {
        let once = fmt_width(source, 40);
        assert_eq!(once, fmt_width(&once, 40));
    }
}

#[test]
fn test_comment_preservation() {
    let formatted = fmt(PLAYER_STEP);
    for comment in ["// Player step event", "// pixels per frame", "/* multi\n   line */", "// clamp later"] {
        assert_eq!(
            formatted.matches(comment).count(),
            1,
            "{comment:?} missing or duplicated in:\n{formatted}"
        );
    }
}

#[test]
fn test_player_step_output() {
    insta::assert_snapshot!(fmt(PLAYER_STEP), @r###"
    // Player step event
    var spd = 4; // pixels per frame
    if (keyboard_check(vk_left)) {
      x -= spd;
    } else if (keyboard_check(vk_right)) {
      x += spd;
    }

    /* multi
       line */
    function take_damage(amount) {
      hp -= amount; // clamp later
      if (hp <= 0) {
        instance_destroy();
      }
    }
    "###);
}

#[test]
fn test_operator_canonicalization() {
    assert_eq!(fmt("x = a and b;"), "x = a && b;\n");
    assert_eq!(fmt("x = a or b;"), "x = a || b;\n");
    assert_eq!(fmt("x = a xor b;"), "x = a ^^ b;\n");
    assert_eq!(fmt("x = a <> b;"), "x = a != b;\n");
    assert_eq!(fmt("x = a mod b;"), "x = a % b;\n");
    assert_eq!(fmt("x := a;"), "x = a;\n");
}

#[test]
fn test_blank_lines_collapse_to_one() {
    assert_eq!(fmt("a = 1;\n\n\n\nb = 2;"), "a = 1;\n\nb = 2;\n");
    assert_eq!(fmt("a = 1;\nb = 2;"), "a = 1;\nb = 2;\n");
    assert_eq!(fmt("\n\n\na = 1;"), "a = 1;\n");
}

#[test]
fn test_brace_insertion() {
    assert_eq!(fmt("if (a) b = 1;"), "if (a) {\n  b = 1;\n}\n");
    assert_eq!(fmt("if a then b = 1"), "if (a) {\n  b = 1;\n}\n");
    assert_eq!(fmt("if (a) begin b = 1; end"), "if (a) {\n  b = 1;\n}\n");
}

#[test]
fn test_width_sensitive_wrapping() {
    let source = "show_debug_message(first_argument, second_argument, third_argument, fourth);";
    assert_eq!(
        fmt(source),
        "show_debug_message(\n  first_argument,\n  second_argument,\n  third_argument,\n  fourth\n);\n"
    );
    assert_eq!(fmt_width(source, 120), format!("{source}\n"));
}

#[test]
fn test_indent_width_and_tabs() {
    let options = FormatOptions {
        indent_width: 4,
        ..FormatOptions::default()
    };
    assert_eq!(format("if (a) b();", &options).unwrap(), "if (a) {\n    b();\n}\n");

    let options = FormatOptions {
        use_tabs: true,
        ..FormatOptions::default()
    };
    assert_eq!(format("if (a) b();", &options).unwrap(), "if (a) {\n\tb();\n}\n");
}

#[test]
fn test_unterminated_string_reports_literal_start() {
    let err = format("x = \"abc", &FormatOptions::default()).unwrap_err();
    match err {
        GmlError::Lex { offset, line, column, .. } => {
            assert_eq!(offset, 4);
            assert_eq!((line, column), (1, 5));
        }
        other => panic!("expected a lex error, got {other:?}"),
    }
}

#[test]
fn test_parse_error_has_location() {
    let err = format("x = ;\n", &FormatOptions::default()).unwrap_err();
    assert!(matches!(err, GmlError::Parse { .. }));
    assert_eq!(err.location().map(|(line, _)| line), Some(1));
}

#[test]
fn test_empty_input() {
    assert_eq!(fmt(""), "");
    assert_eq!(fmt("   \n\t\n"), "");
}

#[test]
fn test_deterministic() {
    assert_eq!(fmt(INVENTORY), fmt(INVENTORY));
}
