//! Batch formatting over files on disk

use std::fs;

use gml_formatter::prelude::*;
use gml_formatter::write_changes;
use tempfile::TempDir;

#[test]
fn test_format_files_reports_each_outcome() {
    let dir = TempDir::new().unwrap();
    let clean = dir.path().join("clean.gml");
    let messy = dir.path().join("messy.gml");
    let broken = dir.path().join("broken.gml");
    fs::write(&clean, "x = 1;\n").unwrap();
    fs::write(&messy, "if (a) b = 1").unwrap();
    fs::write(&broken, "x = \"unterminated").unwrap();

    let paths = vec![clean.clone(), messy.clone(), broken.clone()];
    let results = format_files(&paths, &FormatOptions::default());

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].path, clean);
    assert!(matches!(results[0].outcome, FormatOutcome::Unchanged));
    match &results[1].outcome {
        FormatOutcome::Changed { formatted } => assert_eq!(formatted, "if (a) {\n  b = 1;\n}\n"),
        other => panic!("expected a change, got {other:?}"),
    }
    match &results[2].outcome {
        FormatOutcome::Failed { error } => assert!(error.is_user_error()),
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[test]
fn test_missing_file_fails_without_stopping_the_batch() {
    let dir = TempDir::new().unwrap();
    let present = dir.path().join("present.gml");
    fs::write(&present, "x=1").unwrap();
    let paths = vec![dir.path().join("absent.gml"), present];

    let results = format_files(&paths, &FormatOptions::default());
    assert!(results[0].outcome.is_failed());
    assert!(results[1].outcome.is_changed());
}

#[test]
fn test_write_changes_only_touches_changed_files() {
    let dir = TempDir::new().unwrap();
    let clean = dir.path().join("clean.gml");
    let messy = dir.path().join("messy.gml");
    fs::write(&clean, "x = 1;\n").unwrap();
    fs::write(&messy, "y=2").unwrap();

    let results = format_files(&[clean.clone(), messy.clone()], &FormatOptions::default());
    assert_eq!(write_changes(&results).unwrap(), 1);
    assert_eq!(fs::read_to_string(&messy).unwrap(), "y = 2;\n");
    assert_eq!(fs::read_to_string(&clean).unwrap(), "x = 1;\n");
}

#[test]
fn test_options_flow_through() {
    let options = FormatOptions {
        line_width: 20,
        ..FormatOptions::default()
    };
    assert_eq!(
        format("f(alpha, beta, gamma);", &options).unwrap(),
        "f(\n  alpha,\n  beta,\n  gamma\n);\n"
    );
}

#[test]
fn test_formatted_file_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("obj_enemy_step.gml");
    fs::write(&path, "if hp<=0 then instance_destroy()\nelse x+=spd").unwrap();

    let result = gml_formatter::format_file(&path, &FormatOptions::default());
    let FormatOutcome::Changed { formatted } = result.outcome else {
        panic!("expected a change");
    };
    insta::assert_snapshot!(formatted, @r"
    if (hp <= 0) {
      instance_destroy();
    } else {
      x += spd;
    }
    ");
}
