//! Rendering of diffs, diagnostics and summaries

use std::path::Path;

use gml_formatter::GmlError;
use similar::{ChangeTag, TextDiff};

use crate::console::{Color, Console};

/// Unified diff between a file and its formatted text
pub fn render_diff(path: &Path, original: &str, formatted: &str, console: &Console) -> String {
    let label = path.display().to_string();
    let diff = TextDiff::from_lines(original, formatted);

    let mut out = String::new();
    out.push_str(&console.colorize(&format!("--- {label}"), Color::Bold));
    out.push('\n');
    out.push_str(&console.colorize(&format!("+++ {label}"), Color::Bold));
    out.push('\n');

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        out.push_str(&console.colorize(&hunk.header().to_string(), Color::Cyan));
        out.push('\n');
        for change in hunk.iter_changes() {
            let line = change.value().trim_end_matches(['\n', '\r']);
            let rendered = match change.tag() {
                ChangeTag::Delete => console.colorize(&format!("-{line}"), Color::Red),
                ChangeTag::Insert => console.colorize(&format!("+{line}"), Color::Green),
                ChangeTag::Equal => format!(" {line}"),
            };
            out.push_str(&rendered);
            out.push('\n');
            if change.missing_newline() {
                out.push_str(&console.colorize("\\ No newline at end of file", Color::Dim));
                out.push('\n');
            }
        }
    }
    out
}

/// One-line diagnostic: `path:line:column: message` when the error has a
/// position, `path: message` otherwise
pub fn render_error(path: &Path, error: &GmlError, console: &Console) -> String {
    let message = match error {
        GmlError::Lex { message, .. } | GmlError::Parse { message, .. } => message.clone(),
        GmlError::Io { source, .. } => source.to_string(),
        other => other.to_string(),
    };
    let location = match error.location() {
        Some((line, column)) => format!("{}:{line}:{column}", path.display()),
        None => path.display().to_string(),
    };
    format!("{}: {message}", console.colorize(&location, Color::Red))
}

/// Line reported by `--check` for a file that is not formatted
pub fn render_unformatted(path: &Path, console: &Console) -> String {
    format!(
        "{} {}",
        console.colorize("would reformat", Color::Yellow),
        path.display()
    )
}

/// Closing summary, e.g. `3 files checked, 1 would be reformatted, 0 failed`
pub fn render_summary(checked: usize, changed: usize, failed: usize, verb: &str) -> String {
    let files = if checked == 1 { "file" } else { "files" };
    format!("{checked} {files} checked, {changed} {verb}, {failed} failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_marks_changed_lines() {
        let diff = render_diff(
            Path::new("a.gml"),
            "x=1\ny = 2;\n",
            "x = 1;\ny = 2;\n",
            &Console::no_colors(),
        );
        assert!(diff.starts_with("--- a.gml\n+++ a.gml\n@@"));
        assert!(diff.contains("\n-x=1\n"));
        assert!(diff.contains("\n+x = 1;\n"));
        assert!(diff.contains("\n y = 2;\n"));
    }

    #[test]
    fn test_diff_notes_missing_newline() {
        let diff = render_diff(Path::new("a.gml"), "x=1", "x = 1;\n", &Console::no_colors());
        assert!(diff.contains("\\ No newline at end of file"));
    }

    #[test]
    fn test_error_with_location() {
        let error = GmlError::lex("Unterminated string literal", 4, 1, 5);
        assert_eq!(
            render_error(Path::new("obj.gml"), &error, &Console::no_colors()),
            "obj.gml:1:5: Unterminated string literal"
        );
    }

    #[test]
    fn test_error_without_location() {
        let error = GmlError::config_error("bad width");
        assert_eq!(
            render_error(Path::new("obj.gml"), &error, &Console::no_colors()),
            "obj.gml: Configuration error: bad width"
        );
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            render_summary(1, 0, 0, "reformatted"),
            "1 file checked, 0 reformatted, 0 failed"
        );
        assert_eq!(
            render_summary(3, 1, 1, "would be reformatted"),
            "3 files checked, 1 would be reformatted, 1 failed"
        );
    }
}
