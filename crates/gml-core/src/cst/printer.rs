//! Printer for converting FormatElement IR to formatted strings
//!
//! The classic fits-or-breaks layout algorithm: the printer walks the
//! document with an explicit command stack, and each group is measured flat
//! against the remaining width before it is printed. A group that fits
//! prints flat, otherwise its own line breaks become newlines while nested
//! groups get measured again on their own.
//!
//! `Token` elements take a fast path (ASCII, byte length is width); `Text`
//! is measured per character with `unicode-width`.

use super::format_element::{FormatElement, LineMode};
use tracing::trace;
use unicode_width::UnicodeWidthChar;

/// Print result
pub type PrintResult = Result<String, PrintError>;

/// Print error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintError {
    /// A conditional group without alternatives
    EmptyConditionalGroup,
}

impl std::fmt::Display for PrintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrintError::EmptyConditionalGroup => write!(f, "conditional group has no alternatives"),
        }
    }
}

impl std::error::Error for PrintError {}

/// Printer configuration
#[derive(Debug, Clone)]
pub struct PrinterOptions {
    /// Maximum line width before wrapping
    pub line_width: usize,

    /// Number of spaces per indentation level
    pub indent_size: usize,

    /// Whether to use tabs for indentation
    pub use_tabs: bool,

    /// Tab width for width calculations (default: 4)
    pub tab_width: usize,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            line_width: 80,
            indent_size: 2,
            use_tabs: false,
            tab_width: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Break,
}

#[derive(Debug, Clone, Copy)]
enum Doc<'a> {
    Element(&'a FormatElement),
    Slice(&'a [FormatElement]),
    /// Remaining parts of a fill
    Fill(&'a [FormatElement]),
    /// A pending line suffix being written out
    Suffix(&'a str),
}

#[derive(Debug, Clone, Copy)]
struct Command<'a> {
    indent: usize,
    mode: Mode,
    doc: Doc<'a>,
}

impl<'a> Command<'a> {
    fn new(indent: usize, mode: Mode, doc: Doc<'a>) -> Self {
        Self { indent, mode, doc }
    }
}

/// Layout engine over the Doc IR
pub struct Printer {
    options: PrinterOptions,
    buffer: String,
    /// Display width of the current line
    column: usize,
}

impl Printer {
    /// Create a new printer with the given options
    pub fn new(options: PrinterOptions) -> Self {
        Self {
            options,
            buffer: String::with_capacity(4096),
            column: 0,
        }
    }

    /// Render a document
    pub fn print(&mut self, document: &FormatElement) -> PrintResult {
        let mut commands = vec![Command::new(0, Mode::Break, Doc::Element(document))];
        let mut line_suffixes: Vec<&str> = Vec::new();

        loop {
            let Some(command) = commands.pop() else {
                if line_suffixes.is_empty() {
                    break;
                }
                for suffix in line_suffixes.drain(..).rev() {
                    commands.push(Command::new(0, Mode::Break, Doc::Suffix(suffix)));
                }
                continue;
            };

            let element = match command.doc {
                Doc::Element(element) => element,
                Doc::Slice(elements) => {
                    push_slice(&mut commands, command, elements);
                    continue;
                }
                Doc::Fill(parts) => {
                    self.print_fill(command, parts, &mut commands);
                    continue;
                }
                Doc::Suffix(text) => {
                    self.write_text(text);
                    continue;
                }
            };

            match element {
                FormatElement::Token(token) => {
                    self.buffer.push_str(token);
                    self.column += token.len();
                }
                FormatElement::Text(text) => self.write_text(text),
                FormatElement::Space => {
                    self.buffer.push(' ');
                    self.column += 1;
                }
                FormatElement::Indent(contents) => commands.push(Command::new(
                    command.indent + 1,
                    command.mode,
                    Doc::Slice(contents),
                )),
                FormatElement::Sequence(contents) => {
                    commands.push(Command::new(command.indent, command.mode, Doc::Slice(contents)))
                }
                FormatElement::Fill(parts) => {
                    commands.push(Command::new(command.indent, command.mode, Doc::Fill(parts)))
                }
                FormatElement::Group(group) => {
                    let mode = if group.expand {
                        Mode::Break
                    } else if command.mode == Mode::Flat {
                        Mode::Flat
                    } else {
                        let flat = Command::new(command.indent, Mode::Flat, Doc::Slice(&group.contents));
                        if self.fits(flat, &commands, false) {
                            Mode::Flat
                        } else {
                            Mode::Break
                        }
                    };
                    trace!(?mode, column = self.column, "group");
                    commands.push(Command::new(command.indent, mode, Doc::Slice(&group.contents)));
                }
                FormatElement::ConditionalGroup(alternatives) => {
                    let (Some(first), Some(last)) = (alternatives.first(), alternatives.last())
                    else {
                        return Err(PrintError::EmptyConditionalGroup);
                    };
                    if command.mode == Mode::Flat {
                        commands.push(Command::new(command.indent, Mode::Flat, Doc::Element(first)));
                        continue;
                    }
                    let chosen = alternatives[..alternatives.len() - 1]
                        .iter()
                        .enumerate()
                        .map(|(index, alternative)| {
                            (index, Command::new(command.indent, Mode::Flat, Doc::Element(alternative)))
                        })
                        .find(|(_, candidate)| self.fits(*candidate, &commands, false));
                    match chosen {
                        Some((index, candidate)) => {
                            trace!(alternative = index, "conditional group");
                            commands.push(candidate);
                        }
                        None => {
                            trace!(alternative = alternatives.len() - 1, "conditional group fallback");
                            commands.push(Command::new(command.indent, Mode::Break, Doc::Element(last)));
                        }
                    }
                }
                FormatElement::LineSuffix(text) => line_suffixes.push(text),
                FormatElement::Line(line) => match (command.mode, line) {
                    (Mode::Flat, LineMode::Soft) => {}
                    (Mode::Flat, LineMode::SoftOrSpace) => {
                        self.buffer.push(' ');
                        self.column += 1;
                    }
                    _ => {
                        if !line_suffixes.is_empty() {
                            commands.push(command);
                            for suffix in line_suffixes.drain(..).rev() {
                                commands.push(Command::new(command.indent, Mode::Break, Doc::Suffix(suffix)));
                            }
                            continue;
                        }
                        if *line == LineMode::Empty {
                            self.blank_line(command.indent);
                        } else {
                            self.newline(command.indent);
                        }
                    }
                },
            }
        }

        self.column = 0;
        Ok(std::mem::take(&mut self.buffer))
    }

    /// Greedy packing of `[content, separator, content, ...]`
    fn print_fill<'a>(
        &self,
        command: Command<'a>,
        parts: &'a [FormatElement],
        commands: &mut Vec<Command<'a>>,
    ) {
        let Some(content) = parts.first() else {
            return;
        };
        let indent = command.indent;
        let flat_content = Command::new(indent, Mode::Flat, Doc::Element(content));
        let break_content = Command::new(indent, Mode::Break, Doc::Element(content));
        let content_fits = self.fits(flat_content, &[], true);

        let Some(separator) = parts.get(1) else {
            commands.push(if content_fits { flat_content } else { break_content });
            return;
        };
        let flat_separator = Command::new(indent, Mode::Flat, Doc::Element(separator));
        let break_separator = Command::new(indent, Mode::Break, Doc::Element(separator));

        if parts.len() == 2 {
            if content_fits {
                commands.push(flat_separator);
                commands.push(flat_content);
            } else {
                commands.push(break_separator);
                commands.push(break_content);
            }
            return;
        }

        commands.push(Command::new(indent, command.mode, Doc::Fill(&parts[2..])));
        let pair = Command::new(indent, Mode::Flat, Doc::Slice(&parts[..3]));
        if self.fits(pair, &[], true) {
            commands.push(flat_separator);
            commands.push(flat_content);
        } else if content_fits {
            commands.push(break_separator);
            commands.push(flat_content);
        } else {
            commands.push(break_separator);
            commands.push(break_content);
        }
    }

    /// Does `next` fit on the rest of the current line?
    ///
    /// Measurement continues into `rest` (the commands after `next`) until a
    /// line break in break mode ends the line.
    fn fits(&self, next: Command<'_>, rest: &[Command<'_>], must_be_flat: bool) -> bool {
        let mut remaining = self.options.line_width as isize - self.column as isize;
        let mut rest_index = rest.len();
        let mut stack = vec![(next.mode, next.doc)];

        while remaining >= 0 {
            let Some((mode, doc)) = stack.pop() else {
                if rest_index == 0 {
                    return true;
                }
                rest_index -= 1;
                stack.push((rest[rest_index].mode, rest[rest_index].doc));
                continue;
            };

            let element = match doc {
                Doc::Element(element) => element,
                Doc::Slice(elements) | Doc::Fill(elements) => {
                    stack.extend(elements.iter().rev().map(|e| (mode, Doc::Element(e))));
                    continue;
                }
                Doc::Suffix(_) => continue,
            };

            match element {
                FormatElement::Token(token) => remaining -= token.len() as isize,
                FormatElement::Text(text) => match text.split_once('\n') {
                    Some((first_line, _)) => {
                        return mode == Mode::Break
                            && self.text_width(first_line) as isize <= remaining;
                    }
                    None => remaining -= self.text_width(text) as isize,
                },
                FormatElement::Space => remaining -= 1,
                FormatElement::Line(line) => match (mode, line) {
                    (Mode::Break, _) => return true,
                    (Mode::Flat, LineMode::Hard | LineMode::Empty) => return false,
                    (Mode::Flat, LineMode::Soft) => {}
                    (Mode::Flat, LineMode::SoftOrSpace) => remaining -= 1,
                },
                FormatElement::Indent(contents)
                | FormatElement::Sequence(contents)
                | FormatElement::Fill(contents) => {
                    stack.push((mode, Doc::Slice(contents)));
                }
                FormatElement::Group(group) => {
                    if must_be_flat && group.expand {
                        return false;
                    }
                    let group_mode = if group.expand { Mode::Break } else { mode };
                    stack.push((group_mode, Doc::Slice(&group.contents)));
                }
                FormatElement::ConditionalGroup(alternatives) => {
                    let alternative = if mode == Mode::Break {
                        alternatives.last()
                    } else {
                        alternatives.first()
                    };
                    if let Some(alternative) = alternative {
                        stack.push((mode, Doc::Element(alternative)));
                    }
                }
                FormatElement::LineSuffix(_) => {
                    if mode == Mode::Flat {
                        return false;
                    }
                }
            }
        }
        false
    }

    fn write_text(&mut self, text: &str) {
        match text.rfind('\n') {
            Some(last_newline) => {
                self.buffer.push_str(text);
                self.column = self.text_width(&text[last_newline + 1..]);
            }
            None => {
                self.buffer.push_str(text);
                self.column += self.text_width(text);
            }
        }
    }

    fn text_width(&self, text: &str) -> usize {
        text.chars()
            .map(|c| match c {
                '\t' => self.options.tab_width,
                c => c.width().unwrap_or(0),
            })
            .sum()
    }

    fn trim_trailing_whitespace(&mut self) {
        let trimmed = self.buffer.trim_end_matches([' ', '\t']).len();
        self.buffer.truncate(trimmed);
    }

    fn newline(&mut self, indent: usize) {
        self.trim_trailing_whitespace();
        self.buffer.push('\n');
        self.write_indent(indent);
    }

    /// Exactly one blank line, never at the start of output
    fn blank_line(&mut self, indent: usize) {
        self.trim_trailing_whitespace();
        if !self.buffer.is_empty() {
            let trailing = self.buffer.len() - self.buffer.trim_end_matches('\n').len();
            for _ in trailing.min(2)..2 {
                self.buffer.push('\n');
            }
        }
        self.write_indent(indent);
    }

    fn write_indent(&mut self, level: usize) {
        if self.options.use_tabs {
            for _ in 0..level {
                self.buffer.push('\t');
            }
            self.column = level * self.options.tab_width;
        } else {
            let width = level * self.options.indent_size;
            self.buffer.extend(std::iter::repeat_n(' ', width));
            self.column = width;
        }
    }
}

fn push_slice<'a>(commands: &mut Vec<Command<'a>>, command: Command<'a>, elements: &'a [FormatElement]) {
    commands.extend(
        elements
            .iter()
            .rev()
            .map(|element| Command::new(command.indent, command.mode, Doc::Element(element))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::format_element::*;

    fn print_with_width(document: &FormatElement, line_width: usize) -> String {
        let mut printer = Printer::new(PrinterOptions {
            line_width,
            ..PrinterOptions::default()
        });
        printer.print(document).unwrap()
    }

    /// `name(arg, arg, ...)` breaking one argument per line
    fn call(name: &str, args: &[&str]) -> FormatElement {
        let args = args.iter().map(|a| text(a)).collect();
        group(vec![
            text(name),
            token("("),
            indent(vec![
                soft_line_break(),
                sequence(join(args, &[token(","), soft_line_break_or_space()])),
            ]),
            soft_line_break(),
            token(")"),
        ])
    }

    #[test]
    fn test_group_fits_flat() {
        let document = call("draw", &["x", "y", "z"]);
        assert_eq!(print_with_width(&document, 80), "draw(x, y, z)");
    }

    #[test]
    fn test_group_breaks_when_too_wide() {
        let document = call("draw", &["first_argument", "second_argument"]);
        assert_eq!(
            print_with_width(&document, 20),
            "draw(\n  first_argument,\n  second_argument\n)"
        );
    }

    #[test]
    fn test_nested_group_measured_independently() {
        let inner = call("g", &["a", "b"]);
        let document = group(vec![
            text("outer_function"),
            token("("),
            indent(vec![soft_line_break(), inner, token(","), soft_line_break_or_space(), text("long_name_here")]),
            soft_line_break(),
            token(")"),
        ]);
        assert_eq!(
            print_with_width(&document, 20),
            "outer_function(\n  g(a, b),\n  long_name_here\n)"
        );
    }

    #[test]
    fn test_rest_of_line_counts() {
        // Fits alone, but not with the text that follows on the same line
        let document = sequence(vec![call("f", &["aaaa", "bbbb"]), text(" + tail_text")]);
        assert_eq!(print_with_width(&document, 20), "f(\n  aaaa,\n  bbbb\n) + tail_text");
    }

    #[test]
    fn test_hard_break_forces_group() {
        let document = group(vec![text("{"), indent(vec![hard_line_break(), text("x;")]), hard_line_break(), text("}")]);
        assert_eq!(print_with_width(&document, 80), "{\n  x;\n}");
    }

    #[test]
    fn test_empty_line_is_single_blank() {
        let document = sequence(vec![
            text("a"),
            hard_line_break(),
            empty_line(),
            text("b"),
            empty_line(),
            empty_line(),
            text("c"),
        ]);
        assert_eq!(print_with_width(&document, 80), "a\n\nb\n\nc");
    }

    #[test]
    fn test_no_blank_line_at_start() {
        let document = sequence(vec![empty_line(), text("a")]);
        assert_eq!(print_with_width(&document, 80), "a");
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        let document = sequence(vec![text("a"), space(), hard_line_break(), text("b")]);
        assert_eq!(print_with_width(&document, 80), "a\nb");
    }

    #[test]
    fn test_fill_packs_greedily() {
        let items = ["10", "20", "30", "40", "50", "60"];
        let parts = join(
            items.iter().map(|i| text(i)).collect(),
            &[soft_line_break_or_space()],
        );
        let document = fill(parts);
        assert_eq!(print_with_width(&document, 8), "10 20 30\n40 50 60");
    }

    #[test]
    fn test_conditional_group_picks_first_that_fits() {
        let document = conditional_group(vec![
            text("short"),
            sequence(vec![text("fallback")]),
        ]);
        assert_eq!(print_with_width(&document, 80), "short");
        assert_eq!(print_with_width(&document, 3), "fallback");
    }

    #[test]
    fn test_conditional_group_fallback_prints_broken() {
        let document = conditional_group(vec![
            text("aaaaaaaaaa.bbbbbbbbbb()"),
            sequence(vec![text("aaaaaaaaaa"), indent(vec![soft_line_break(), text(".bbbbbbbbbb()")])]),
        ]);
        assert_eq!(print_with_width(&document, 12), "aaaaaaaaaa\n  .bbbbbbbbbb()");
    }

    #[test]
    fn test_empty_conditional_group_is_an_error() {
        let mut printer = Printer::new(PrinterOptions::default());
        assert_eq!(
            printer.print(&conditional_group(vec![])),
            Err(PrintError::EmptyConditionalGroup)
        );
    }

    #[test]
    fn test_line_suffix_flushes_before_newline() {
        let document = sequence(vec![
            text("a"),
            line_suffix(" // note"),
            token(";"),
            hard_line_break(),
            text("b"),
        ]);
        assert_eq!(print_with_width(&document, 80), "a; // note\nb");
    }

    #[test]
    fn test_line_suffix_flushes_at_end() {
        let document = sequence(vec![text("a"), line_suffix(" // end")]);
        assert_eq!(print_with_width(&document, 80), "a // end");
    }

    #[test]
    fn test_line_suffix_breaks_enclosing_group() {
        let document = call("f", &["a", "b"]);
        let FormatElement::Group(mut inner) = document else {
            unreachable!()
        };
        inner.contents.insert(3, line_suffix(" // c"));
        let document = group(inner.contents);
        assert!(print_with_width(&document, 80).contains('\n'));
    }

    #[test]
    fn test_unicode_width() {
        let document = call("f", &["日本語日本語", "x"]);
        // Six wide characters take twelve columns
        assert_eq!(print_with_width(&document, 17), "f(\n  日本語日本語,\n  x\n)");
        assert_eq!(print_with_width(&document, 18), "f(日本語日本語, x)");
    }

    #[test]
    fn test_tab_indentation() {
        let mut printer = Printer::new(PrinterOptions {
            use_tabs: true,
            ..PrinterOptions::default()
        });
        let document = sequence(vec![text("{"), indent(vec![hard_line_break(), text("x")]), hard_line_break(), text("}")]);
        assert_eq!(printer.print(&document).unwrap(), "{\n\tx\n}");
    }

    #[test]
    fn test_multiline_text_sets_column() {
        let document = sequence(vec![text("/* a\n   b */"), call("f", &["x"])]);
        assert_eq!(print_with_width(&document, 80), "/* a\n   b */f(x)");
    }
}
