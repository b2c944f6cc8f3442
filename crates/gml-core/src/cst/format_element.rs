//! Format elements for building formatted output
//!
//! This module provides the Doc IR: a width-independent description of the
//! output that the layout engine (`printer`) turns into text. It keeps the
//! Token/Text split used by Ruff and Biome formatters:
//! - Static, ASCII-only text (keywords, operators, punctuation) - fast path
//! - Dynamic text from source (identifiers, literals, comments) - slow path
//!
//! # Example
//!
//! ```rust,ignore
//! use gml_core::cst::format_element::*;
//!
//! let call = group(vec![
//!     text("draw"),
//!     token("("),
//!     indent(vec![soft_line_break(), text("x")]),
//!     soft_line_break(),
//!     token(")"),
//! ]);
//! ```

use std::fmt;

/// Line break flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Nothing when flat, a newline when broken
    Soft,
    /// A space when flat, a newline when broken
    SoftOrSpace,
    /// Always a newline
    Hard,
    /// Always exactly one blank line
    Empty,
}

/// Elements that print flat when they fit, broken otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub contents: Vec<FormatElement>,
    /// Contains a forced break, so it can never print flat
    pub expand: bool,
}

/// Format element - building block for formatted output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatElement {
    /// Static compile-time text: keywords, operators, punctuation
    ///
    /// Must be ASCII and free of line breaks.
    Token(&'static str),

    /// Dynamic text from source: identifiers, literals, comments
    ///
    /// May contain Unicode and, for block comments and directives, newlines.
    Text(Box<str>),

    /// Single ASCII space
    Space,

    Line(LineMode),

    /// Contents printed one indentation level deeper
    Indent(Vec<FormatElement>),

    Group(Group),

    Sequence(Vec<FormatElement>),

    /// Alternating content and separator elements, packed greedily per line
    Fill(Vec<FormatElement>),

    /// Ordered alternatives; the first that fits wins, the last is the fallback
    ConditionalGroup(Vec<FormatElement>),

    /// Text deferred to the end of the current line (trailing line comments)
    LineSuffix(Box<str>),
}

impl FormatElement {
    /// Check if this element is empty (contains no actual content)
    pub fn is_empty(&self) -> bool {
        match self {
            FormatElement::Token(s) => s.is_empty(),
            FormatElement::Text(text) | FormatElement::LineSuffix(text) => text.is_empty(),
            FormatElement::Space | FormatElement::Line(_) => false,
            FormatElement::Group(group) => group.contents.iter().all(|e| e.is_empty()),
            FormatElement::Indent(elements)
            | FormatElement::Sequence(elements)
            | FormatElement::Fill(elements)
            | FormatElement::ConditionalGroup(elements) => elements.iter().all(|e| e.is_empty()),
        }
    }

    /// Does printing this element always produce a line break?
    ///
    /// Conditional groups pick their own layout and never force their parent.
    pub fn will_break(&self) -> bool {
        match self {
            FormatElement::Line(LineMode::Hard | LineMode::Empty) => true,
            FormatElement::Text(text) => text.contains('\n'),
            FormatElement::LineSuffix(_) => true,
            FormatElement::Group(group) => group.expand,
            FormatElement::Indent(elements)
            | FormatElement::Sequence(elements)
            | FormatElement::Fill(elements) => elements.iter().any(FormatElement::will_break),
            FormatElement::Token(_)
            | FormatElement::Space
            | FormatElement::Line(_)
            | FormatElement::ConditionalGroup(_) => false,
        }
    }
}

impl fmt::Display for FormatElement {
    /// Flat rendering, for debugging
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatElement::Token(s) => write!(f, "{s}"),
            FormatElement::Text(text) | FormatElement::LineSuffix(text) => write!(f, "{text}"),
            FormatElement::Space | FormatElement::Line(LineMode::SoftOrSpace) => write!(f, " "),
            FormatElement::Line(LineMode::Soft) => Ok(()),
            FormatElement::Line(LineMode::Hard) => writeln!(f),
            FormatElement::Line(LineMode::Empty) => write!(f, "\n\n"),
            FormatElement::Group(Group { contents, .. })
            | FormatElement::Indent(contents)
            | FormatElement::Sequence(contents)
            | FormatElement::Fill(contents) => {
                for element in contents {
                    write!(f, "{element}")?;
                }
                Ok(())
            }
            FormatElement::ConditionalGroup(alternatives) => match alternatives.first() {
                Some(first) => write!(f, "{first}"),
                None => Ok(()),
            },
        }
    }
}

/// Builder API: Create token for static, ASCII-only text
///
/// # Panics
///
/// In debug builds, panics if `text` is not ASCII or contains line breaks
/// or tabs.
pub fn token(text: &'static str) -> FormatElement {
    debug_assert!(text.is_ascii(), "Token must be ASCII only, got: {:?}", text);
    debug_assert!(
        !text.contains(['\n', '\r', '\t']),
        "Token cannot contain newlines/tabs, use line breaks/Space instead: {:?}",
        text
    );
    FormatElement::Token(text)
}

/// Builder API: Create text element from dynamic source content
pub fn text(text: &str) -> FormatElement {
    FormatElement::Text(text.into())
}

pub fn space() -> FormatElement {
    FormatElement::Space
}

/// Builder API: Nothing when flat, newline when broken
pub fn soft_line_break() -> FormatElement {
    FormatElement::Line(LineMode::Soft)
}

/// Builder API: Space when flat, newline when broken
pub fn soft_line_break_or_space() -> FormatElement {
    FormatElement::Line(LineMode::SoftOrSpace)
}

/// Builder API: Always a newline
pub fn hard_line_break() -> FormatElement {
    FormatElement::Line(LineMode::Hard)
}

/// Builder API: One blank line, however many the source had
pub fn empty_line() -> FormatElement {
    FormatElement::Line(LineMode::Empty)
}

pub fn indent(elements: Vec<FormatElement>) -> FormatElement {
    FormatElement::Indent(elements)
}

/// Builder API: Group elements together
///
/// Groups try to stay on one line if they fit within the line width.
pub fn group(elements: Vec<FormatElement>) -> FormatElement {
    let expand = elements.iter().any(FormatElement::will_break);
    FormatElement::Group(Group {
        contents: elements,
        expand,
    })
}

/// Builder API: Group that always prints broken
pub fn expanded_group(elements: Vec<FormatElement>) -> FormatElement {
    FormatElement::Group(Group {
        contents: elements,
        expand: true,
    })
}

/// Builder API: Create a sequence of elements
pub fn sequence(elements: Vec<FormatElement>) -> FormatElement {
    FormatElement::Sequence(elements)
}

/// Builder API: `[content, separator, content, ...]` packed greedily
pub fn fill(parts: Vec<FormatElement>) -> FormatElement {
    FormatElement::Fill(parts)
}

/// Builder API: Alternatives tried in order
pub fn conditional_group(alternatives: Vec<FormatElement>) -> FormatElement {
    FormatElement::ConditionalGroup(alternatives)
}

/// Builder API: Text printed right before the next newline
pub fn line_suffix(text: &str) -> FormatElement {
    FormatElement::LineSuffix(text.into())
}

/// Join `elements` with clones of `separator`
pub fn join(elements: Vec<FormatElement>, separator: &[FormatElement]) -> Vec<FormatElement> {
    let mut joined = Vec::with_capacity(elements.len() * (separator.len() + 1));
    for (index, element) in elements.into_iter().enumerate() {
        if index > 0 {
            joined.extend(separator.iter().cloned());
        }
        joined.push(element);
    }
    joined
}
