//! Trivia-preserving lexer for GML
//!
//! Whitespace, newlines and comments are kept as tokens on the hidden channel
//! so the parse tree stays lossless and the comment attacher can find them by
//! token index. Grammar rules only ever look at default-channel tokens.
//!
//! Template strings (`$"a {b} c"`) are split into start/text/splice/end
//! tokens; the expression inside a splice is lexed like ordinary code.

use crate::cst::GmlSyntaxKind;
use std::ops::Range;

/// Simple span representing a byte range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Token channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Significant tokens consumed by the grammar
    Default,
    /// Whitespace and comments
    Hidden,
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: GmlSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: GmlSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn channel(&self) -> Channel {
        if self.kind.is_trivia() {
            Channel::Hidden
        } else {
            Channel::Default
        }
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Lexer state while inside template strings
#[derive(Debug, Clone, Copy)]
enum Mode {
    /// Inside the literal part of `$"..."`
    Template { start: usize },
    /// Inside a `{...}` splice, counting nested braces
    Splice { depth: usize },
}

/// Operators and punctuation, longest first so maximal munch falls out of
/// the first match
const OPERATORS: &[(&str, GmlSyntaxKind)] = &[
    ("<<=", GmlSyntaxKind::ShlEq),
    (">>=", GmlSyntaxKind::ShrEq),
    ("??=", GmlSyntaxKind::QuestionQuestionEq),
    ("==", GmlSyntaxKind::EqEq),
    ("!=", GmlSyntaxKind::BangEq),
    ("<>", GmlSyntaxKind::LtGt),
    ("<=", GmlSyntaxKind::LtEq),
    (">=", GmlSyntaxKind::GtEq),
    ("&&", GmlSyntaxKind::AmpAmp),
    ("||", GmlSyntaxKind::PipePipe),
    ("^^", GmlSyntaxKind::CaretCaret),
    ("??", GmlSyntaxKind::QuestionQuestion),
    ("<<", GmlSyntaxKind::Shl),
    (">>", GmlSyntaxKind::Shr),
    ("++", GmlSyntaxKind::PlusPlus),
    ("--", GmlSyntaxKind::MinusMinus),
    ("+=", GmlSyntaxKind::PlusEq),
    ("-=", GmlSyntaxKind::MinusEq),
    ("*=", GmlSyntaxKind::StarEq),
    ("/=", GmlSyntaxKind::SlashEq),
    ("%=", GmlSyntaxKind::PercentEq),
    ("&=", GmlSyntaxKind::AmpEq),
    ("|=", GmlSyntaxKind::PipeEq),
    ("^=", GmlSyntaxKind::CaretEq),
    (":=", GmlSyntaxKind::ColonEq),
    ("[|", GmlSyntaxKind::ListAccessor),
    ("[?", GmlSyntaxKind::MapAccessor),
    ("[#", GmlSyntaxKind::GridAccessor),
    ("[@", GmlSyntaxKind::ArrayAccessor),
    ("(", GmlSyntaxKind::LParen),
    (")", GmlSyntaxKind::RParen),
    ("[", GmlSyntaxKind::LBracket),
    ("]", GmlSyntaxKind::RBracket),
    ("{", GmlSyntaxKind::LBrace),
    ("}", GmlSyntaxKind::RBrace),
    (";", GmlSyntaxKind::Semicolon),
    (",", GmlSyntaxKind::Comma),
    (".", GmlSyntaxKind::Dot),
    (":", GmlSyntaxKind::Colon),
    ("?", GmlSyntaxKind::Question),
    ("=", GmlSyntaxKind::Eq),
    ("<", GmlSyntaxKind::Lt),
    (">", GmlSyntaxKind::Gt),
    ("!", GmlSyntaxKind::Bang),
    ("~", GmlSyntaxKind::Tilde),
    ("&", GmlSyntaxKind::Amp),
    ("|", GmlSyntaxKind::Pipe),
    ("^", GmlSyntaxKind::Caret),
    ("+", GmlSyntaxKind::Plus),
    ("-", GmlSyntaxKind::Minus),
    ("*", GmlSyntaxKind::Star),
    ("/", GmlSyntaxKind::Slash),
    ("%", GmlSyntaxKind::Percent),
];

/// Lex input preserving ALL trivia
///
/// The token list always ends with an `Eof` token, even when errors were
/// reported. Concatenating the token texts reproduces the input.
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut modes: Vec<Mode> = Vec::new();

    let len = input.len();
    let mut i = 0usize;

    while i < len {
        if let Some(Mode::Template { start }) = modes.last().copied() {
            let (kind, end) = lex_template_part(input, i);
            match kind {
                Some(GmlSyntaxKind::TemplateEnd) => {
                    modes.pop();
                }
                Some(GmlSyntaxKind::TemplateSpliceStart) => {
                    modes.push(Mode::Splice { depth: 0 });
                }
                Some(_) => {}
                None => {
                    // A line break ends the template without closing it
                    errors.push(LexerError::new(
                        "Unterminated template string",
                        span(start, i),
                    ));
                    modes.pop();
                    continue;
                }
            }
            if let Some(kind) = kind {
                tokens.push(CstToken::new(kind, &input[i..end], span(i, end)));
            }
            i = end;
            continue;
        }

        let Some((current, size)) = next_char(input, i) else {
            break;
        };
        let start = i;

        match current {
            '\n' => {
                tokens.push(CstToken::new(
                    GmlSyntaxKind::Newline,
                    "\n",
                    span(start, i + size),
                ));
                i += size;
            }
            '\r' => {
                // Handle \r\n as single newline
                let mut end = i + size;
                if let Some(('\n', nl_size)) = next_char(input, end) {
                    end += nl_size;
                }
                tokens.push(CstToken::new(
                    GmlSyntaxKind::Newline,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }
            c if c.is_whitespace() => {
                let end = scan_while(input, i, |c| c.is_whitespace() && c != '\n' && c != '\r');
                tokens.push(CstToken::new(
                    GmlSyntaxKind::Whitespace,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }
            '/' if input[i..].starts_with("//") => {
                let end = scan_while(input, i, |c| c != '\n' && c != '\r');
                tokens.push(CstToken::new(
                    GmlSyntaxKind::CommentLine,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }
            '/' if input[i..].starts_with("/*") => {
                let end = match input[i + 2..].find("*/") {
                    Some(offset) => i + 2 + offset + 2,
                    None => {
                        errors.push(LexerError::new(
                            "Unterminated block comment",
                            span(start, len),
                        ));
                        len
                    }
                };
                tokens.push(CstToken::new(
                    GmlSyntaxKind::CommentBlock,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }
            '"' => {
                let (end, error) = lex_string(input, start);
                if let Some(err) = error {
                    errors.push(err);
                }
                tokens.push(CstToken::new(
                    GmlSyntaxKind::StringLiteral,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }
            '@' if matches!(next_char(input, i + 1), Some(('"' | '\'', _))) => {
                let (end, error) = lex_verbatim_string(input, start);
                if let Some(err) = error {
                    errors.push(err);
                }
                tokens.push(CstToken::new(
                    GmlSyntaxKind::VerbatimStringLiteral,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }
            '$' if input[i..].starts_with("$\"") => {
                let end = i + 2;
                tokens.push(CstToken::new(
                    GmlSyntaxKind::TemplateStart,
                    &input[start..end],
                    span(start, end),
                ));
                modes.push(Mode::Template { start });
                i = end;
            }
            '$' if hex_run_end(input, i + 1).is_some() => {
                let end = hex_run_end(input, i + 1).unwrap_or(i + 1);
                tokens.push(CstToken::new(
                    GmlSyntaxKind::HexLiteral,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }
            '#' => {
                let (kind, end, error) = lex_hash(input, start);
                if let Some(err) = error {
                    errors.push(err);
                }
                tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                i = end;
            }
            c if c.is_ascii_digit() => {
                let (kind, end) = lex_number(input, start);
                tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                i = end;
            }
            '.' if matches!(next_char(input, i + 1), Some((c, _)) if c.is_ascii_digit()) => {
                let (kind, end) = lex_number(input, start);
                tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                i = end;
            }
            c if is_ident_start(c) => {
                let end = scan_while(input, i, is_ident_continue);
                let word = &input[start..end];
                let kind = GmlSyntaxKind::from_keyword(word).unwrap_or(GmlSyntaxKind::Ident);
                tokens.push(CstToken::new(kind, word, span(start, end)));
                i = end;
            }
            '[' if input[i..].starts_with("[$") && hex_run_end(input, i + 2).is_none() => {
                let end = i + 2;
                tokens.push(CstToken::new(
                    GmlSyntaxKind::StructAccessor,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }
            '{' | '}' if matches!(modes.last(), Some(Mode::Splice { .. })) => {
                let end = i + size;
                let kind = match (current, modes.last_mut()) {
                    ('{', Some(Mode::Splice { depth })) => {
                        *depth += 1;
                        GmlSyntaxKind::LBrace
                    }
                    ('}', Some(Mode::Splice { depth })) if *depth > 0 => {
                        *depth -= 1;
                        GmlSyntaxKind::RBrace
                    }
                    _ => {
                        modes.pop();
                        GmlSyntaxKind::TemplateSpliceEnd
                    }
                };
                tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                i = end;
            }
            _ => match lex_operator(input, i) {
                Some((kind, end)) => {
                    tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                    i = end;
                }
                None => {
                    errors.push(LexerError::new(
                        format!("Unexpected character '{current}'"),
                        span(start, i + size),
                    ));
                    i += size;
                }
            },
        }
    }

    for mode in modes.iter().rev() {
        if let Mode::Template { start } = mode {
            errors.push(LexerError::new(
                "Unterminated template string",
                span(*start, len),
            ));
        }
    }

    tokens.push(CstToken::new(GmlSyntaxKind::Eof, "", span(len, len)));
    (tokens, errors)
}

/// Lex input and fail on the first lexical error
pub fn lex(input: &str) -> Result<Vec<CstToken>, LexerError> {
    let (tokens, mut errors) = lex_with_trivia(input);
    if errors.is_empty() {
        return Ok(tokens);
    }
    errors.sort_by_key(|err| err.span.start);
    Err(errors.swap_remove(0))
}

/// Lex one piece of template-string body
///
/// Returns `None` when a line break or end of input is reached before the
/// closing quote.
fn lex_template_part(input: &str, start: usize) -> (Option<GmlSyntaxKind>, usize) {
    let bytes = input.as_bytes();
    match bytes[start] {
        b'"' => return (Some(GmlSyntaxKind::TemplateEnd), start + 1),
        b'{' => return (Some(GmlSyntaxKind::TemplateSpliceStart), start + 1),
        b'\n' | b'\r' => return (None, start),
        _ => {}
    }

    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'{' | b'\n' | b'\r' => break,
            b'\\' => {
                i += 1;
                if let Some((_, size)) = next_char(input, i) {
                    i += size;
                }
            }
            _ => {
                let size = next_char(input, i).map_or(1, |(_, size)| size);
                i += size;
            }
        }
    }
    (Some(GmlSyntaxKind::TemplateText), i)
}

/// Lex a regular `"..."` string; a raw line break terminates it with an error
fn lex_string(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = start + 1; // Skip opening quote

    while i < len {
        match bytes[i] {
            b'"' => return (i + 1, None),
            b'\\' => {
                i += 1;
                if let Some((c, size)) = next_char(input, i) {
                    if c == '\n' || c == '\r' {
                        break;
                    }
                    i += size;
                }
            }
            b'\n' | b'\r' => break,
            _ => i += 1,
        }
    }

    (
        i,
        Some(LexerError::new("Unterminated string literal", span(start, i))),
    )
}

/// Lex a verbatim `@"..."` or `@'...'` string, which may span lines
fn lex_verbatim_string(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let quote = input.as_bytes()[start + 1];
    let body = start + 2;
    match input.as_bytes()[body..].iter().position(|&b| b == quote) {
        Some(offset) => (body + offset + 1, None),
        None => (
            input.len(),
            Some(LexerError::new(
                "Unterminated string literal",
                span(start, input.len()),
            )),
        ),
    }
}

/// Lex `#macro`, `#region`, `#endregion`, `#define` or a `#RRGGBB` color
fn lex_hash(input: &str, start: usize) -> (GmlSyntaxKind, usize, Option<LexerError>) {
    let word_end = scan_while(input, start + 1, is_ident_continue);
    let directive = match &input[start + 1..word_end] {
        "macro" => Some(GmlSyntaxKind::MacroDirective),
        "region" => Some(GmlSyntaxKind::RegionDirective),
        "endregion" => Some(GmlSyntaxKind::EndRegionDirective),
        "define" => Some(GmlSyntaxKind::DefineDirective),
        _ => None,
    };

    if let Some(kind) = directive {
        let end = if kind == GmlSyntaxKind::MacroDirective {
            macro_line_end(input, word_end)
        } else {
            scan_while(input, word_end, |c| c != '\n' && c != '\r')
        };
        return (kind, end, None);
    }

    let digits_end = scan_while(input, start + 1, |c| c.is_ascii_hexdigit());
    if digits_end - start == 7 && word_end == digits_end {
        return (GmlSyntaxKind::HexLiteral, digits_end, None);
    }

    (
        GmlSyntaxKind::Unknown,
        word_end.max(start + 1),
        Some(LexerError::new(
            "Unexpected character '#'",
            span(start, start + 1),
        )),
    )
}

/// End of a `#macro` body; a trailing `\` continues it on the next line
fn macro_line_end(input: &str, from: usize) -> usize {
    let mut i = from;
    loop {
        let end = scan_while(input, i, |c| c != '\n' && c != '\r');
        if !input[i..end].trim_end().ends_with('\\') || end >= input.len() {
            return end;
        }
        i = end;
        if input[i..].starts_with("\r\n") {
            i += 2;
        } else {
            i += 1;
        }
    }
}

/// Lex a numeric literal: decimal, `0x` hex or `0b` binary
fn lex_number(input: &str, start: usize) -> (GmlSyntaxKind, usize) {
    let rest = &input[start..];
    if rest.starts_with("0x") || rest.starts_with("0X") {
        if let Some(end) = hex_run_end(input, start + 2) {
            return (GmlSyntaxKind::HexLiteral, end);
        }
    }
    if rest.starts_with("0b") || rest.starts_with("0B") {
        let end = scan_while(input, start + 2, |c| c == '0' || c == '1' || c == '_');
        if end > start + 2 {
            return (GmlSyntaxKind::BinaryLiteral, end);
        }
    }

    let mut i = scan_while(input, start, |c| c.is_ascii_digit() || c == '_');
    if input[i..].starts_with('.')
        && matches!(next_char(input, i + 1), Some((c, _)) if c.is_ascii_digit())
    {
        i = scan_while(input, i + 1, |c| c.is_ascii_digit() || c == '_');
    }
    (GmlSyntaxKind::NumberLiteral, i)
}

/// End of a run of hex digits starting at `from`, if the run is a whole word
fn hex_run_end(input: &str, from: usize) -> Option<usize> {
    let end = scan_while(input, from, |c| c.is_ascii_hexdigit() || c == '_');
    if end == from || scan_while(input, end, is_ident_continue) != end {
        return None;
    }
    Some(end)
}

fn lex_operator(input: &str, start: usize) -> Option<(GmlSyntaxKind, usize)> {
    let rest = &input[start..];
    OPERATORS
        .iter()
        .find(|(text, _)| rest.starts_with(text))
        .map(|(text, kind)| (*kind, start + text.len()))
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Advance while `pred` holds, returning the end byte offset
fn scan_while(input: &str, start: usize, pred: impl Fn(char) -> bool) -> usize {
    input[start..]
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(input.len(), |(offset, _)| start + offset)
}

/// Get next character and its byte size
fn next_char(input: &str, pos: usize) -> Option<(char, usize)> {
    input.get(pos..)?.chars().next().map(|c| (c, c.len_utf8()))
}

/// Create a span from start to end
fn span(start: usize, end: usize) -> CstSpan {
    start..end
}

/// Maps byte offsets to 1-based line and column numbers
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b'\n' => line_starts.push(i + 1),
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => line_starts.push(i + 1),
                _ => {}
            }
        }
        Self { line_starts }
    }

    /// Line and column (in characters) of `offset`, both 1-based
    pub fn line_col(&self, text: &str, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let end = offset.min(text.len());
        let column = text
            .get(line_start..end)
            .map_or(end - line_start, |s| s.chars().count());
        (line + 1, column + 1)
    }

    /// 0-based line of `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<GmlSyntaxKind> {
        let (tokens, errors) = lex_with_trivia(input);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        tokens
            .into_iter()
            .filter(|t| !t.is_trivia() && t.kind != GmlSyntaxKind::Eof)
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_preserves_trivia() {
        let input = "x  = 1; // set x\n/* block */";
        let (tokens, errors) = lex_with_trivia(input);
        assert!(errors.is_empty());

        let hidden: Vec<_> = tokens
            .iter()
            .filter(|t| t.channel() == Channel::Hidden)
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            hidden,
            vec![
                GmlSyntaxKind::Whitespace,
                GmlSyntaxKind::Whitespace,
                GmlSyntaxKind::Whitespace,
                GmlSyntaxKind::CommentLine,
                GmlSyntaxKind::Newline,
                GmlSyntaxKind::CommentBlock,
            ]
        );
    }

    #[test]
    fn test_lossless_reconstruction() {
        let input = "var s = $\"hp: {hp + 1}!\";\r\nif a and b begin x[| 0] = @'raw\ntext'; end";
        let (tokens, errors) = lex_with_trivia(input);
        assert!(errors.is_empty(), "{errors:?}");

        let reconstructed: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(reconstructed, input);
        assert_eq!(tokens.last().map(|t| t.kind), Some(GmlSyntaxKind::Eof));
    }

    #[test]
    fn test_maximal_munch_operators() {
        assert_eq!(
            kinds("a <<= b >> c ?? d ??= e"),
            vec![
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::ShlEq,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::Shr,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::QuestionQuestion,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::QuestionQuestionEq,
                GmlSyntaxKind::Ident,
            ]
        );
        assert_eq!(
            kinds("i++ <> j--"),
            vec![
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::PlusPlus,
                GmlSyntaxKind::LtGt,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::MinusMinus,
            ]
        );
    }

    #[test]
    fn test_keyword_operators_are_keywords() {
        assert_eq!(
            kinds("a and b or not c mod d"),
            vec![
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::AndKw,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::OrKw,
                GmlSyntaxKind::NotKw,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::ModKw,
                GmlSyntaxKind::Ident,
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(
            kinds("12 1.5 .5 1_000 0xFF $A0 #FF00FF 0b1010"),
            vec![
                GmlSyntaxKind::NumberLiteral,
                GmlSyntaxKind::NumberLiteral,
                GmlSyntaxKind::NumberLiteral,
                GmlSyntaxKind::NumberLiteral,
                GmlSyntaxKind::HexLiteral,
                GmlSyntaxKind::HexLiteral,
                GmlSyntaxKind::HexLiteral,
                GmlSyntaxKind::BinaryLiteral,
            ]
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(
            kinds("a[| 0] b[? k] c[# 1, 2] d[@ 3] e[$ \"k\"] f[$FF]"),
            vec![
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::ListAccessor,
                GmlSyntaxKind::NumberLiteral,
                GmlSyntaxKind::RBracket,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::MapAccessor,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::RBracket,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::GridAccessor,
                GmlSyntaxKind::NumberLiteral,
                GmlSyntaxKind::Comma,
                GmlSyntaxKind::NumberLiteral,
                GmlSyntaxKind::RBracket,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::ArrayAccessor,
                GmlSyntaxKind::NumberLiteral,
                GmlSyntaxKind::RBracket,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::StructAccessor,
                GmlSyntaxKind::StringLiteral,
                GmlSyntaxKind::RBracket,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::LBracket,
                GmlSyntaxKind::HexLiteral,
                GmlSyntaxKind::RBracket,
            ]
        );
    }

    #[test]
    fn test_template_string_splices() {
        assert_eq!(
            kinds("$\"a {b + {c: 1}.c} d\""),
            vec![
                GmlSyntaxKind::TemplateStart,
                GmlSyntaxKind::TemplateText,
                GmlSyntaxKind::TemplateSpliceStart,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::Plus,
                GmlSyntaxKind::LBrace,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::Colon,
                GmlSyntaxKind::NumberLiteral,
                GmlSyntaxKind::RBrace,
                GmlSyntaxKind::Dot,
                GmlSyntaxKind::Ident,
                GmlSyntaxKind::TemplateSpliceEnd,
                GmlSyntaxKind::TemplateText,
                GmlSyntaxKind::TemplateEnd,
            ]
        );
    }

    #[test]
    fn test_directives_take_whole_line() {
        let (tokens, errors) = lex_with_trivia("#macro MAX \\\n 10\n#region Setup stuff\nx = 1;");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, GmlSyntaxKind::MacroDirective);
        assert_eq!(tokens[0].text, "#macro MAX \\\n 10");
        assert_eq!(tokens[2].kind, GmlSyntaxKind::RegionDirective);
        assert_eq!(tokens[2].text, "#region Setup stuff");
    }

    #[test]
    fn test_unterminated_string_reports_start_offset() {
        let input = "x = 1;\ny = \"oops;\nz = 2;";
        let err = lex(input).unwrap_err();
        assert_eq!(err.span.start, 11);
        assert!(err.message.contains("Unterminated string"));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = lex("x = 1; /* never closed").unwrap_err();
        assert_eq!(err.span.start, 7);
    }

    #[test]
    fn test_unterminated_template_string() {
        let err = lex("s = $\"abc {d}").unwrap_err();
        assert_eq!(err.span.start, 4);
        assert!(err.message.contains("template"));
    }

    #[test]
    fn test_unexpected_character() {
        let err = lex("x = 1 ` 2").unwrap_err();
        assert_eq!(err.span, 6..7);
    }

    #[test]
    fn test_line_index() {
        let text = "ab\ncd\r\nef";
        let index = LineIndex::new(text);
        assert_eq!(index.line_col(text, 0), (1, 1));
        assert_eq!(index.line_col(text, 4), (2, 2));
        assert_eq!(index.line_col(text, 7), (3, 1));
        assert_eq!(index.line_of(8), 2);
    }
}
