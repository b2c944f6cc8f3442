//! Comment attachment
//!
//! Assigns every comment token to exactly one AST node as a leading,
//! trailing or dangling comment, and records where the source had blank
//! lines so the printer can keep (at most) one of them.
//!
//! The trivia between two significant tokens is a *gap*. Comments in a gap
//! that sit before its first line break form the trailing segment; the rest
//! form the leading segment. Attachment runs in three passes:
//!
//! 1. trailing segments go to the outermost node ending on the token before
//!    the gap (line comments after a `,` or `;` go to the node before the
//!    separator);
//! 2. remaining segments go to the outermost node starting on the token after
//!    the gap, as leading comments;
//! 3. whatever is left dangles on the deepest node enclosing the gap.
//!
//! Segments are claimed by the index of their first comment token, so no
//! comment can be attached twice.

use std::collections::{HashMap, HashSet};

use super::ast::{Ast, Node, NodeId, TokenSpan};
use super::lexer::LineIndex;
use super::{CstToken, GmlSyntaxKind};
use crate::error::GmlError;
use crate::result::Result;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

/// Where a comment prints relative to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentPlacement {
    Leading,
    Trailing,
    Dangling,
}

/// A comment attached to a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub kind: CommentKind,
    pub placement: CommentPlacement,
    /// Index of the comment token in the lexer output
    pub token_index: usize,
    /// First and last source line (0-based)
    pub lines: (usize, usize),
    pub newline_before: bool,
    pub newline_after: bool,
    pub blank_line_before: bool,
    pub blank_line_after: bool,
}

impl Comment {
    pub fn is_line(&self) -> bool {
        self.kind == CommentKind::Line
    }

    /// Text with trailing whitespace removed
    pub fn trimmed(&self) -> &str {
        self.text.trim_end()
    }
}

/// Comments by owning node, plus the blank-line record
#[derive(Debug, Clone, Default)]
pub struct CommentMap {
    by_node: HashMap<NodeId, Vec<Comment>>,
    /// Significant tokens preceded by at least one blank line
    blank_before: HashSet<usize>,
    total: usize,
}

impl CommentMap {
    fn comments(&self, id: NodeId, placement: CommentPlacement) -> impl Iterator<Item = &Comment> {
        self.by_node
            .get(&id)
            .into_iter()
            .flatten()
            .filter(move |comment| comment.placement == placement)
    }

    pub fn leading(&self, id: NodeId) -> impl Iterator<Item = &Comment> {
        self.comments(id, CommentPlacement::Leading)
    }

    pub fn trailing(&self, id: NodeId) -> impl Iterator<Item = &Comment> {
        self.comments(id, CommentPlacement::Trailing)
    }

    pub fn dangling(&self, id: NodeId) -> impl Iterator<Item = &Comment> {
        self.comments(id, CommentPlacement::Dangling)
    }

    pub fn has_comments(&self, id: NodeId) -> bool {
        self.by_node.get(&id).is_some_and(|comments| !comments.is_empty())
    }

    pub fn has_trailing_line_comment(&self, id: NodeId) -> bool {
        self.trailing(id).any(Comment::is_line)
    }

    /// Was there a blank line in the source right before token `index`
    /// (or before the first leading comment in front of it)?
    pub fn has_blank_line_before(&self, index: usize) -> bool {
        self.blank_before.contains(&index)
    }

    /// Number of attached comments
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// All attached comments, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Comment)> {
        self.by_node
            .iter()
            .flat_map(|(id, comments)| comments.iter().map(move |comment| (*id, comment)))
    }

    fn attach(&mut self, id: NodeId, placement: CommentPlacement, comments: Vec<Comment>) {
        self.total += comments.len();
        let entry = self.by_node.entry(id).or_default();
        entry.extend(comments.into_iter().map(|mut comment| {
            comment.placement = placement;
            comment
        }));
    }
}

/// Attach every comment in `tokens` to a node of `ast`
///
/// # Errors
///
/// Returns `GmlError::CommentAttachment` when a comment has no enclosing
/// node, which means AST spans and the token stream disagree.
pub fn attach_comments(ast: &Ast, tokens: &[CstToken], source: &str) -> Result<CommentMap> {
    let index = NodeIndex::new(&ast.root);
    let mut gaps = collect_gaps(tokens, &LineIndex::new(source));
    let mut map = CommentMap::default();
    let mut claimed: HashSet<usize> = HashSet::new();

    for gap in &gaps {
        if gap.blank_before {
            map.blank_before.insert(gap.after);
        }
    }

    // Pass 1: trailing
    for gap in &mut gaps {
        let Some(before) = gap.before else {
            continue;
        };
        if gap.trailing.is_empty() {
            continue;
        }
        let separator = matches!(
            tokens[before].kind,
            GmlSyntaxKind::Comma | GmlSyntaxKind::Semicolon
        );
        let owner = index.ends_at.get(&before).copied().or_else(|| {
            let has_line = gap.trailing.iter().any(Comment::is_line);
            if separator && has_line {
                gap.before_separator
                    .and_then(|token| index.ends_at.get(&token).copied())
            } else {
                None
            }
        });
        let segment = std::mem::take(&mut gap.trailing);
        match owner {
            Some(id) if claimed.insert(segment[0].token_index) => {
                map.attach(id, CommentPlacement::Trailing, segment);
            }
            _ => {
                let mut leading = segment;
                leading.append(&mut gap.leading);
                gap.leading = leading;
            }
        }
    }

    // Pass 2: leading
    for gap in &mut gaps {
        if gap.leading.is_empty() {
            continue;
        }
        if let Some(&id) = index.starts_at.get(&gap.after) {
            let segment = std::mem::take(&mut gap.leading);
            if claimed.insert(segment[0].token_index) {
                map.attach(id, CommentPlacement::Leading, segment);
            }
        }
    }

    // Pass 3: dangling
    for gap in &mut gaps {
        if gap.leading.is_empty() {
            continue;
        }
        let segment = std::mem::take(&mut gap.leading);
        let first = segment[0].token_index;
        let Some(id) = index.deepest_enclosing(gap.before, gap.after) else {
            return Err(GmlError::comment_attachment(
                first,
                "no node encloses the comment",
            ));
        };
        if claimed.insert(first) {
            map.attach(id, CommentPlacement::Dangling, segment);
        }
    }

    debug!(comments = map.total, "attached comments");
    Ok(map)
}

/// Comments between two significant tokens
#[derive(Debug)]
struct Gap {
    /// Significant token before the gap, `None` at the start of input
    before: Option<usize>,
    /// Significant token before `before`
    before_separator: Option<usize>,
    /// Significant token after the gap
    after: usize,
    trailing: Vec<Comment>,
    leading: Vec<Comment>,
    blank_before: bool,
}

fn collect_gaps(tokens: &[CstToken], lines: &LineIndex) -> Vec<Gap> {
    let mut gaps = Vec::new();
    let mut before = None;
    let mut before_separator = None;
    let mut trivia = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        if token.is_trivia() {
            trivia.push(index);
            continue;
        }
        gaps.push(build_gap(tokens, lines, &trivia, before, before_separator, index));
        trivia.clear();
        before_separator = before;
        before = Some(index);
    }
    gaps
}

fn build_gap(
    tokens: &[CstToken],
    lines: &LineIndex,
    trivia: &[usize],
    before: Option<usize>,
    before_separator: Option<usize>,
    after: usize,
) -> Gap {
    let mut comments: Vec<(Comment, bool)> = Vec::new();
    let mut newlines = 0usize;
    let mut seen_newline = before.is_none();
    let mut newlines_before_leading = None;

    for &index in trivia {
        let token = &tokens[index];
        let kind = match token.kind {
            GmlSyntaxKind::Newline => {
                newlines += 1;
                seen_newline = true;
                continue;
            }
            GmlSyntaxKind::CommentLine => CommentKind::Line,
            GmlSyntaxKind::CommentBlock => CommentKind::Block,
            _ => continue,
        };

        if let Some((previous, _)) = comments.last_mut() {
            previous.newline_after = newlines > 0;
            previous.blank_line_after = newlines >= 2;
        }

        let is_trailing = !seen_newline;
        if !is_trailing && newlines_before_leading.is_none() {
            // Trailing comments never follow a newline, so this is the gap total
            newlines_before_leading = Some(newlines);
        }

        let first_line = lines.line_of(token.span.start);
        let last_line = first_line + token.text.matches('\n').count();
        comments.push((
            Comment {
                text: token.text.clone(),
                kind,
                placement: CommentPlacement::Leading,
                token_index: index,
                lines: (first_line, last_line),
                newline_before: newlines > 0 || before.is_none(),
                newline_after: false,
                blank_line_before: newlines >= 2,
                blank_line_after: false,
            },
            is_trailing,
        ));
        newlines = 0;
    }

    if let Some((last, _)) = comments.last_mut() {
        last.newline_after = newlines > 0;
        last.blank_line_after = newlines >= 2;
    }

    let blank_before = before.is_some()
        && newlines_before_leading.unwrap_or_else(|| count_newlines(tokens, trivia)) >= 2;

    let (trailing, leading): (Vec<_>, Vec<_>) =
        comments.into_iter().partition(|(_, is_trailing)| *is_trailing);
    Gap {
        before,
        before_separator,
        after,
        trailing: trailing.into_iter().map(|(comment, _)| comment).collect(),
        leading: leading.into_iter().map(|(comment, _)| comment).collect(),
        blank_before,
    }
}

fn count_newlines(tokens: &[CstToken], trivia: &[usize]) -> usize {
    trivia
        .iter()
        .filter(|&&index| tokens[index].kind == GmlSyntaxKind::Newline)
        .count()
}

/// Position lookups over the AST
struct NodeIndex {
    /// Outermost comment-accepting node starting at each token
    starts_at: HashMap<usize, NodeId>,
    /// Outermost comment-accepting node ending at each token
    ends_at: HashMap<usize, NodeId>,
    /// Every non-empty node with its span and depth
    spans: Vec<(NodeId, TokenSpan, usize)>,
}

impl NodeIndex {
    fn new(root: &Node) -> Self {
        let mut index = Self {
            starts_at: HashMap::new(),
            ends_at: HashMap::new(),
            spans: Vec::new(),
        };
        index.visit(root, 0);
        index
    }

    fn visit(&mut self, node: &Node, depth: usize) {
        if !node.span.is_empty() {
            self.spans.push((node.id, node.span, depth));
        }
        if node.accepts_comments() {
            self.starts_at.entry(node.span.start).or_insert(node.id);
            if let Some(last) = node.span.last() {
                self.ends_at.entry(last).or_insert(node.id);
            }
        }
        for child in node.children() {
            self.visit(child, depth + 1);
        }
    }

    fn deepest_enclosing(&self, before: Option<usize>, after: usize) -> Option<NodeId> {
        self.spans
            .iter()
            .filter(|(_, span, _)| span.encloses_gap(before, after))
            .max_by_key(|(_, _, depth)| *depth)
            .map(|(id, _, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::ast::NodeKind;
    use crate::cst::{build_ast, parse_gml};

    fn attach(source: &str) -> (Ast, CommentMap) {
        let parsed = parse_gml(source).unwrap();
        let ast = build_ast(&parsed.root, &parsed.tokens).unwrap();
        let map = attach_comments(&ast, &parsed.tokens, source).unwrap();
        (ast, map)
    }

    fn statements(ast: &Ast) -> &[Node] {
        match &ast.root.kind {
            NodeKind::Program { body } => body.list(),
            _ => &[],
        }
    }

    fn texts<'a>(comments: impl Iterator<Item = &'a Comment>) -> Vec<&'a str> {
        comments.map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_leading_and_trailing() {
        let (ast, map) = attach("// lead\nx = 1; // trail\ny = 2;\n");
        let body = statements(&ast);
        assert_eq!(texts(map.leading(body[0].id)), vec!["// lead"]);
        assert_eq!(texts(map.trailing(body[0].id)), vec!["// trail"]);
        assert!(!map.has_comments(body[1].id));
        assert_eq!(map.total(), 2);
    }

    #[test]
    fn test_comment_on_next_line_leads_next_statement() {
        let (ast, map) = attach("x = 1;\n// about y\ny = 2;");
        let body = statements(&ast);
        assert!(!map.has_comments(body[0].id));
        assert_eq!(texts(map.leading(body[1].id)), vec!["// about y"]);
    }

    #[test]
    fn test_comment_in_empty_block_dangles() {
        let (ast, map) = attach("if (a) {\n  // nothing yet\n}");
        let NodeKind::IfStatement { consequent, .. } = &statements(&ast)[0].kind else {
            panic!("expected if");
        };
        let NodeKind::Block { body } = &consequent.kind else {
            panic!("expected block");
        };
        assert_eq!(texts(map.dangling(body.id)), vec!["// nothing yet"]);
    }

    #[test]
    fn test_trailing_after_separator_goes_to_argument() {
        let (ast, map) = attach("f(a, // first\n  b);");
        let NodeKind::CallExpression { arguments, .. } = &statements(&ast)[0].kind else {
            panic!("expected call");
        };
        let first = &arguments.list()[0];
        assert_eq!(texts(map.trailing(first.id)), vec!["// first"]);
    }

    #[test]
    fn test_end_of_file_comment_dangles_on_program() {
        let (ast, map) = attach("x = 1;\n\n// the end\n");
        let NodeKind::Program { body } = &ast.root.kind else {
            panic!("expected program");
        };
        let dangling: Vec<_> = map.dangling(body.id).collect();
        assert_eq!(dangling.len(), 1);
        assert!(dangling[0].blank_line_before);
    }

    #[test]
    fn test_blank_lines_are_recorded() {
        let parsed = parse_gml("a = 1;\n\n\n\nb = 2;\nc = 3;").unwrap();
        let ast = build_ast(&parsed.root, &parsed.tokens).unwrap();
        let map = attach_comments(&ast, &parsed.tokens, "a = 1;\n\n\n\nb = 2;\nc = 3;").unwrap();
        let body = statements(&ast);
        assert!(map.has_blank_line_before(body[1].span.start));
        assert!(!map.has_blank_line_before(body[2].span.start));
    }

    #[test]
    fn test_each_comment_attached_once() {
        let source = "/* a */ x = /* b */ 1; /* c */ // d\n// e\nf(/* g */);\n// h";
        let (_, map) = attach(source);
        assert_eq!(map.total(), 7);
        let mut seen = HashSet::new();
        for (_, comment) in map.iter() {
            assert!(seen.insert(comment.token_index));
        }
    }

    #[test]
    fn test_comment_lines() {
        let (ast, map) = attach("x = 1;\n/* two\nlines */\ny = 2;");
        let comment = map.leading(statements(&ast)[1].id).next().unwrap();
        assert_eq!(comment.lines, (1, 2));
        assert!(comment.newline_before && comment.newline_after);
    }
}
