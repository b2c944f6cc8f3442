//! AST formatter for GML
//!
//! Turns the AST plus its comment map into a Doc IR document and renders
//! it with the layout engine. This is the whole pipeline behind
//! [`format_document`]:
//!
//! ```text
//! parse_gml → build_ast → attach_comments → AstFormatter → Printer
//! ```
//!
//! Every node goes through [`AstFormatter::print`], which wraps the node's
//! own document with its leading, dangling and trailing comments. Printed
//! comments are recorded by token index; after printing, the record must
//! match the comment map exactly.
//!
//! # Example
//!
//! ```rust,ignore
//! use gml_core::cst::{FormatOptions, format_document};
//!
//! let formatted = format_document("if (a) b = 1;", &FormatOptions::default()).unwrap();
//! assert_eq!(formatted, "if (a) {\n  b = 1;\n}\n");
//! ```

mod expressions;
mod statements;

use std::collections::HashSet;

use super::ast::{Ast, Node, NodeId, NodeKind};
use super::ast_builder::build_ast;
use super::comments::{Comment, CommentKind, CommentMap, attach_comments};
use super::format_element::{
    FormatElement, empty_line, hard_line_break, line_suffix, sequence, space, text, token,
};
use super::parse_gml;
use super::printer::{Printer, PrinterOptions};
use crate::error::GmlError;
use crate::result::Result;
use tracing::debug;

/// Formatting options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Maximum line width before wrapping
    pub line_width: usize,

    /// Number of spaces per indentation level
    pub indent_width: usize,

    /// Indent with tabs instead of spaces
    pub use_tabs: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            line_width: 80,
            indent_width: 2,
            use_tabs: false,
        }
    }
}

impl FormatOptions {
    fn printer_options(&self) -> PrinterOptions {
        PrinterOptions {
            line_width: self.line_width,
            indent_size: self.indent_width,
            use_tabs: self.use_tabs,
            ..PrinterOptions::default()
        }
    }
}

/// Format GML source text
///
/// All or nothing: any lex, parse or internal error aborts the call and no
/// partial output is produced. The result ends with exactly one newline,
/// unless the program is empty.
pub fn format_document(source: &str, options: &FormatOptions) -> Result<String> {
    let parsed = parse_gml(source)?;
    let ast = build_ast(&parsed.root, &parsed.tokens)?;
    let comments = attach_comments(&ast, &parsed.tokens, source)?;
    let document = print_ast(&ast, &comments)?;

    let mut printer = Printer::new(options.printer_options());
    let output = printer
        .print(&document)
        .map_err(|err| GmlError::unknown_node("ConditionalGroup", err.to_string()))?;

    let output = output.trim_end();
    debug!(bytes = output.len(), "formatted document");
    if output.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("{output}\n"))
    }
}

/// Build the Doc IR for a whole program
pub fn print_ast(ast: &Ast, comments: &CommentMap) -> Result<FormatElement> {
    let mut formatter = AstFormatter::new(comments);
    let document = formatter.print_program(&ast.root)?;
    formatter.verify_comments()?;
    Ok(document)
}

/// One output line of a statement-like list
struct Line {
    doc: FormatElement,
    /// The source had a blank line before this entry
    blank_before: bool,
}

impl Line {
    fn new(doc: FormatElement, blank_before: bool) -> Self {
        Self { doc, blank_before }
    }
}

/// Join lines with hard breaks, keeping one blank line where the source had
/// any
fn join_lines(lines: Vec<Line>) -> Vec<FormatElement> {
    let mut parts = Vec::with_capacity(lines.len() * 2);
    for (index, line) in lines.into_iter().enumerate() {
        if index > 0 {
            parts.push(if line.blank_before {
                empty_line()
            } else {
                hard_line_break()
            });
        }
        parts.push(line.doc);
    }
    parts
}

/// Doc builder over one AST and its comments
///
/// `printed` is the per-call record of comments already emitted.
pub(crate) struct AstFormatter<'a> {
    comments: &'a CommentMap,
    printed: HashSet<usize>,
}

impl<'a> AstFormatter<'a> {
    fn new(comments: &'a CommentMap) -> Self {
        Self {
            comments,
            printed: HashSet::new(),
        }
    }

    fn print_program(&mut self, root: &Node) -> Result<FormatElement> {
        let NodeKind::Program { body } = &root.kind else {
            return Err(GmlError::unknown_node(root.kind_name(), "program root"));
        };
        let lines = self.statement_lines(body)?;
        Ok(sequence(join_lines(lines)))
    }

    /// Print a node with its comments
    fn print(&mut self, node: &Node) -> Result<FormatElement> {
        let doc = self.print_kind(node)?;
        self.with_comments(node, doc)
    }

    /// The single dispatch over node variants
    fn print_kind(&mut self, node: &Node) -> Result<FormatElement> {
        match &node.kind {
            NodeKind::Program { .. } | NodeKind::NodeList(_) => Err(GmlError::unknown_node(
                node.kind_name(),
                "nested node position",
            )),
            NodeKind::Empty => Ok(sequence(Vec::new())),

            NodeKind::Block { body } => {
                let lines = self.statement_lines(body)?;
                Ok(statements::braces(lines))
            }
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => self.print_if(test, consequent, alternate),
            NodeKind::DoStatement { body, test } => self.print_do(body, test),
            NodeKind::WhileStatement { test, body } => self.print_clause("while", test, body),
            NodeKind::RepeatStatement { count, body } => self.print_clause("repeat", count, body),
            NodeKind::WithStatement { object, body } => self.print_clause("with", object, body),
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => self.print_for(init, test, update, body),
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => self.print_switch(discriminant, cases),
            NodeKind::SwitchCase { test, body } => self.print_case(test, body),
            NodeKind::ContinueStatement => Ok(token("continue")),
            NodeKind::BreakStatement => Ok(token("break")),
            NodeKind::ExitStatement => Ok(token("exit")),
            NodeKind::ReturnStatement { argument } => self.print_keyword_argument("return", argument),
            NodeKind::ThrowStatement { argument } => self.print_keyword_argument("throw", argument),
            NodeKind::DeleteStatement { argument } => self.print_keyword_argument("delete", argument),
            NodeKind::TryStatement {
                block,
                param,
                handler,
                finalizer,
            } => self.print_try(block, param, handler, finalizer),
            NodeKind::VariableDeclarationList {
                modifier,
                declarations,
            } => self.print_variable_list(modifier.as_str(), declarations),
            NodeKind::VariableDeclaration { name, init }
            | NodeKind::EnumMember { name, init }
            | NodeKind::Parameter {
                name,
                default: init,
            } => self.print_binding(name, init),
            NodeKind::GlobalVarStatement { names } => self.print_globalvar(names),
            NodeKind::FunctionDeclaration { name, params, body } => {
                self.print_function(name, params, None, body)
            }
            NodeKind::StructDeclaration {
                name,
                params,
                parent,
                body,
            } => self.print_function(name, params, Some(&**parent), body),
            NodeKind::EnumDeclaration { name, members } => self.print_enum(name, members),
            NodeKind::MacroStatement { text: directive }
            | NodeKind::RegionStatement { text: directive }
            | NodeKind::DefineStatement { text: directive } => Ok(text(directive)),

            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            } => Ok(sequence(vec![
                self.print(left)?,
                space(),
                token(operator.as_str()),
                space(),
                self.print(right)?,
            ])),
            NodeKind::BinaryExpression { .. } => self.print_binary(node, true),
            NodeKind::UnaryExpression { operator, argument } => {
                self.print_unary(operator.as_str(), argument)
            }
            NodeKind::UpdateExpression {
                operator,
                prefix,
                argument,
            } => self.print_update(operator.as_str(), *prefix, argument),
            NodeKind::TernaryExpression {
                test,
                consequent,
                alternate,
            } => self.print_ternary(test, consequent, alternate),
            NodeKind::NewExpression { callee, arguments } => Ok(sequence(vec![
                token("new "),
                self.print(callee)?,
                self.print_arguments(arguments)?,
            ])),
            NodeKind::CallExpression { .. }
            | NodeKind::MemberDotExpression { .. }
            | NodeKind::MemberIndexExpression { .. } => self.print_chain(node),
            NodeKind::Literal(literal) => self.print_literal(literal),
            NodeKind::StructProperty { key, value } => {
                if value.is_empty() {
                    Ok(text(key))
                } else {
                    Ok(sequence(vec![text(key), token(": "), self.print(value)?]))
                }
            }
            NodeKind::Identifier { name } => Ok(text(name)),
        }
    }

    // ==================
    // Comments
    // ==================

    fn with_comments(&mut self, node: &Node, doc: FormatElement) -> Result<FormatElement> {
        if !self.comments.has_comments(node.id) {
            return Ok(doc);
        }
        let mut parts = self.leading_parts(node)?;
        parts.push(doc);
        parts.extend(self.trailing_parts(node.id)?);
        Ok(sequence(parts))
    }

    /// Leading comments, plus dangling ones of nodes that are not lists
    fn leading_parts(&mut self, node: &Node) -> Result<Vec<FormatElement>> {
        let comments = self.comments;
        let mut parts = Vec::new();
        for comment in comments.leading(node.id) {
            parts.push(self.comment(comment)?);
            parts.push(leading_separator(comment));
        }
        if !matches!(node.kind, NodeKind::NodeList(_)) {
            for comment in comments.dangling(node.id) {
                parts.push(self.comment(comment)?);
                parts.push(if comment.is_line() {
                    hard_line_break()
                } else {
                    space()
                });
            }
        }
        Ok(parts)
    }

    /// Trailing comments: line comments move to the end of the output line
    fn trailing_parts(&mut self, id: NodeId) -> Result<Vec<FormatElement>> {
        let comments = self.comments;
        let mut parts = Vec::new();
        for comment in comments.trailing(id) {
            self.mark_printed(comment)?;
            if comment.is_line() {
                parts.push(line_suffix(&format!(" {}", comment.trimmed())));
            } else {
                parts.push(space());
                parts.push(text(comment.trimmed()));
            }
        }
        Ok(parts)
    }

    /// Dangling comments of a list, one per line
    fn dangling_lines(&mut self, id: NodeId) -> Result<Vec<Line>> {
        let comments = self.comments;
        let mut lines = Vec::new();
        for comment in comments.dangling(id) {
            lines.push(Line::new(self.comment(comment)?, comment.blank_line_before));
        }
        Ok(lines)
    }

    /// Dangling comments of an inline list, each on its own line
    fn dangling_suffix(&mut self, list: &Node) -> Result<Vec<FormatElement>> {
        let mut parts = Vec::new();
        for line in self.dangling_lines(list.id)? {
            parts.push(hard_line_break());
            parts.push(line.doc);
        }
        Ok(parts)
    }

    fn comment(&mut self, comment: &Comment) -> Result<FormatElement> {
        self.mark_printed(comment)?;
        Ok(text(comment.trimmed()))
    }

    fn mark_printed(&mut self, comment: &Comment) -> Result<()> {
        if self.printed.insert(comment.token_index) {
            Ok(())
        } else {
            Err(GmlError::comment_attachment(
                comment.token_index,
                "comment printed twice",
            ))
        }
    }

    /// Every attached comment must have been printed exactly once
    fn verify_comments(&self) -> Result<()> {
        if self.printed.len() == self.comments.total() {
            return Ok(());
        }
        let missing = self
            .comments
            .iter()
            .map(|(_, comment)| comment.token_index)
            .filter(|index| !self.printed.contains(index))
            .min()
            .unwrap_or_default();
        Err(GmlError::comment_attachment(
            missing,
            "comment was attached but never printed",
        ))
    }
}

/// What follows a leading comment before its node
fn leading_separator(comment: &Comment) -> FormatElement {
    if comment.blank_line_after {
        empty_line()
    } else if comment.kind == CommentKind::Line || comment.newline_after {
        hard_line_break()
    } else {
        space()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(source: &str) -> String {
        format_document(source, &FormatOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(format(""), "");
        assert_eq!(format("\n\n  \n"), "");
        assert_eq!(format(";;"), "");
    }

    #[test]
    fn test_single_trailing_newline() {
        assert_eq!(format("x = 1;\n\n\n"), "x = 1;\n");
        assert_eq!(format("x = 1"), "x = 1;\n");
    }

    #[test]
    fn test_brace_insertion() {
        assert_eq!(format("if (a) b = 1;"), "if (a) {\n  b = 1;\n}\n");
    }

    #[test]
    fn test_comment_only_program() {
        assert_eq!(format("// just a note\n"), "// just a note\n");
    }

    #[test]
    fn test_print_ast_counts_comments() {
        let source = "// a\nx = 1; // b\n/* c */";
        let parsed = parse_gml(source).unwrap();
        let ast = build_ast(&parsed.root, &parsed.tokens).unwrap();
        let comments = attach_comments(&ast, &parsed.tokens, source).unwrap();
        assert_eq!(comments.total(), 3);
        print_ast(&ast, &comments).unwrap();
    }

    #[test]
    fn test_errors_abort_formatting() {
        let err = format_document("if (a {", &FormatOptions::default()).unwrap_err();
        assert!(err.is_user_error());
        assert!(matches!(err, GmlError::Parse { .. }));
    }
}
