//! Concrete Syntax Tree (CST) for GML
//!
//! The front half of the formatting pipeline:
//!
//! ```text
//! source ─lexer─▶ tokens ─parser─▶ rowan CST ─ast_builder─▶ AST
//!                   │                                    │
//!                   └──────────── trivia ────────────────┴─▶ comment map
//! ```
//!
//! The CST is lossless (`parse_gml(source)?.root.text() == source`). Trivia
//! tokens stay in the token vector so later passes can find comments by
//! token index without walking the tree.
//!
//! The back half turns the AST into a Doc IR document (`formatter`) and lays
//! it out within the configured width (`printer`).

pub mod ast;
mod ast_builder;
mod builder;
pub mod comments;
pub mod format_element;
pub mod formatter;
mod language;
mod lexer;
mod nodes;
mod parser;
pub mod printer;
mod syntax_kind;

pub use ast::{Ast, Node, NodeId, NodeKind, TokenSpan};
pub use ast_builder::build_ast;
pub use builder::CstBuilder;
pub use comments::{Comment, CommentKind, CommentMap, CommentPlacement, attach_comments};
pub use formatter::{FormatOptions, format_document, print_ast};
pub use language::GmlLanguage;
pub use lexer::{
    Channel, CstLexResult, CstSpan, CstToken, LexerError, LineIndex, lex, lex_with_trivia,
};
pub use nodes::{GmlSyntaxElement, GmlSyntaxNode, GmlSyntaxNodeChildren, GmlSyntaxToken};
pub use parser::{ParseError, ParsedSource, parse_gml, parse_tokens};
pub use printer::{PrintError, Printer, PrinterOptions};
pub use syntax_kind::GmlSyntaxKind;
