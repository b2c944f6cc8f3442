//! Type aliases for GML CST nodes
//!
//! Thin names over Rowan's generic tree types, parameterized with
//! `GmlLanguage`.

use super::GmlLanguage;

/// A node in the GML concrete syntax tree
pub type GmlSyntaxNode = rowan::SyntaxNode<GmlLanguage>;

/// A token in the GML concrete syntax tree (trivia included)
pub type GmlSyntaxToken = rowan::SyntaxToken<GmlLanguage>;

/// Either a node or a token
pub type GmlSyntaxElement = rowan::SyntaxElement<GmlLanguage>;

/// Iterator over the child nodes of a node
pub type GmlSyntaxNodeChildren = rowan::SyntaxNodeChildren<GmlLanguage>;
