//! Error types for the GML formatting pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for formatting operations
#[derive(Debug, Error)]
pub enum GmlError {
    /// Invalid character or unterminated literal
    #[error("Lex error: {message} at line {line}, column {column}")]
    Lex {
        message: String,
        /// Byte offset where the offending token starts
        offset: usize,
        line: usize,
        column: usize,
    },

    /// Unexpected token for the active grammar rule
    #[error("Parse error: {message} at line {line}, column {column}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
        expected: Vec<String>,
        found: String,
        context: String,
    },

    /// The printer met a node it has no rule for in this position
    #[error("Internal error: no printing rule for {kind} in {context}")]
    UnknownNode { kind: String, context: String },

    /// A comment could not be placed on, or printed from, any node
    #[error("Internal error: comment at token {token_index} could not be attached: {message}")]
    CommentAttachment { token_index: usize, message: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    UnknownNode,
    CommentAttachment,
    Config,
    Io,
}

impl GmlError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GmlError::Lex { .. } => ErrorKind::Lex,
            GmlError::Parse { .. } => ErrorKind::Parse,
            GmlError::UnknownNode { .. } => ErrorKind::UnknownNode,
            GmlError::CommentAttachment { .. } => ErrorKind::CommentAttachment,
            GmlError::Config { .. } => ErrorKind::Config,
            GmlError::Io { .. } => ErrorKind::Io,
        }
    }

    /// True for problems in the input; false for internal defects
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::UnknownNode | ErrorKind::CommentAttachment
        )
    }

    /// 1-based line and column for lex and parse errors
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            GmlError::Lex { line, column, .. } | GmlError::Parse { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }

    /// Create a lex error
    pub fn lex(message: impl Into<String>, offset: usize, line: usize, column: usize) -> Self {
        Self::Lex {
            message: message.into(),
            offset,
            line,
            column,
        }
    }

    /// Create an unknown-node error
    pub fn unknown_node(kind: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownNode {
            kind: kind.into(),
            context: context.into(),
        }
    }

    /// Create a comment attachment error
    pub fn comment_attachment(token_index: usize, message: impl Into<String>) -> Self {
        Self::CommentAttachment {
            token_index,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for GmlError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}
