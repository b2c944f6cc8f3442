//! Result type alias for formatting operations

use crate::error::GmlError;

/// Standard Result type for formatting operations
pub type Result<T> = std::result::Result<T, GmlError>;
