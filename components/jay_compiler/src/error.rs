//! Parse error types and helpers.

use crate::token::{Token, TokenKind};

/// A syntax error inside one grammar rule. The parse driver reports it
/// through the shared reporter and resynchronizes; it never unwinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub line: u32,
    pub location: String,
    pub message: String,
}

/// Result type returned by every grammar-rule method.
pub(crate) type ParseResult<T> = Result<T, SyntaxError>;

/// Create a syntax error pointing at `token`.
pub(crate) fn error_at(token: &Token, message: &str) -> SyntaxError {
    let location = if token.kind == TokenKind::Eof {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    };
    SyntaxError {
        line: token.line,
        location,
        message: message.to_string(),
    }
}
