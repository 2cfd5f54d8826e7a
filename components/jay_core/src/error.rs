//! Compile errors and the diagnostics reporter.
//!
//! Two failure channels exist. Soft errors (lexical and syntactic) are
//! recorded as [`Diagnostic`]s on the shared [`ErrorReporter`] so one pass
//! can surface many of them; a unit that accumulated any is never handed to
//! code generation. Hard errors (scope and static type violations) are
//! [`CompileError`] values that abort generation of the unit immediately.

use std::fmt;
use thiserror::Error;

/// A fatal compile failure. Generation of the current unit stops at the
/// first one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A name was declared twice in the same scope
    #[error("line {line}: cannot redefine '{name}' in the same scope")]
    Redefinition {
        /// The redeclared name
        name: String,
        /// Source line of the second declaration
        line: u32,
    },

    /// A referenced or assigned name is not declared in any enclosing scope
    #[error("line {line}: undefined variable '{name}'")]
    UndefinedVariable {
        /// The unresolved name
        name: String,
        /// Source line of the reference
        line: u32,
    },

    /// A unary operator was applied to an operand of the wrong static type
    #[error("line {line}: operand of '{operator}' must be a {expected}, got {found}")]
    OperandType {
        /// The operator lexeme
        operator: String,
        /// The operand type the operator requires
        expected: String,
        /// The operand type that was found
        found: String,
        /// Source line of the operator
        line: u32,
    },

    /// A binary operator was applied to operands of unsupported static types
    #[error("line {line}: unsupported operand types for '{operator}': {left} and {right}")]
    OperandTypes {
        /// The operator lexeme
        operator: String,
        /// Static type of the left operand
        left: String,
        /// Static type of the right operand
        right: String,
        /// Source line of the operator
        line: u32,
    },

    /// A call targeted anything other than the known builtin
    #[error("line {line}: cannot call '{callee}': only built-in functions are callable")]
    UnknownCallable {
        /// The callee name
        callee: String,
        /// Source line of the call
        line: u32,
    },

    /// A builtin call was malformed (wrong shape or argument kinds)
    #[error("line {line}: {message}")]
    InvalidCall {
        /// What was wrong with the call
        message: String,
        /// Source line of the call
        line: u32,
    },

    /// A generator-internal invariant was violated
    #[error("internal compiler error: {message}")]
    Internal {
        /// Description of the violated invariant
        message: String,
    },
}

/// A single recorded soft diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source line the diagnostic points at
    pub line: u32,
    /// Location context, e.g. ` at 'foo'` or ` at end` (may be empty)
    pub location: String,
    /// Human-readable message
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[line {}] Error{}: {}",
            self.line, self.location, self.message
        )
    }
}

/// Collects soft diagnostics from the scanner and parser.
///
/// Every stage that can continue past an error reports through one of these
/// instead of aborting, so a single pass surfaces as many problems as
/// possible. The aggregate flag gates code generation.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorReporter {
    /// Create a reporter with no recorded diagnostics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic with location context and echo it to stderr.
    pub fn report(&mut self, line: u32, location: &str, message: &str) {
        let diagnostic = Diagnostic {
            line,
            location: location.to_string(),
            message: message.to_string(),
        };
        eprintln!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Record a diagnostic with no location context.
    pub fn error(&mut self, line: u32, message: &str) {
        self.report(line, "", message);
    }

    /// Whether any diagnostic has been recorded.
    pub fn had_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// All diagnostics recorded so far, in report order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Forget all recorded diagnostics.
    pub fn reset(&mut self) {
        self.diagnostics.clear();
    }
}
