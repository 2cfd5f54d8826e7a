//! Core jay compiler types: literal values, errors, and diagnostics.
//!
//! This crate provides the foundational types shared by every stage of the
//! jay front end: the literal value representation carried by tokens and
//! AST nodes, the hard compile-error type, and the diagnostics reporter the
//! scanner and parser funnel soft errors through.
//!
//! # Overview
//!
//! - [`LiteralValue`] - Tagged representation of jay literal values
//! - [`CompileError`] - Fatal compile failures (scope and type violations)
//! - [`Diagnostic`] - A single recorded soft diagnostic
//! - [`ErrorReporter`] - Collects diagnostics and tracks the error flag
//!
//! # Examples
//!
//! ```
//! use jay_core::{ErrorReporter, LiteralValue};
//!
//! let value = LiteralValue::Number(42.0);
//! assert!(value.is_truthy());
//!
//! let mut reporter = ErrorReporter::new();
//! assert!(!reporter.had_error());
//! reporter.error(3, "Unexpected character.");
//! assert!(reporter.had_error());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod value;

pub use error::{CompileError, Diagnostic, ErrorReporter};
pub use value::LiteralValue;
