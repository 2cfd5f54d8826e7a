//! jay compiler front end.
//!
//! Provides scanning, recursive-descent parsing, lexically-scoped symbol
//! resolution, and tree-walking assembly generation for the jay language.
//! The output is textual stack-machine assembly plus the operand-stack
//! high-water mark and a local-variable debug table, ready for an external
//! writer to wrap in a method envelope and hand to the assembler.
//!
//! # Overview
//!
//! - [`Scanner`] - Tokenizes jay source code
//! - [`Token`] - Lexical unit: kind, lexeme, literal, line
//! - [`Parser`] - Recursive descent parser producing an arena AST
//! - [`Ast`] / [`Program`] - Node arena and parse result
//! - [`Environment`] - Scope chain with slot allocation
//! - [`CodeGenerator`] - Walks the AST and emits assembly
//!
//! # Example
//!
//! ```
//! use jay_compiler::{CodeGenerator, Parser, Scanner};
//! use jay_core::ErrorReporter;
//!
//! let mut reporter = ErrorReporter::new();
//! let tokens = Scanner::new("jj x = 1; lg x;").scan_tokens(&mut reporter);
//! let program = Parser::new(tokens, &mut reporter).parse();
//! assert!(!reporter.had_error());
//!
//! let mut generator = CodeGenerator::new(&program.ast);
//! let assembly = generator.generate(&program.statements).unwrap();
//! assert!(assembly.code.contains("dstore 0"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ast;
pub mod codegen;
mod error;
pub mod parser;
pub mod scanner;
pub mod scope;
pub mod token;

pub use ast::{Ast, Expr, ExprId, Program, Stmt, StmtId};
pub use codegen::CodeGenerator;
pub use parser::Parser;
pub use scanner::Scanner;
pub use scope::{Environment, Symbol};
pub use token::{Token, TokenKind};
