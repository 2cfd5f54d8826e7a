//! Assembly model for the jay code generator.
//!
//! This crate defines the textual stack-machine assembly representation the
//! code generator produces: the fragment container with operand-stack depth
//! accounting, the static type tags driving instruction selection, branch
//! labels, and operand formatting helpers.
//!
//! # Overview
//!
//! - [`AssemblyFragment`] - Generated instruction text plus depth accounting
//! - [`StaticType`] - Static type tag of the value a fragment leaves behind
//! - [`Label`] - A named jump target (`L0`, `L1`, ...)
//! - [`format_number`] / [`quote_string`] - Instruction operand formatting
//!
//! # Example
//!
//! ```
//! use jay_asm::{AssemblyFragment, StaticType, format_number};
//!
//! let mut fragment = AssemblyFragment::new();
//! fragment.push_instruction(&format!("ldc2_w {}", format_number(42.0)));
//! fragment.update_depth(2);
//! fragment.ty = StaticType::Double;
//!
//! assert_eq!(fragment.code, "ldc2_w 42.0\n");
//! assert_eq!(fragment.max_stack_depth, 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod emit;
mod fragment;
mod ty;

pub use emit::{format_number, quote_string, Label};
pub use fragment::AssemblyFragment;
pub use ty::StaticType;
