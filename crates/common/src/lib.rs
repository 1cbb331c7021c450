//! Slate common types and literal handling.
//!
//! This crate provides the foundational data structures for the Slate
//! instruction set:
//!
//! - [`Opcode`] — the closed set of 35 operations, with operand signatures
//! - [`ArgType`] — the seven declared argument types
//! - [`Value`] — runtime value representation
//! - [`Instruction`] / [`Program`] — the validated, order-sorted program
//! - [`literal`] — the shared integer conversion and `\DDD` escape scheme
//! - [`LiteralError`] — errors from literal resolution
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod arg_type;
pub mod error;
pub mod instruction;
pub mod literal;
pub mod opcode;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use arg_type::ArgType;
pub use error::LiteralError;
pub use instruction::{Arg, Instruction};
pub use opcode::{Opcode, OperandKind};
pub use program::Program;
pub use value::Value;
