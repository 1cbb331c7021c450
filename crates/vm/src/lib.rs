//! Slate execution engine — runs validated programs against the frame
//! environment.
//!
//! The engine is a single-threaded fetch–decode–execute loop with:
//! - three variable frame roles (global, local stack, optional temporary)
//! - a value stack (PUSHS/POPS) and a call stack (CALL/RETURN)
//! - a label table built by a pre-scan before anything executes
//!
//! # Usage
//!
//! ```
//! use slate_common::{Arg, ArgType, Instruction, Opcode, Program};
//! use slate_vm::io::NoInput;
//!
//! let program = Program::new(vec![
//!     Instruction::new(Opcode::DefVar, 1, vec![Arg::new(ArgType::Var, "GF@x")]),
//!     Instruction::new(
//!         Opcode::Move,
//!         2,
//!         vec![Arg::new(ArgType::Var, "GF@x"), Arg::new(ArgType::Int, "7")],
//!     ),
//!     Instruction::new(Opcode::Write, 3, vec![Arg::new(ArgType::Var, "GF@x")]),
//! ]);
//!
//! let mut input = NoInput;
//! let mut output = String::new();
//! let mut diag = String::new();
//! let code = slate_vm::run(&program, &mut input, &mut output, &mut diag).unwrap();
//! assert_eq!(code, 0);
//! assert_eq!(output, "7");
//! ```

pub mod env;
pub mod error;
pub mod execute;
pub mod io;
pub mod machine;

pub use env::{Environment, Frame, FrameKind, VarRef};
pub use error::RuntimeError;
pub use io::{Input, NoInput, Output};
pub use machine::Interpreter;

use slate_common::Program;

/// Execute a program and return the process exit code it produced.
///
/// Returns 0 when execution falls off the end of the program, the EXIT
/// code otherwise.
///
/// # Errors
///
/// Returns [`RuntimeError`] when execution aborts; the error's
/// [`exit_code`](RuntimeError::exit_code) gives the process exit code for
/// its class.
pub fn run(
    program: &Program,
    input: &mut dyn Input,
    output: &mut dyn Output,
    diag: &mut dyn Output,
) -> Result<i32, RuntimeError> {
    let mut interpreter = Interpreter::new(program, input, output, diag);
    interpreter.execute()
}
