//! Instructions and their arguments.

use crate::arg_type::ArgType;
use crate::opcode::Opcode;

/// One validated instruction argument: its declared type and raw text.
///
/// The text is kept raw; value literals are validated and normalized at
/// resolution time, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Declared argument type from the `type` attribute.
    pub kind: ArgType,
    /// Raw operand text.
    pub text: String,
}

impl Arg {
    /// Create an argument.
    pub fn new(kind: ArgType, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// One validated instruction.
///
/// `args` is ordered by argument position (arg1 first); the structural
/// validator guarantees the count and operand kinds match the opcode's
/// signature. `order` is the globally unique execution-ordering key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Unique positive ordering key from the source document.
    pub order: u32,
    /// Arguments, ordered by position.
    pub args: Vec<Arg>,
}

impl Instruction {
    /// Create an instruction.
    pub fn new(opcode: Opcode, order: u32, args: Vec<Arg>) -> Self {
        Self {
            opcode,
            order,
            args,
        }
    }
}
