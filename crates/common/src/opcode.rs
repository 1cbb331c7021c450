//! Opcode definitions for the Slate instruction set.

use crate::arg_type::ArgType;

/// Identifies the operation an instruction performs.
///
/// The set is closed: the structural validator rejects any document whose
/// `opcode` attribute is not one of these mnemonics, so the execution engine
/// never sees an unknown opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames & variables
    /// Copy a symbol's value into a variable.
    Move,
    /// Discard any temporary frame and allocate a fresh empty one.
    CreateFrame,
    /// Push the temporary frame onto the local frame stack.
    PushFrame,
    /// Pop the top local frame back into the temporary frame slot.
    PopFrame,
    /// Declare a variable (unset) in its frame.
    DefVar,

    // Calls & value stack
    /// Save the current position and jump to a label.
    Call,
    /// Return to the position saved by the matching CALL.
    Return,
    /// Push a symbol's value onto the value stack.
    Pushs,
    /// Pop the value stack into a variable.
    Pops,

    // Arithmetic, relational, boolean
    /// Integer addition.
    Add,
    /// Integer subtraction.
    Sub,
    /// Integer multiplication.
    Mul,
    /// Integer division, truncating toward zero.
    Idiv,
    /// Less-than over a single shared operand type.
    Lt,
    /// Greater-than over a single shared operand type.
    Gt,
    /// Equality; nil compares equal only to nil.
    Eq,
    /// Boolean conjunction.
    And,
    /// Boolean disjunction.
    Or,
    /// Boolean negation.
    Not,

    // Conversions & strings
    /// Character for a Unicode code point.
    Int2Char,
    /// Code point of the character at an index.
    Stri2Int,
    /// String concatenation.
    Concat,
    /// String length.
    Strlen,
    /// Character at an index, as a one-character string.
    GetChar,
    /// Replace the character at an index in a variable's current value.
    SetChar,
    /// Type name of a symbol, as a string.
    Type,

    // I/O
    /// Read a value of the requested type from the input reader.
    Read,
    /// Write a symbol to the output stream.
    Write,
    /// Write a symbol's raw form to the diagnostic stream.
    Dprint,
    /// Dump interpreter state to the diagnostic stream.
    Break,

    // Control flow
    /// Jump target; no runtime effect.
    Label,
    /// Unconditional jump to a label.
    Jump,
    /// Jump to a label when two symbols compare equal.
    JumpIfEq,
    /// Jump to a label when two symbols compare unequal.
    JumpIfNeq,
    /// Terminate with an exit code in [0, 9].
    Exit,
}

/// Operand kind expected at one argument position.
///
/// `Symb` admits a variable reference or any value literal; the other kinds
/// each admit exactly one declared argument type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// A variable reference (`FRAME@name`).
    Var,
    /// A variable reference or a value literal.
    Symb,
    /// A label name.
    Label,
    /// A type name (consulted by READ).
    Type,
}

impl OperandKind {
    /// Whether a declared argument type is admissible for this operand kind.
    pub fn admits(&self, arg_type: ArgType) -> bool {
        match self {
            OperandKind::Var => arg_type == ArgType::Var,
            OperandKind::Label => arg_type == ArgType::Label,
            OperandKind::Type => arg_type == ArgType::Type,
            OperandKind::Symb => matches!(
                arg_type,
                ArgType::Var | ArgType::Int | ArgType::Bool | ArgType::String | ArgType::Nil
            ),
        }
    }
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 35] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::Pushs,
    Opcode::Pops,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Idiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Concat,
    Opcode::Strlen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Read,
    Opcode::Write,
    Opcode::Dprint,
    Opcode::Break,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
];

impl Opcode {
    /// Returns the document mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Pushs => "PUSHS",
            Opcode::Pops => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Idiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Concat => "CONCAT",
            Opcode::Strlen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Dprint => "DPRINT",
            Opcode::Break => "BREAK",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
        }
    }

    /// Case-insensitive mnemonic lookup, as the document grammar requires.
    pub fn from_mnemonic(text: &str) -> Option<Opcode> {
        let upper = text.to_ascii_uppercase();
        ALL_OPCODES.iter().find(|op| op.mnemonic() == upper).copied()
    }

    /// Operand-kind signature: one entry per argument position, in order.
    pub fn signature(&self) -> &'static [OperandKind] {
        use OperandKind::{Label, Symb, Type, Var};
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => &[],

            Opcode::DefVar | Opcode::Pops => &[Var],
            Opcode::Call | Opcode::Label | Opcode::Jump => &[Label],
            Opcode::Pushs | Opcode::Write | Opcode::Dprint | Opcode::Exit => &[Symb],

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::Strlen
            | Opcode::Type => &[Var, Symb],
            Opcode::Read => &[Var, Type],

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Idiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => &[Var, Symb, Symb],

            Opcode::JumpIfEq | Opcode::JumpIfNeq => &[Label, Symb, Symb],
        }
    }
}
