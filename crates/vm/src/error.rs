//! Runtime errors for the Slate execution engine.
//!
//! Every variant belongs to one of the language's error classes; the class
//! determines the process exit code. Execution aborts on the first error —
//! there is no recovery path, and output already written stays written.

use crate::env::FrameKind;
use slate_common::LiteralError;
use thiserror::Error;

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Two LABEL instructions define the same name.
    #[error("duplicate label '{name}'")]
    DuplicateLabel { name: String },

    /// A jump or call targets a label no LABEL instruction defines.
    #[error("undefined label '{name}'")]
    UndefinedLabel { name: String },

    /// DEFVAR for a name already declared in that exact frame.
    #[error("variable '{name}' is already defined in {frame}")]
    VariableRedefined { frame: FrameKind, name: String },

    /// A literal's text does not match its declared type.
    #[error(transparent)]
    BadLiteral(#[from] LiteralError),

    /// An operand resolved to the wrong type for its opcode.
    #[error("expected {expected} operand, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Two non-nil operands of different types were compared.
    #[error("cannot compare {left} with {right}")]
    Incomparable {
        left: &'static str,
        right: &'static str,
    },

    /// A `var` operand without the `FRAME@name` shape.
    #[error("'{text}' is not a variable reference")]
    MalformedVariable { text: String },

    /// READ with a type operand other than int, bool or string.
    #[error("cannot read values of type '{text}'")]
    BadReadType { text: String },

    /// A variable reference with an unknown frame prefix.
    #[error("unknown frame prefix in '{text}'")]
    UnknownFrame { text: String },

    /// Reference into a frame that does not currently exist.
    #[error("frame {frame} does not exist")]
    FrameAbsent { frame: FrameKind },

    /// Reference to a name never declared in its (existing) frame.
    #[error("variable '{name}' is not defined in {frame}")]
    UndefinedVariable { frame: FrameKind, name: String },

    /// Read of a declared variable that was never assigned.
    #[error("variable '{name}' is not initialized")]
    UninitializedVariable { name: String },

    /// RETURN or POPS with nothing to pop.
    #[error("access to empty stack")]
    EmptyStack,

    /// IDIV with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// EXIT with an integer outside [0, 9].
    #[error("exit code {value} out of range")]
    ExitCodeRange { value: i64 },

    /// String index outside the value's character range.
    #[error("index {index} out of range for string of length {length}")]
    IndexOutOfRange { index: i64, length: usize },

    /// SETCHAR with an empty replacement string.
    #[error("empty replacement string")]
    EmptyReplacement,

    /// INT2CHAR with an integer that is no Unicode scalar value.
    #[error("{value} is not a valid code point")]
    InvalidCodePoint { value: i64 },
}

impl RuntimeError {
    /// Process exit code for this error's class.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::DuplicateLabel { .. }
            | RuntimeError::UndefinedLabel { .. }
            | RuntimeError::VariableRedefined { .. } => 52,

            RuntimeError::BadLiteral(_)
            | RuntimeError::TypeMismatch { .. }
            | RuntimeError::Incomparable { .. }
            | RuntimeError::MalformedVariable { .. }
            | RuntimeError::BadReadType { .. } => 53,

            RuntimeError::UndefinedVariable { .. } => 54,

            RuntimeError::UnknownFrame { .. } | RuntimeError::FrameAbsent { .. } => 55,

            RuntimeError::UninitializedVariable { .. } | RuntimeError::EmptyStack => 56,

            RuntimeError::DivisionByZero | RuntimeError::ExitCodeRange { .. } => 57,

            RuntimeError::IndexOutOfRange { .. }
            | RuntimeError::EmptyReplacement
            | RuntimeError::InvalidCodePoint { .. } => 58,
        }
    }
}
