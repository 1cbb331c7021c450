//! Literal-form errors shared by the loader and the execution engine.

use thiserror::Error;

/// A literal's text does not match its declared type.
///
/// Literals are validated lazily, at resolution time, so these surface
/// during execution rather than during document loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    /// Not a decimal, `0x…` hex, or `0o…` octal integer.
    #[error("invalid int literal '{text}'")]
    InvalidInt { text: String },

    /// Not exactly `true` or `false`.
    #[error("invalid bool literal '{text}'")]
    InvalidBool { text: String },

    /// Contains whitespace, `#`, or a backslash not starting a `\DDD` escape.
    #[error("invalid string literal '{text}'")]
    InvalidString { text: String },

    /// Not exactly the literal `nil`.
    #[error("invalid nil literal '{text}'")]
    InvalidNil { text: String },

    /// The declared argument type does not denote a value at all.
    #[error("'{text}' is not a value literal")]
    NotAValue { text: String },
}
