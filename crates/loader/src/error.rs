//! Errors produced while loading a program document.

use thiserror::Error;

/// Errors from the XML front end and the structural validator.
///
/// [`LoadError::Xml`] means the document is not well-formed XML; every
/// other variant means well-formed XML that violates the document grammar.
/// The two classes map to distinct process exit codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The document is not well-formed XML.
    #[error("malformed XML: {message}")]
    Xml { message: String },

    /// The root element is missing or not named `program`.
    #[error("root element must be 'program', found '{found}'")]
    BadRoot { found: String },

    /// The `language` attribute is missing from the root element.
    #[error("missing 'language' attribute on the program element")]
    MissingLanguage,

    /// The `language` attribute carries the wrong language tag.
    #[error("unsupported language '{found}'")]
    LanguageMismatch { found: String },

    /// An attribute the grammar does not allow on this element.
    #[error("unexpected attribute '{name}' on element '{element}'")]
    UnexpectedAttribute { element: String, name: String },

    /// An element the grammar does not allow at this position.
    #[error("unexpected element '{found}'")]
    UnexpectedElement { found: String },

    /// Non-whitespace text outside an argument element.
    #[error("stray text in element '{element}'")]
    StrayText { element: String },

    /// A required attribute is absent.
    #[error("instruction is missing the '{name}' attribute")]
    MissingAttribute { name: &'static str },

    /// The `opcode` attribute names no known operation.
    #[error("unknown opcode '{text}'")]
    UnknownOpcode { text: String },

    /// The `order` attribute is not a positive integer.
    #[error("invalid order '{text}'")]
    InvalidOrder { text: String },

    /// Two instructions share one `order` value.
    #[error("duplicate order {order}")]
    DuplicateOrder { order: u32 },

    /// An argument element is missing its `type` attribute.
    #[error("argument is missing the 'type' attribute")]
    MissingType,

    /// The `type` attribute names no known argument type.
    #[error("unknown argument type '{text}'")]
    UnknownArgType { text: String },

    /// Two arguments occupy the same position.
    #[error("duplicate argument position arg{position}")]
    DuplicateArgument { position: usize },

    /// Argument positions are not contiguous from arg1.
    #[error("argument positions must be contiguous from arg1")]
    ArgumentGap,

    /// The argument count does not match the opcode's signature.
    #[error("{opcode} expects {expected} argument(s), found {found}")]
    WrongArity {
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// An argument's declared type is outside its slot's operand kind.
    #[error("{opcode} does not accept a '{found}' operand at position {position}")]
    WrongOperandKind {
        opcode: &'static str,
        position: usize,
        found: &'static str,
    },
}

impl LoadError {
    /// Process exit code for this error class.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::Xml { .. } => 31,
            _ => 32,
        }
    }
}
