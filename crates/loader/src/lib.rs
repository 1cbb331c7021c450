//! Slate program loader — XML front end plus structural validation.
//!
//! The loader turns a source document into an order-sorted
//! [`Program`](slate_common::Program) or fails with a [`LoadError`]:
//!
//! 1. [`xml`] reduces the document to an attributed element tree,
//!    rejecting anything that is not well-formed XML.
//! 2. [`validate`](validate::validate) walks that tree and enforces the
//!    document grammar: the `program` root and its `language` tag,
//!    `instruction` elements with unique positive `order` values and known
//!    opcodes, `arg1..arg3` position completeness, and each opcode's
//!    operand-kind signature.
//!
//! Operand text stays raw; literal validation happens at resolution time
//! in the execution engine.

pub mod error;
pub mod validate;
pub mod xml;

pub use error::LoadError;
pub use validate::LANGUAGE;

use slate_common::Program;

/// Parse and validate a source document into a program.
pub fn parse_program(source: &str) -> Result<Program, LoadError> {
    let root = xml::parse_document(source)?;
    validate::validate(&root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_load() {
        let source = r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <program language="Slatecode">
              <instruction opcode="DEFVAR" order="1">
                <arg1 type="var">GF@x</arg1>
              </instruction>
              <instruction opcode="MOVE" order="2">
                <arg1 type="var">GF@x</arg1>
                <arg2 type="int">7</arg2>
              </instruction>
            </program>
        "#;
        let program = parse_program(source.trim()).unwrap();
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn malformed_xml_is_its_own_class() {
        let err = parse_program("<program language=").unwrap_err();
        assert_eq!(err.exit_code(), 31);
    }
}
