//! Structural validation: attributed element tree → order-sorted [`Program`].
//!
//! Everything here is grammar checking; operand *text* (integer spellings,
//! string escapes, variable references) is validated later, at resolution
//! time.

use crate::error::LoadError;
use crate::xml::Element;
use slate_common::{Arg, ArgType, Instruction, Opcode, Program};
use std::collections::HashSet;
use tracing::debug;

/// The language tag the root element must carry.
pub const LANGUAGE: &str = "Slatecode";

const ARG_NAMES: [&str; 3] = ["arg1", "arg2", "arg3"];

/// Validate a document tree and produce the order-sorted program.
pub fn validate(root: &Element) -> Result<Program, LoadError> {
    if root.name != "program" {
        return Err(LoadError::BadRoot {
            found: root.name.clone(),
        });
    }
    check_program_attrs(root)?;
    if !root.text.trim().is_empty() {
        return Err(LoadError::StrayText {
            element: root.name.clone(),
        });
    }

    let mut seen_orders = HashSet::new();
    let mut instructions = Vec::with_capacity(root.children.len());
    for child in &root.children {
        instructions.push(validate_instruction(child, &mut seen_orders)?);
    }

    debug!(count = instructions.len(), "program validated");
    Ok(Program::new(instructions))
}

fn check_program_attrs(root: &Element) -> Result<(), LoadError> {
    for (name, _) in &root.attrs {
        if !matches!(name.as_str(), "language" | "name" | "description") {
            return Err(LoadError::UnexpectedAttribute {
                element: root.name.clone(),
                name: name.clone(),
            });
        }
    }

    let mut languages = root.attr_values("language");
    match languages.next() {
        None => Err(LoadError::MissingLanguage),
        Some(tag) if tag != LANGUAGE => Err(LoadError::LanguageMismatch {
            found: tag.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

fn validate_instruction(
    element: &Element,
    seen_orders: &mut HashSet<u32>,
) -> Result<Instruction, LoadError> {
    if element.name != "instruction" {
        return Err(LoadError::UnexpectedElement {
            found: element.name.clone(),
        });
    }
    if !element.text.trim().is_empty() {
        return Err(LoadError::StrayText {
            element: element.name.clone(),
        });
    }

    let mut opcode = None;
    let mut order = None;
    for (name, value) in &element.attrs {
        match name.as_str() {
            "opcode" => {
                opcode = Some(Opcode::from_mnemonic(value.trim()).ok_or_else(|| {
                    LoadError::UnknownOpcode {
                        text: value.clone(),
                    }
                })?);
            }
            "order" => {
                let parsed: u32 = value.trim().parse().map_err(|_| LoadError::InvalidOrder {
                    text: value.clone(),
                })?;
                if parsed < 1 {
                    return Err(LoadError::InvalidOrder {
                        text: value.clone(),
                    });
                }
                if !seen_orders.insert(parsed) {
                    return Err(LoadError::DuplicateOrder { order: parsed });
                }
                order = Some(parsed);
            }
            other => {
                return Err(LoadError::UnexpectedAttribute {
                    element: element.name.clone(),
                    name: other.to_string(),
                });
            }
        }
    }
    let opcode = opcode.ok_or(LoadError::MissingAttribute { name: "opcode" })?;
    let order = order.ok_or(LoadError::MissingAttribute { name: "order" })?;

    let args = collect_args(element)?;
    check_signature(opcode, &args)?;

    Ok(Instruction::new(opcode, order, args))
}

/// Collect arg1..arg3 children, enforcing uniqueness and position
/// completeness, and return them ordered by position.
fn collect_args(element: &Element) -> Result<Vec<Arg>, LoadError> {
    let mut slots: [Option<Arg>; 3] = [None, None, None];

    for child in &element.children {
        let position = ARG_NAMES
            .iter()
            .position(|&n| n == child.name)
            .ok_or_else(|| LoadError::UnexpectedElement {
                found: child.name.clone(),
            })?;
        if let Some(nested) = child.children.first() {
            return Err(LoadError::UnexpectedElement {
                found: nested.name.clone(),
            });
        }

        let kind = arg_kind(child)?;
        if slots[position].is_some() {
            return Err(LoadError::DuplicateArgument {
                position: position + 1,
            });
        }
        slots[position] = Some(Arg::new(kind, child.text.trim()));
    }

    // N arguments present must occupy exactly positions 1..=N.
    let count = slots.iter().filter(|s| s.is_some()).count();
    let mut args = Vec::with_capacity(count);
    for slot in slots.into_iter().take(count) {
        args.push(slot.ok_or(LoadError::ArgumentGap)?);
    }
    Ok(args)
}

fn arg_kind(child: &Element) -> Result<ArgType, LoadError> {
    let mut kind = None;
    for (name, value) in &child.attrs {
        if name != "type" {
            return Err(LoadError::UnexpectedAttribute {
                element: child.name.clone(),
                name: name.clone(),
            });
        }
        kind = Some(
            ArgType::from_name(value.trim()).ok_or_else(|| LoadError::UnknownArgType {
                text: value.clone(),
            })?,
        );
    }
    kind.ok_or(LoadError::MissingType)
}

fn check_signature(opcode: Opcode, args: &[Arg]) -> Result<(), LoadError> {
    let signature = opcode.signature();
    if args.len() != signature.len() {
        return Err(LoadError::WrongArity {
            opcode: opcode.mnemonic(),
            expected: signature.len(),
            found: args.len(),
        });
    }
    for (position, (slot, arg)) in signature.iter().zip(args).enumerate() {
        if !slot.admits(arg.kind) {
            return Err(LoadError::WrongOperandKind {
                opcode: opcode.mnemonic(),
                position: position + 1,
                found: arg.kind.name(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn load(source: &str) -> Result<Program, LoadError> {
        validate(&parse_document(source)?)
    }

    fn program(body: &str) -> String {
        format!(r#"<program language="Slatecode">{body}</program>"#)
    }

    #[test]
    fn empty_program_is_valid() {
        let p = load(&program("")).unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn name_and_description_allowed() {
        let source = r#"<program language="Slatecode" name="demo" description="d"/>"#;
        assert!(load(source).is_ok());
    }

    #[test]
    fn missing_language_rejected() {
        assert_eq!(load("<program/>"), Err(LoadError::MissingLanguage));
    }

    #[test]
    fn wrong_language_rejected() {
        assert_eq!(
            load(r#"<program language="Other"/>"#),
            Err(LoadError::LanguageMismatch {
                found: "Other".to_string()
            })
        );
    }

    #[test]
    fn stray_root_attribute_rejected() {
        let source = r#"<program language="Slatecode" version="2"/>"#;
        assert!(matches!(
            load(source),
            Err(LoadError::UnexpectedAttribute { .. })
        ));
    }

    #[test]
    fn wrong_root_rejected() {
        assert!(matches!(
            load(r#"<prog language="Slatecode"/>"#),
            Err(LoadError::BadRoot { .. })
        ));
    }

    #[test]
    fn opcode_is_case_insensitive() {
        let p = load(&program(r#"<instruction opcode="createFrame" order="1"/>"#)).unwrap();
        assert_eq!(p.instructions[0].opcode, Opcode::CreateFrame);
    }

    #[test]
    fn unknown_opcode_rejected() {
        let source = program(r#"<instruction opcode="NOPE" order="1"/>"#);
        assert!(matches!(load(&source), Err(LoadError::UnknownOpcode { .. })));
    }

    #[test]
    fn order_must_be_positive() {
        for bad in ["0", "-1", "abc", ""] {
            let source = program(&format!(r#"<instruction opcode="BREAK" order="{bad}"/>"#));
            assert!(
                matches!(load(&source), Err(LoadError::InvalidOrder { .. })),
                "accepted order '{bad}'"
            );
        }
    }

    #[test]
    fn duplicate_order_rejected() {
        let source = program(
            r#"<instruction opcode="BREAK" order="2"/>
               <instruction opcode="RETURN" order="2"/>"#,
        );
        assert_eq!(load(&source), Err(LoadError::DuplicateOrder { order: 2 }));
    }

    #[test]
    fn duplicate_order_across_spellings_rejected() {
        let source = program(
            r#"<instruction opcode="BREAK" order="01"/>
               <instruction opcode="RETURN" order="1"/>"#,
        );
        assert_eq!(load(&source), Err(LoadError::DuplicateOrder { order: 1 }));
    }

    #[test]
    fn instructions_sorted_by_order() {
        let source = program(
            r#"<instruction opcode="POPFRAME" order="3"/>
               <instruction opcode="CREATEFRAME" order="1"/>
               <instruction opcode="PUSHFRAME" order="2"/>"#,
        );
        let p = load(&source).unwrap();
        let opcodes: Vec<_> = p.instructions.iter().map(|i| i.opcode).collect();
        assert_eq!(
            opcodes,
            vec![Opcode::CreateFrame, Opcode::PushFrame, Opcode::PopFrame]
        );
    }

    #[test]
    fn missing_opcode_attr_rejected() {
        let source = program(r#"<instruction order="1"/>"#);
        assert_eq!(
            load(&source),
            Err(LoadError::MissingAttribute { name: "opcode" })
        );
    }

    #[test]
    fn foreign_instruction_attr_rejected() {
        let source = program(r#"<instruction opcode="BREAK" order="1" note="x"/>"#);
        assert!(matches!(
            load(&source),
            Err(LoadError::UnexpectedAttribute { .. })
        ));
    }

    #[test]
    fn args_reordered_by_position() {
        let source = program(
            r#"<instruction opcode="MOVE" order="1">
                 <arg2 type="int">5</arg2>
                 <arg1 type="var">GF@x</arg1>
               </instruction>"#,
        );
        let p = load(&source).unwrap();
        let args = &p.instructions[0].args;
        assert_eq!(args[0].text, "GF@x");
        assert_eq!(args[1].text, "5");
    }

    #[test]
    fn argument_gap_rejected() {
        let source = program(
            r#"<instruction opcode="MOVE" order="1">
                 <arg1 type="var">GF@x</arg1>
                 <arg3 type="int">5</arg3>
               </instruction>"#,
        );
        assert_eq!(load(&source), Err(LoadError::ArgumentGap));
    }

    #[test]
    fn duplicate_argument_rejected() {
        let source = program(
            r#"<instruction opcode="WRITE" order="1">
                 <arg1 type="int">5</arg1>
                 <arg1 type="int">6</arg1>
               </instruction>"#,
        );
        assert_eq!(
            load(&source),
            Err(LoadError::DuplicateArgument { position: 1 })
        );
    }

    #[test]
    fn unknown_arg_element_rejected() {
        let source = program(
            r#"<instruction opcode="WRITE" order="1">
                 <operand type="int">5</operand>
               </instruction>"#,
        );
        assert!(matches!(
            load(&source),
            Err(LoadError::UnexpectedElement { .. })
        ));
    }

    #[test]
    fn unknown_arg_type_rejected() {
        let source = program(
            r#"<instruction opcode="WRITE" order="1">
                 <arg1 type="integer">5</arg1>
               </instruction>"#,
        );
        assert!(matches!(load(&source), Err(LoadError::UnknownArgType { .. })));
    }

    #[test]
    fn wrong_arity_rejected() {
        let source = program(r#"<instruction opcode="WRITE" order="1"/>"#);
        assert_eq!(
            load(&source),
            Err(LoadError::WrongArity {
                opcode: "WRITE",
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn wrong_operand_kind_rejected() {
        // DEFVAR takes a variable, not an int literal.
        let source = program(
            r#"<instruction opcode="DEFVAR" order="1">
                 <arg1 type="int">5</arg1>
               </instruction>"#,
        );
        assert_eq!(
            load(&source),
            Err(LoadError::WrongOperandKind {
                opcode: "DEFVAR",
                position: 1,
                found: "int"
            })
        );
    }

    #[test]
    fn label_slot_requires_label_type() {
        let source = program(
            r#"<instruction opcode="JUMP" order="1">
                 <arg1 type="string">target</arg1>
               </instruction>"#,
        );
        assert!(matches!(
            load(&source),
            Err(LoadError::WrongOperandKind { .. })
        ));
    }

    #[test]
    fn empty_string_literal_allowed() {
        let source = program(
            r#"<instruction opcode="WRITE" order="1">
                 <arg1 type="string"></arg1>
               </instruction>"#,
        );
        let p = load(&source).unwrap();
        assert_eq!(p.instructions[0].args[0].text, "");
    }

    #[test]
    fn operand_text_is_trimmed() {
        let source = program(
            r#"<instruction opcode="WRITE" order="1">
                 <arg1 type="int">
                   42
                 </arg1>
               </instruction>"#,
        );
        let p = load(&source).unwrap();
        assert_eq!(p.instructions[0].args[0].text, "42");
    }

    #[test]
    fn stray_text_in_program_rejected() {
        let source = r#"<program language="Slatecode">junk</program>"#;
        assert!(matches!(load(source), Err(LoadError::StrayText { .. })));
    }

    #[test]
    fn stray_text_in_instruction_rejected() {
        let source = program(r#"<instruction opcode="BREAK" order="1">junk</instruction>"#);
        assert!(matches!(load(&source), Err(LoadError::StrayText { .. })));
    }

    #[test]
    fn comments_between_instructions_allowed() {
        let source = program(
            r#"<!-- setup --><instruction opcode="CREATEFRAME" order="1"/><!-- done -->"#,
        );
        assert!(load(&source).is_ok());
    }
}
