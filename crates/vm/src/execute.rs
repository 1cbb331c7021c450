//! Main execution loop and per-opcode semantics.

use crate::env::Frame;
use crate::error::RuntimeError;
use crate::machine::Interpreter;
use slate_common::instruction::Instruction;
use slate_common::{literal, ArgType, Opcode, Value};
use std::cmp::Ordering;
use tracing::trace;

impl<'a> Interpreter<'a> {
    /// Execute the program until it falls off the end (exit code 0), EXIT
    /// runs (its code), or an error aborts the run.
    pub fn execute(&mut self) -> Result<i32, RuntimeError> {
        self.scan_labels()?;

        let program = self.program;
        let mut index = 0;
        while index < program.len() {
            let inst = &program.instructions[index];
            self.executed += 1;
            trace!(index, opcode = inst.opcode.mnemonic(), "dispatch");

            // Jump-family handlers yield the base index for the uniform
            // increment below; everything else leaves it unchanged.
            let next = match inst.opcode {
                Opcode::Move => {
                    let dest = self.dest(inst)?;
                    let value = self.resolve(&inst.args[1])?;
                    self.env.set(&dest, value)?;
                    index
                }
                Opcode::CreateFrame => {
                    self.env.create_frame();
                    index
                }
                Opcode::PushFrame => {
                    self.env.push_frame()?;
                    index
                }
                Opcode::PopFrame => {
                    self.env.pop_frame()?;
                    index
                }
                Opcode::DefVar => {
                    self.exec_defvar(inst)?;
                    index
                }

                Opcode::Call => {
                    let target = self.label_target(&inst.args[0].text)?;
                    self.env.call_stack.push(index);
                    target
                }
                Opcode::Return => self
                    .env
                    .call_stack
                    .pop()
                    .ok_or(RuntimeError::EmptyStack)?,
                Opcode::Pushs => {
                    let value = self.resolve(&inst.args[0])?;
                    self.env.data_stack.push(value);
                    index
                }
                Opcode::Pops => {
                    self.exec_pops(inst)?;
                    index
                }

                Opcode::Add => {
                    self.exec_arith(inst, i64::wrapping_add)?;
                    index
                }
                Opcode::Sub => {
                    self.exec_arith(inst, i64::wrapping_sub)?;
                    index
                }
                Opcode::Mul => {
                    self.exec_arith(inst, i64::wrapping_mul)?;
                    index
                }
                Opcode::Idiv => {
                    self.exec_idiv(inst)?;
                    index
                }
                Opcode::Lt => {
                    self.exec_relational(inst, Ordering::Less)?;
                    index
                }
                Opcode::Gt => {
                    self.exec_relational(inst, Ordering::Greater)?;
                    index
                }
                Opcode::Eq => {
                    self.exec_eq(inst)?;
                    index
                }
                Opcode::And => {
                    self.exec_bool_binop(inst, |a, b| a && b)?;
                    index
                }
                Opcode::Or => {
                    self.exec_bool_binop(inst, |a, b| a || b)?;
                    index
                }
                Opcode::Not => {
                    let dest = self.dest(inst)?;
                    let value = expect_bool(self.resolve(&inst.args[1])?)?;
                    self.env.set(&dest, Value::Bool(!value))?;
                    index
                }

                Opcode::Int2Char => {
                    self.exec_int2char(inst)?;
                    index
                }
                Opcode::Stri2Int => {
                    self.exec_stri2int(inst)?;
                    index
                }
                Opcode::Concat => {
                    self.exec_concat(inst)?;
                    index
                }
                Opcode::Strlen => {
                    let dest = self.dest(inst)?;
                    let text = expect_str(self.resolve(&inst.args[1])?)?;
                    let length = text.chars().count() as i64;
                    self.env.set(&dest, Value::Int(length))?;
                    index
                }
                Opcode::GetChar => {
                    self.exec_getchar(inst)?;
                    index
                }
                Opcode::SetChar => {
                    self.exec_setchar(inst)?;
                    index
                }
                Opcode::Type => {
                    self.exec_type(inst)?;
                    index
                }

                Opcode::Read => {
                    self.exec_read(inst)?;
                    index
                }
                Opcode::Write => {
                    let value = self.resolve(&inst.args[0])?;
                    self.output.write_str(&write_form(&value));
                    index
                }
                Opcode::Dprint => {
                    let value = self.resolve(&inst.args[0])?;
                    self.diag.write_str(&value.raw_text());
                    index
                }
                Opcode::Break => {
                    self.exec_break(inst);
                    index
                }

                Opcode::Label => index,
                Opcode::Jump => {
                    let target = self.label_target(&inst.args[0].text)?;
                    trace!(target, "jump");
                    target
                }
                Opcode::JumpIfEq => self.exec_jump_cond(inst, index, true)?,
                Opcode::JumpIfNeq => self.exec_jump_cond(inst, index, false)?,
                Opcode::Exit => return self.exec_exit(inst),
            };

            index = next + 1;
        }

        Ok(0)
    }

    fn exec_defvar(&mut self, inst: &Instruction) -> Result<(), RuntimeError> {
        let var = crate::env::VarRef::parse(&inst.args[0].text)?;
        self.env.define_var(&var)
    }

    fn exec_pops(&mut self, inst: &Instruction) -> Result<(), RuntimeError> {
        // Stack emptiness is checked before the destination.
        if self.env.data_stack.is_empty() {
            return Err(RuntimeError::EmptyStack);
        }
        let dest = self.dest(inst)?;
        let value = self.env.data_stack.pop().ok_or(RuntimeError::EmptyStack)?;
        self.env.set(&dest, value)
    }

    fn exec_arith(
        &mut self,
        inst: &Instruction,
        op: fn(i64, i64) -> i64,
    ) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let lhs = self.resolve(&inst.args[1])?;
        let rhs = self.resolve(&inst.args[2])?;
        let (a, b) = (expect_int(lhs)?, expect_int(rhs)?);
        self.env.set(&dest, Value::Int(op(a, b)))
    }

    fn exec_idiv(&mut self, inst: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let lhs = self.resolve(&inst.args[1])?;
        let rhs = self.resolve(&inst.args[2])?;
        let (a, b) = (expect_int(lhs)?, expect_int(rhs)?);
        if b == 0 {
            return Err(RuntimeError::DivisionByZero);
        }
        // Truncates toward zero; wrapping covers i64::MIN / -1.
        self.env.set(&dest, Value::Int(a.wrapping_div(b)))
    }

    fn exec_relational(
        &mut self,
        inst: &Instruction,
        wanted: Ordering,
    ) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let lhs = self.resolve(&inst.args[1])?;
        let rhs = self.resolve(&inst.args[2])?;
        let ordering = compare_values(&lhs, &rhs)?;
        self.env.set(&dest, Value::Bool(ordering == wanted))
    }

    fn exec_eq(&mut self, inst: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let lhs = self.resolve(&inst.args[1])?;
        let rhs = self.resolve(&inst.args[2])?;
        let equal = values_equal(&lhs, &rhs)?;
        self.env.set(&dest, Value::Bool(equal))
    }

    fn exec_bool_binop(
        &mut self,
        inst: &Instruction,
        op: fn(bool, bool) -> bool,
    ) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let lhs = self.resolve(&inst.args[1])?;
        let rhs = self.resolve(&inst.args[2])?;
        let (a, b) = (expect_bool(lhs)?, expect_bool(rhs)?);
        self.env.set(&dest, Value::Bool(op(a, b)))
    }

    fn exec_int2char(&mut self, inst: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let code = expect_int(self.resolve(&inst.args[1])?)?;
        let ch = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(RuntimeError::InvalidCodePoint { value: code })?;
        self.env.set(&dest, Value::Str(ch.to_string()))
    }

    fn exec_stri2int(&mut self, inst: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let text = expect_str(self.resolve(&inst.args[1])?)?;
        let position = expect_int(self.resolve(&inst.args[2])?)?;
        let ch = char_at(&text, position)?;
        self.env.set(&dest, Value::Int(i64::from(u32::from(ch))))
    }

    fn exec_concat(&mut self, inst: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let lhs = expect_str(self.resolve(&inst.args[1])?)?;
        let rhs = expect_str(self.resolve(&inst.args[2])?)?;
        self.env.set(&dest, Value::Str(lhs + &rhs))
    }

    fn exec_getchar(&mut self, inst: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let text = expect_str(self.resolve(&inst.args[1])?)?;
        let position = expect_int(self.resolve(&inst.args[2])?)?;
        let ch = char_at(&text, position)?;
        self.env.set(&dest, Value::Str(ch.to_string()))
    }

    /// SETCHAR dest i c — the destination supplies the base string.
    fn exec_setchar(&mut self, inst: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let position = expect_int(self.resolve(&inst.args[1])?)?;
        let replacement = expect_str(self.resolve(&inst.args[2])?)?;
        let base = expect_str(self.env.value(&dest)?)?;

        let mut chars: Vec<char> = base.chars().collect();
        let slot = usize::try_from(position)
            .ok()
            .filter(|&i| i < chars.len())
            .ok_or(RuntimeError::IndexOutOfRange {
                index: position,
                length: chars.len(),
            })?;
        let first = replacement
            .chars()
            .next()
            .ok_or(RuntimeError::EmptyReplacement)?;
        chars[slot] = first;
        self.env.set(&dest, Value::Str(chars.into_iter().collect()))
    }

    fn exec_type(&mut self, inst: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let arg = &inst.args[1];
        // The one read that tolerates an unset variable: it reports the
        // empty string instead of a value error.
        let name = match arg.kind {
            ArgType::Var => {
                let var = crate::env::VarRef::parse(&arg.text)?;
                self.env.type_name(&var)?
            }
            _ => literal::parse_value(arg.kind, &arg.text)?.type_name(),
        };
        self.env.set(&dest, Value::Str(name.to_string()))
    }

    fn exec_read(&mut self, inst: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.dest(inst)?;
        let requested = inst.args[1].text.as_str();
        let value = match requested {
            "int" => self.input.read_int().map(Value::Int),
            "bool" => self.input.read_bool().map(Value::Bool),
            "string" => self.input.read_string().map(Value::Str),
            other => {
                return Err(RuntimeError::BadReadType {
                    text: other.to_string(),
                })
            }
        };
        // A failed or absent read stores nil, never an error.
        self.env.set(&dest, value.unwrap_or(Value::Nil))
    }

    fn exec_jump_cond(
        &mut self,
        inst: &Instruction,
        index: usize,
        jump_when_equal: bool,
    ) -> Result<usize, RuntimeError> {
        // The label must exist even when the jump is not taken.
        let target = self.label_target(&inst.args[0].text)?;
        let lhs = self.resolve(&inst.args[1])?;
        let rhs = self.resolve(&inst.args[2])?;
        let equal = values_equal(&lhs, &rhs)?;
        Ok(if equal == jump_when_equal {
            trace!(target, "conditional jump taken");
            target
        } else {
            index
        })
    }

    fn exec_exit(&mut self, inst: &Instruction) -> Result<i32, RuntimeError> {
        let code = expect_int(self.resolve(&inst.args[0])?)?;
        if !(0..=9).contains(&code) {
            return Err(RuntimeError::ExitCodeRange { value: code });
        }
        Ok(code as i32)
    }

    fn exec_break(&mut self, inst: &Instruction) {
        let mut dump = String::from("\n___________\nBREAK\n");
        append_frame(&mut dump, "GLOBAL FRAME", Some(self.env.global()));
        append_frame(&mut dump, "LOCAL FRAME", self.env.local());
        append_frame(&mut dump, "TEMPORARY FRAME", self.env.temporary());
        dump.push_str(&format!("POSITION ORDER: {}\n", inst.order));
        dump.push_str(&format!("DONE INSTRUCTIONS: {}\n", self.executed));
        self.diag.write_str(&dump);
    }
}

fn append_frame(out: &mut String, title: &str, frame: Option<&Frame>) {
    let Some(frame) = frame else {
        out.push_str(&format!("{title}: UNSET\n"));
        return;
    };
    out.push_str(&format!("{title}:\n"));
    for (name, slot) in frame.entries_sorted() {
        match slot {
            Some(value) => out.push_str(&format!(
                "  {name} = {}@{}\n",
                value.type_name(),
                value.raw_text()
            )),
            None => out.push_str(&format!("  {name} = (uninitialized)\n")),
        }
    }
}

/// WRITE's textual form: escapes decoded, nil empty.
fn write_form(value: &Value) -> String {
    match value {
        Value::Str(text) => literal::decode_escapes(text),
        other => other.raw_text(),
    }
}

fn expect_int(value: Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(n) => Ok(n),
        other => Err(RuntimeError::TypeMismatch {
            expected: "int",
            found: other.type_name(),
        }),
    }
}

fn expect_bool(value: Value) -> Result<bool, RuntimeError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(RuntimeError::TypeMismatch {
            expected: "bool",
            found: other.type_name(),
        }),
    }
}

fn expect_str(value: Value) -> Result<String, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(RuntimeError::TypeMismatch {
            expected: "string",
            found: other.type_name(),
        }),
    }
}

/// The character at a zero-based index, counting Unicode scalar values.
fn char_at(text: &str, position: i64) -> Result<char, RuntimeError> {
    usize::try_from(position)
        .ok()
        .and_then(|i| text.chars().nth(i))
        .ok_or_else(|| RuntimeError::IndexOutOfRange {
            index: position,
            length: text.chars().count(),
        })
}

/// Shared equality for EQ, JUMPIFEQ and JUMPIFNEQ: nil equals only nil,
/// mixed non-nil types are an error, bools are equal iff both true or
/// both false.
fn values_equal(lhs: &Value, rhs: &Value) -> Result<bool, RuntimeError> {
    match (lhs, rhs) {
        (Value::Nil, Value::Nil) => Ok(true),
        (Value::Nil, _) | (_, Value::Nil) => Ok(false),
        (Value::Int(a), Value::Int(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        (l, r) => Err(RuntimeError::Incomparable {
            left: l.type_name(),
            right: r.type_name(),
        }),
    }
}

/// Ordering for LT/GT: both operands must share one non-nil type.
fn compare_values(lhs: &Value, rhs: &Value) -> Result<Ordering, RuntimeError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (l, r) => Err(RuntimeError::Incomparable {
            left: l.type_name(),
            right: r.type_name(),
        }),
    }
}
