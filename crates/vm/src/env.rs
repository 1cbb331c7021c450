//! The variable environment: frames, the frame stack, and both runtime
//! stacks.
//!
//! Three frame roles exist. The global frame lives for the whole run. Local
//! frames form a stack whose top is "the" local frame. The temporary frame
//! is a single optional slot, populated by CREATEFRAME, consumed by
//! PUSHFRAME and repopulated by POPFRAME. Absence of the local or temporary
//! frame is represented structurally (empty stack / `None`), never by a
//! sentinel frame.

use crate::error::RuntimeError;
use slate_common::Value;
use std::collections::HashMap;
use std::fmt;

/// Which of the three frame roles a variable reference names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `GF@` — the run-long global frame.
    Global,
    /// `LF@` — the top of the local frame stack.
    Local,
    /// `TF@` — the optional temporary frame.
    Temporary,
}

impl FrameKind {
    /// The reference prefix for this frame role.
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A parsed variable reference: frame role plus variable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarRef {
    pub frame: FrameKind,
    pub name: String,
}

impl VarRef {
    /// Parse `FRAME@name`.
    ///
    /// Text without `@` does not form a variable reference at all (an
    /// operand-type error); a present-but-unknown frame prefix is a
    /// frame-access error.
    pub fn parse(text: &str) -> Result<Self, RuntimeError> {
        let (prefix, name) = text
            .split_once('@')
            .ok_or_else(|| RuntimeError::MalformedVariable {
                text: text.to_string(),
            })?;
        let frame = match prefix {
            "GF" => FrameKind::Global,
            "LF" => FrameKind::Local,
            "TF" => FrameKind::Temporary,
            _ => {
                return Err(RuntimeError::UnknownFrame {
                    text: text.to_string(),
                })
            }
        };
        Ok(VarRef {
            frame,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// One frame: a mapping from variable name to an optional value.
///
/// `None` is declared-but-unset; assignment flips the slot to `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    vars: HashMap<String, Option<Value>>,
}

impl Frame {
    /// Declare a name with no value. Returns false if already declared.
    fn define(&mut self, name: &str) -> bool {
        if self.vars.contains_key(name) {
            return false;
        }
        self.vars.insert(name.to_string(), None);
        true
    }

    fn slot(&self, name: &str) -> Option<&Option<Value>> {
        self.vars.get(name)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<Value>> {
        self.vars.get_mut(name)
    }

    /// Entries sorted by name, for deterministic diagnostic dumps.
    pub fn entries_sorted(&self) -> Vec<(&str, Option<&Value>)> {
        let mut entries: Vec<_> = self
            .vars
            .iter()
            .map(|(name, slot)| (name.as_str(), slot.as_ref()))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true when no variable is declared.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// The full runtime environment owned by one interpreter run.
#[derive(Debug, Default)]
pub struct Environment {
    global: Frame,
    locals: Vec<Frame>,
    temporary: Option<Frame>,
    /// Value stack for PUSHS/POPS.
    pub data_stack: Vec<Value>,
    /// Saved program indices for CALL/RETURN.
    pub call_stack: Vec<usize>,
}

impl Environment {
    /// Fresh environment: global frame only, everything else absent/empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// CREATEFRAME: discard any temporary frame and allocate a fresh one.
    pub fn create_frame(&mut self) {
        self.temporary = Some(Frame::default());
    }

    /// PUSHFRAME: move the temporary frame onto the local stack.
    pub fn push_frame(&mut self) -> Result<(), RuntimeError> {
        let frame = self.temporary.take().ok_or(RuntimeError::FrameAbsent {
            frame: FrameKind::Temporary,
        })?;
        self.locals.push(frame);
        Ok(())
    }

    /// POPFRAME: move the top local frame into the temporary slot,
    /// overwriting whatever was there.
    pub fn pop_frame(&mut self) -> Result<(), RuntimeError> {
        let frame = self.locals.pop().ok_or(RuntimeError::FrameAbsent {
            frame: FrameKind::Local,
        })?;
        self.temporary = Some(frame);
        Ok(())
    }

    fn frame(&self, kind: FrameKind) -> Result<&Frame, RuntimeError> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Local => self
                .locals
                .last()
                .ok_or(RuntimeError::FrameAbsent { frame: kind }),
            FrameKind::Temporary => self
                .temporary
                .as_ref()
                .ok_or(RuntimeError::FrameAbsent { frame: kind }),
        }
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, RuntimeError> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Local => self
                .locals
                .last_mut()
                .ok_or(RuntimeError::FrameAbsent { frame: kind }),
            FrameKind::Temporary => self
                .temporary
                .as_mut()
                .ok_or(RuntimeError::FrameAbsent { frame: kind }),
        }
    }

    /// DEFVAR: declare a variable, unset, in its frame.
    pub fn define_var(&mut self, var: &VarRef) -> Result<(), RuntimeError> {
        let frame = self.frame_mut(var.frame)?;
        if !frame.define(&var.name) {
            return Err(RuntimeError::VariableRedefined {
                frame: var.frame,
                name: var.name.clone(),
            });
        }
        Ok(())
    }

    /// Check that a variable is declared, without touching its value.
    pub fn check_defined(&self, var: &VarRef) -> Result<(), RuntimeError> {
        self.frame(var.frame)?
            .slot(&var.name)
            .map(|_| ())
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                frame: var.frame,
                name: var.name.clone(),
            })
    }

    /// Read a variable's value; unset slots are a value error.
    pub fn value(&self, var: &VarRef) -> Result<Value, RuntimeError> {
        let slot = self.frame(var.frame)?.slot(&var.name).ok_or_else(|| {
            RuntimeError::UndefinedVariable {
                frame: var.frame,
                name: var.name.clone(),
            }
        })?;
        slot.clone()
            .ok_or_else(|| RuntimeError::UninitializedVariable {
                name: var.name.clone(),
            })
    }

    /// Assign a variable, unconditionally overwriting.
    pub fn set(&mut self, var: &VarRef, value: Value) -> Result<(), RuntimeError> {
        let slot = self
            .frame_mut(var.frame)?
            .slot_mut(&var.name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                frame: var.frame,
                name: var.name.clone(),
            })?;
        *slot = Some(value);
        Ok(())
    }

    /// Type name of a variable's value, or the empty string for a declared
    /// but unset variable. Only TYPE has this no-error read.
    pub fn type_name(&self, var: &VarRef) -> Result<&'static str, RuntimeError> {
        let slot = self.frame(var.frame)?.slot(&var.name).ok_or_else(|| {
            RuntimeError::UndefinedVariable {
                frame: var.frame,
                name: var.name.clone(),
            }
        })?;
        Ok(slot.as_ref().map(Value::type_name).unwrap_or(""))
    }

    /// The global frame, for diagnostic dumps.
    pub fn global(&self) -> &Frame {
        &self.global
    }

    /// The current local frame, if any, for diagnostic dumps.
    pub fn local(&self) -> Option<&Frame> {
        self.locals.last()
    }

    /// The temporary frame, if any, for diagnostic dumps.
    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }
}
