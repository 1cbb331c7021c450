//! Interpreter state: program, environment, label table, counters.

use crate::env::{Environment, VarRef};
use crate::error::RuntimeError;
use crate::io::{Input, Output};
use slate_common::instruction::{Arg, Instruction};
use slate_common::{literal, ArgType, Opcode, Program, Value};
use std::collections::HashMap;
use tracing::debug;

/// One run of the execution engine over one program.
///
/// Owns the environment and the label table exclusively; the program is
/// read-only and shared. The I/O collaborators are borrowed for the run.
pub struct Interpreter<'a> {
    pub(crate) program: &'a Program,
    pub(crate) env: Environment,
    pub(crate) labels: HashMap<String, usize>,
    /// Instructions dispatched so far, reported by BREAK.
    pub(crate) executed: u64,
    pub(crate) input: &'a mut dyn Input,
    pub(crate) output: &'a mut dyn Output,
    pub(crate) diag: &'a mut dyn Output,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter for one program run.
    pub fn new(
        program: &'a Program,
        input: &'a mut dyn Input,
        output: &'a mut dyn Output,
        diag: &'a mut dyn Output,
    ) -> Self {
        Self {
            program,
            env: Environment::new(),
            labels: HashMap::new(),
            executed: 0,
            input,
            output,
            diag,
        }
    }

    /// Record every LABEL's program index before execution begins.
    ///
    /// A name defined twice is a semantic error, raised before any
    /// instruction runs.
    pub(crate) fn scan_labels(&mut self) -> Result<(), RuntimeError> {
        for (index, inst) in self.program.instructions.iter().enumerate() {
            if inst.opcode == Opcode::Label {
                let name = inst.args[0].text.clone();
                if self.labels.insert(name.clone(), index).is_some() {
                    return Err(RuntimeError::DuplicateLabel { name });
                }
            }
        }
        debug!(labels = self.labels.len(), "label pre-scan complete");
        Ok(())
    }

    /// Program index of a label's defining LABEL instruction.
    pub(crate) fn label_target(&self, name: &str) -> Result<usize, RuntimeError> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::UndefinedLabel {
                name: name.to_string(),
            })
    }

    /// Resolve a symbol operand to a value: variables through the
    /// environment, literals through the shared conversion routines.
    pub(crate) fn resolve(&self, arg: &Arg) -> Result<Value, RuntimeError> {
        match arg.kind {
            ArgType::Var => {
                let var = VarRef::parse(&arg.text)?;
                self.env.value(&var)
            }
            _ => Ok(literal::parse_value(arg.kind, &arg.text)?),
        }
    }

    /// Parse an instruction's destination variable (always arg1) and check
    /// it is declared, before any operand work happens.
    pub(crate) fn dest(&self, inst: &Instruction) -> Result<VarRef, RuntimeError> {
        let var = VarRef::parse(&inst.args[0].text)?;
        self.env.check_defined(&var)?;
        Ok(var)
    }
}
