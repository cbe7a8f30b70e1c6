//! A small registry of demo programs embedded in the crate, compiled once
//! and served by name.

use crate::compiler::compile;
use crate::types::{CompileError, MachineDefinition};
use std::sync::RwLock;

// Default embedded programs
const PROGRAM_TEXTS: [(&str, &str); 2] = [
    ("match-0n1n2n", include_str!("../programs/match-0n1n2n.tmr")),
    ("unary-append", include_str!("../programs/unary-append.tmr")),
];

lazy_static::lazy_static! {
    /// Compiled demo programs, keyed by name.
    pub static ref PROGRAMS: RwLock<Vec<(String, MachineDefinition)>> = RwLock::new(Vec::new());
}

pub struct ProgramManager;

impl ProgramManager {
    /// Compiles the embedded program texts into the registry.
    pub fn load() -> Result<(), CompileError> {
        let mut programs = Vec::new();

        for (name, text) in PROGRAM_TEXTS {
            match compile(text) {
                Ok(definition) => programs.push((name.to_string(), definition)),
                Err(_) => eprintln!("Failed to compile embedded program '{name}'"),
            }
        }

        if let Ok(mut write_guard) = PROGRAMS.write() {
            *write_guard = programs;
        } else {
            return Err(CompileError::File(
                "failed to acquire write lock".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of available demo programs.
    pub fn count() -> usize {
        let _ = Self::load();

        PROGRAMS.read().map(|programs| programs.len()).unwrap_or(0)
    }

    /// Looks up a compiled demo program by name.
    pub fn get(name: &str) -> Option<MachineDefinition> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .ok()?
            .iter()
            .find(|(program_name, _)| program_name == name)
            .map(|(_, definition)| definition.clone())
    }

    /// Names of all demo programs.
    pub fn names() -> Vec<String> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map(|programs| programs.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    /// Rule text of a demo program, for display or re-compilation.
    pub fn source(name: &str) -> Option<&'static str> {
        PROGRAM_TEXTS
            .iter()
            .find(|(program_name, _)| *program_name == name)
            .map(|(_, text)| *text)
    }
}
