//! Loading rule text from the file system.

use crate::compiler::compile;
use crate::types::{CompileError, MachineDefinition};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension recognized for rule files.
pub const RULES_EXTENSION: &str = "tmr";

/// Utility for loading rule files into compiled machine definitions.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Reads and compiles a single rule file.
    ///
    /// A file system failure is reported as a single
    /// [`CompileError::File`]; otherwise the result is that of
    /// [`compile`] on the file's contents.
    pub fn load_program(path: &Path) -> Result<MachineDefinition, Vec<CompileError>> {
        let text = fs::read_to_string(path).map_err(|e| {
            vec![CompileError::File(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))]
        })?;

        compile(&text)
    }

    /// Compiles rule text that did not come from a file.
    pub fn load_program_from_string(text: &str) -> Result<MachineDefinition, Vec<CompileError>> {
        compile(text)
    }

    /// Loads every `.tmr` file in a directory, one result per file.
    /// Subdirectories and files with other extensions are skipped.
    pub fn load_programs(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, MachineDefinition), Vec<CompileError>>> {
        if !directory.exists() {
            return vec![Err(vec![CompileError::File(format!(
                "directory {} does not exist",
                directory.display()
            ))])];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(vec![CompileError::File(format!(
                    "failed to read directory {}: {}",
                    directory.display(),
                    e
                ))])]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(vec![CompileError::File(format!(
                            "failed to read directory entry: {}",
                            e
                        ))]))
                    }
                };

                let path = entry.path();

                if path.is_dir() || path.extension().is_none_or(|ext| ext != RULES_EXTENSION) {
                    return None;
                }

                match Self::load_program(&path) {
                    Ok(definition) => Some(Ok((path, definition))),
                    Err(errors) => Some(Err(errors)),
                }
            })
            .collect()
    }
}
