//! This crate compiles a small human-readable rule language into a
//! deterministic single-tape Turing-machine transition table, then simulates
//! that machine step by step, exposing incremental state snapshots.
//!
//! The two entry points are [`compile`], which turns rule text into a
//! validated [`MachineDefinition`] or a full list of [`CompileError`]s, and
//! [`Simulation`], which owns a definition plus mutable run state and is
//! driven with `start_sim` / `step_sim` / `snapshot` / `has_ended`, or the
//! bounded `run(step_budget)` snapshot iterator.

pub mod compiler;
pub mod loader;
pub mod machine;
pub mod programs;
pub mod types;
pub mod validator;

/// Re-exports the `Rule` enum generated by the `pest` grammar.
pub use crate::compiler::Rule;
/// Re-exports the `compile` function, the crate's compile entry point.
pub use compiler::compile;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the simulation engine and its bounded snapshot iterator.
pub use machine::{Simulation, Steps};
/// Re-exports the embedded demo-program registry.
pub use programs::{ProgramManager, PROGRAMS};
/// Re-exports the core data model and the two error families.
pub use types::{
    Action, CompileError, Direction, MachineDefinition, RunError, Snapshot, Status,
};
/// Re-exports the exhaustive definition validator.
pub use validator::validate;
