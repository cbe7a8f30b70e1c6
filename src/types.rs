//! Core data structures shared by the compiler and the simulation engine:
//! directions, transition actions, machine definitions, snapshots, and the
//! two error families.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Symbol that fills newly exposed tape cells.
pub const BLANK_SYMBOL: char = '_';
/// Sentinel symbol marking the fixed left boundary of the tape.
pub const TAPE_END_SYMBOL: char = '#';
/// Wildcard token in rule text, expanded over every declared state or symbol.
pub const WILDCARD: char = '*';

/// Name of the state every machine starts in.
pub const START_STATE: &str = "state_start";
/// Name of the accepting terminal state.
pub const ACCEPT_STATE: &str = "state_accept";
/// Name of the rejecting terminal state.
pub const REJECT_STATE: &str = "state_reject";

/// Direction the head moves after a transition is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one cell to the left.
    Left,
    /// Move the head one cell to the right.
    Right,
}

/// The value side of a transition rule: the state to enter, the symbol to
/// write over the cell under the head, and the direction to move afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The state the machine transitions to.
    pub next_state: String,
    /// The symbol written at the head position.
    pub write: char,
    /// The head movement applied after writing.
    pub direction: Direction,
}

/// Transition table keyed first by source state, then by the symbol read.
pub type RuleTable = HashMap<String, HashMap<char, Action>>;

/// Immutable description of a compiled machine.
///
/// A definition is produced by [`crate::compile`] or built programmatically
/// with [`MachineDefinition::add_rule`]. It is read-only during simulation
/// and may be cloned freely to drive several simulations from one compile.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineDefinition {
    /// All declared states, in declaration order.
    pub states: Vec<String>,
    /// Symbols permitted in the initial input, in declaration order.
    pub input_alphabet: Vec<char>,
    /// Symbols permitted on the tape; a superset of the input alphabet that
    /// always contains the blank and tape-end symbols.
    pub tape_alphabet: Vec<char>,
    /// The transition table. Lookup misses fall back to `default_rule`.
    pub rules: RuleTable,
    /// The state a simulation starts in.
    pub start_state: String,
    /// The accepting terminal state.
    pub accept_state: String,
    /// The rejecting terminal state.
    pub reject_state: String,
    /// Applied when no rule matches the current (state, symbol) pair.
    pub default_rule: Action,
    /// Symbol appended when the tape grows to the right.
    pub blank: char,
    /// Sentinel symbol at tape index 0.
    pub tape_end: char,
}

impl MachineDefinition {
    /// Looks up the rule for a (state, symbol) pair, without falling back to
    /// the default rule.
    pub fn rule(&self, state: &str, symbol: char) -> Option<&Action> {
        self.rules.get(state).and_then(|row| row.get(&symbol))
    }

    /// Inserts a rule from (state, symbol) to `action`, replacing any rule
    /// already present for that key.
    ///
    /// Does not verify that the referenced states and symbols are declared;
    /// that is checked by [`crate::validate`] before a simulation starts.
    pub fn add_rule(&mut self, state: &str, symbol: char, action: Action) {
        self.rules
            .entry(state.to_string())
            .or_default()
            .insert(symbol, action);
    }

    /// Total number of concrete rules in the transition table.
    pub fn rule_count(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }
}

/// Errors produced while compiling rule text into a machine definition.
///
/// Compile errors are always collected in full rather than failing at the
/// first defect, and a non-empty list always prevents a definition from
/// being produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A rule line that does not match `SRC READ -> DST WRITE DIRECTION`.
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
    /// A structurally valid rule that references undeclared states or
    /// symbols, or violates the tape-end invariant.
    #[error("rule ({state}, '{symbol}'): {message}")]
    InvalidRule {
        state: String,
        symbol: char,
        message: String,
    },
    /// A defect in the default rule.
    #[error("default rule: {message}")]
    InvalidDefault { message: String },
    /// An inconsistency between the input and tape alphabets.
    #[error("{0}")]
    Alphabet(String),
    /// A file system failure while loading rule text.
    #[error("file error: {0}")]
    File(String),
}

/// Errors produced while starting or stepping a simulation.
///
/// Each aborts the requested operation and leaves the run state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// The machine definition failed the validation re-run in `start_sim`.
    #[error("machine definition failed validation: {0}")]
    InvalidDefinition(CompileError),
    /// The requested head start lies beyond the end of the input.
    #[error("head start {head} is out of bounds for input of length {len}")]
    HeadOutOfBounds { head: usize, len: usize },
    /// An input symbol is not a member of the input alphabet.
    #[error("input symbol '{symbol}' at position {position} is not in the input alphabet")]
    InputSymbol { symbol: char, position: usize },
    /// `step_sim`, `snapshot`, or `run` was called before `start_sim`.
    #[error("simulation has not been started")]
    NotStarted,
    /// A transition would move the head left past the tape-end sentinel.
    /// Unreachable for definitions that pass validation, since every rule on
    /// the tape-end symbol must move right.
    #[error("head would move left past the tape-end sentinel")]
    TapeUnderflow,
}

/// Halt status of a running machine, derived from its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The machine has not reached the accept or reject state.
    Running,
    /// The current state is the accept state.
    Accepted,
    /// The current state is the reject state.
    Rejected,
}

/// Immutable point-in-time copy of a simulation's run state.
///
/// Snapshots are defensive copies: stepping the simulation after taking one
/// never mutates it. The serialized shape is consumed by transport shells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Index of the head into `tape`.
    pub head_position: usize,
    /// Name of the current state.
    pub current_state: String,
    /// Full tape contents, starting with the tape-end sentinel.
    pub tape: Vec<char>,
}
