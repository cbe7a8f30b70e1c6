//! The simulation engine: owns a [`MachineDefinition`] plus mutable run
//! state and advances it one transition at a time.
//!
//! The engine is fully synchronous and performs no locking; a definition is
//! read-only and may back many simulations, while run state belongs to
//! exactly one `Simulation`.

use crate::types::{Direction, MachineDefinition, RunError, Snapshot, Status};
use crate::validator::validate;

/// Mutable state of one run: the tape, the head, and the current state.
#[derive(Debug, Clone)]
struct RunState {
    tape: Vec<char>,
    head: usize,
    state: String,
}

/// A single-tape Turing machine simulation.
///
/// Created Uninitialized; `start_sim` moves it to Running, and it halts once
/// the current state reaches the accept or reject state. Halting is a
/// property of the current state queried through [`Simulation::has_ended`],
/// not a separate flag: the terminal states keep self-looping rightward if
/// stepped further.
pub struct Simulation {
    definition: MachineDefinition,
    run: Option<RunState>,
}

impl Simulation {
    /// Creates an uninitialized simulation for the given definition.
    pub fn new(definition: MachineDefinition) -> Self {
        Self {
            definition,
            run: None,
        }
    }

    /// Returns the machine definition this simulation executes.
    pub fn definition(&self) -> &MachineDefinition {
        &self.definition
    }

    /// Initializes the run state for `input`, placing the head at
    /// `head_start` on a tape of `[tape-end] + input`.
    ///
    /// The definition is re-validated in full first, so hand-built
    /// definitions fail here exactly as they would have failed to compile.
    /// Any error leaves the simulation Uninitialized with no partial
    /// mutation: a bad head start, or the first input symbol outside the
    /// input alphabet, aborts before the tape is built.
    pub fn start_sim(&mut self, input: &str, head_start: usize) -> Result<(), Vec<RunError>> {
        let problems = validate(&self.definition);
        if !problems.is_empty() {
            return Err(problems
                .into_iter()
                .map(RunError::InvalidDefinition)
                .collect());
        }

        let len = input.chars().count();
        if head_start > len {
            return Err(vec![RunError::HeadOutOfBounds {
                head: head_start,
                len,
            }]);
        }

        for (position, symbol) in input.chars().enumerate() {
            if !self.definition.input_alphabet.contains(&symbol) {
                return Err(vec![RunError::InputSymbol { symbol, position }]);
            }
        }

        let mut tape = vec![self.definition.tape_end];
        tape.extend(input.chars());

        self.run = Some(RunState {
            tape,
            head: head_start,
            state: self.definition.start_state.clone(),
        });

        Ok(())
    }

    /// Executes one transition: look up the rule for the current state and
    /// the symbol under the head (falling back to the default rule), write,
    /// switch state, then move the head.
    ///
    /// Moving right past the end of the tape appends exactly one blank cell;
    /// the tape is conceptually infinite to the right and materialized
    /// lazily. A left move from index 0 is reported as
    /// [`RunError::TapeUnderflow`] before anything is mutated; validated
    /// definitions cannot reach it because every tape-end rule moves right.
    pub fn step_sim(&mut self) -> Result<(), RunError> {
        let run = self.run.as_mut().ok_or(RunError::NotStarted)?;

        let read = run.tape[run.head];
        let action = self
            .definition
            .rule(&run.state, read)
            .unwrap_or(&self.definition.default_rule);

        if action.direction == Direction::Left && run.head == 0 {
            return Err(RunError::TapeUnderflow);
        }

        run.tape[run.head] = action.write;
        run.state = action.next_state.clone();

        match action.direction {
            Direction::Left => run.head -= 1,
            Direction::Right => {
                run.head += 1;
                if run.head == run.tape.len() {
                    run.tape.push(self.definition.blank);
                }
            }
        }

        Ok(())
    }

    /// Reports whether the machine has halted, by comparing the current
    /// state against the accept and reject states. Uninitialized
    /// simulations report `Running`; callers poll this to know when to stop
    /// driving steps.
    pub fn has_ended(&self) -> Status {
        match &self.run {
            Some(run) if run.state == self.definition.accept_state => Status::Accepted,
            Some(run) if run.state == self.definition.reject_state => Status::Rejected,
            _ => Status::Running,
        }
    }

    /// Returns a defensive copy of the current run state; later calls to
    /// `step_sim` cannot mutate a snapshot already taken.
    pub fn snapshot(&self) -> Result<Snapshot, RunError> {
        let run = self.run.as_ref().ok_or(RunError::NotStarted)?;

        Ok(Snapshot {
            head_position: run.head,
            current_state: run.state.clone(),
            tape: run.tape.clone(),
        })
    }

    /// Returns a lazy, bounded sequence of snapshots: the current
    /// configuration first, then one snapshot after each step, ending with
    /// the halted configuration if the machine halts within `step_budget`
    /// steps. Yields at most `step_budget + 1` snapshots; no execution
    /// outlives the iterator.
    pub fn run(&mut self, step_budget: usize) -> Result<Steps<'_>, RunError> {
        if self.run.is_none() {
            return Err(RunError::NotStarted);
        }

        Ok(Steps {
            sim: self,
            remaining: step_budget,
            done: false,
        })
    }

    /// Discards the run state, returning the simulation to Uninitialized.
    pub fn reset(&mut self) {
        self.run = None;
    }
}

/// Bounded iterator of snapshots produced by [`Simulation::run`].
pub struct Steps<'a> {
    sim: &'a mut Simulation,
    remaining: usize,
    done: bool,
}

impl Iterator for Steps<'_> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        if self.done {
            return None;
        }

        let snapshot = self.sim.snapshot().ok()?;

        if self.sim.has_ended() != Status::Running || self.remaining == 0 {
            self.done = true;
        } else {
            self.remaining -= 1;
            if self.sim.step_sim().is_err() {
                self.done = true;
            }
        }

        Some(snapshot)
    }
}
