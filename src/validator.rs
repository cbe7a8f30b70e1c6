//! Exhaustive validation of machine definitions.
//!
//! Every check runs and every defect is reported, so a single call surfaces
//! all problems at once. Rules are visited in sorted key order to keep error
//! lists deterministic across runs.

use crate::types::{Action, CompileError, Direction, MachineDefinition};
use std::collections::HashSet;

/// Validates a [`MachineDefinition`], returning every defect found.
///
/// An empty list means the definition is ready to simulate. Invoked both by
/// the compiler before it returns a definition and by the engine's
/// `start_sim`, so programmatically built definitions get the same checks as
/// compiled ones.
pub fn validate(definition: &MachineDefinition) -> Vec<CompileError> {
    [
        check_alphabets,
        check_distinguished_states,
        check_rules,
        check_default_rule,
    ]
    .iter()
    .flat_map(|check| check(definition))
    .collect()
}

/// The input alphabet must embed into the tape alphabet, which must contain
/// the blank and tape-end symbols; neither distinguished symbol may be a
/// legal input symbol.
fn check_alphabets(definition: &MachineDefinition) -> Vec<CompileError> {
    let tape: HashSet<char> = definition.tape_alphabet.iter().copied().collect();
    let mut errors = Vec::new();

    for &symbol in &definition.input_alphabet {
        if !tape.contains(&symbol) {
            errors.push(CompileError::Alphabet(format!(
                "input symbol '{}' is not in the tape alphabet",
                symbol
            )));
        }
    }

    for (name, symbol) in [
        ("blank", definition.blank),
        ("tape-end", definition.tape_end),
    ] {
        if !tape.contains(&symbol) {
            errors.push(CompileError::Alphabet(format!(
                "{} symbol '{}' is not in the tape alphabet",
                name, symbol
            )));
        }
        if definition.input_alphabet.contains(&symbol) {
            errors.push(CompileError::Alphabet(format!(
                "{} symbol '{}' must not be in the input alphabet",
                name, symbol
            )));
        }
    }

    errors
}

/// Start, accept, and reject states must all be declared.
fn check_distinguished_states(definition: &MachineDefinition) -> Vec<CompileError> {
    let mut errors = Vec::new();

    for (role, state) in [
        ("start", &definition.start_state),
        ("accept", &definition.accept_state),
        ("reject", &definition.reject_state),
    ] {
        if !definition.states.contains(state) {
            errors.push(CompileError::Alphabet(format!(
                "{} state '{}' is not a declared state",
                role, state
            )));
        }
    }

    errors
}

/// Every rule must reference declared states and tape symbols, and rules
/// keyed on the tape-end symbol must write it back and move right.
fn check_rules(definition: &MachineDefinition) -> Vec<CompileError> {
    let states: HashSet<&str> = definition.states.iter().map(String::as_str).collect();
    let tape: HashSet<char> = definition.tape_alphabet.iter().copied().collect();
    let mut errors = Vec::new();

    let mut rule_states: Vec<&String> = definition.rules.keys().collect();
    rule_states.sort();

    for state in rule_states {
        let row = &definition.rules[state];
        let mut symbols: Vec<char> = row.keys().copied().collect();
        symbols.sort_unstable();

        for symbol in symbols {
            let action = &row[&symbol];
            let mut report = |message: String| {
                errors.push(CompileError::InvalidRule {
                    state: state.clone(),
                    symbol,
                    message,
                });
            };

            if !states.contains(state.as_str()) {
                report(format!("source state '{}' is not declared", state));
            }
            if !states.contains(action.next_state.as_str()) {
                report(format!(
                    "destination state '{}' is not declared",
                    action.next_state
                ));
            }
            if !tape.contains(&symbol) {
                report(format!("read symbol '{}' is not in the tape alphabet", symbol));
            }
            if !tape.contains(&action.write) {
                report(format!(
                    "write symbol '{}' is not in the tape alphabet",
                    action.write
                ));
            }
            if symbol == definition.tape_end
                && (action.write != definition.tape_end || action.direction != Direction::Right)
            {
                report("rules on the tape-end symbol must write it back and move right".to_string());
            }
        }
    }

    errors
}

/// The default rule obeys the same membership constraints as explicit rules.
fn check_default_rule(definition: &MachineDefinition) -> Vec<CompileError> {
    let Action {
        next_state,
        write,
        direction: _,
    } = &definition.default_rule;
    let mut errors = Vec::new();

    if !definition.states.contains(next_state) {
        errors.push(CompileError::InvalidDefault {
            message: format!("destination state '{}' is not declared", next_state),
        });
    }
    if !definition.tape_alphabet.contains(write) {
        errors.push(CompileError::InvalidDefault {
            message: format!("write symbol '{}' is not in the tape alphabet", write),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        RuleTable, ACCEPT_STATE, BLANK_SYMBOL, REJECT_STATE, START_STATE, TAPE_END_SYMBOL,
    };

    fn minimal_definition() -> MachineDefinition {
        MachineDefinition {
            states: vec![
                START_STATE.to_string(),
                ACCEPT_STATE.to_string(),
                REJECT_STATE.to_string(),
            ],
            input_alphabet: vec!['a'],
            tape_alphabet: vec!['a', BLANK_SYMBOL, TAPE_END_SYMBOL],
            rules: RuleTable::new(),
            start_state: START_STATE.to_string(),
            accept_state: ACCEPT_STATE.to_string(),
            reject_state: REJECT_STATE.to_string(),
            default_rule: Action {
                next_state: REJECT_STATE.to_string(),
                write: BLANK_SYMBOL,
                direction: Direction::Right,
            },
            blank: BLANK_SYMBOL,
            tape_end: TAPE_END_SYMBOL,
        }
    }

    #[test]
    fn test_minimal_definition_is_valid() {
        assert!(validate(&minimal_definition()).is_empty());
    }

    #[test]
    fn test_input_symbol_missing_from_tape_alphabet() {
        let mut definition = minimal_definition();
        definition.input_alphabet.push('z');

        let errors = validate(&definition);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("'z'"));
    }

    #[test]
    fn test_blank_in_input_alphabet_is_rejected() {
        let mut definition = minimal_definition();
        definition.input_alphabet.push(BLANK_SYMBOL);

        let errors = validate(&definition);
        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("must not be in the input alphabet"));
    }

    #[test]
    fn test_undeclared_destination_state() {
        let mut definition = minimal_definition();
        definition.add_rule(
            START_STATE,
            'a',
            Action {
                next_state: "missing".to_string(),
                write: 'a',
                direction: Direction::Right,
            },
        );

        let errors = validate(&definition);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("'missing'"));
    }

    #[test]
    fn test_tape_end_rule_must_move_right() {
        let mut definition = minimal_definition();
        definition.add_rule(
            START_STATE,
            TAPE_END_SYMBOL,
            Action {
                next_state: START_STATE.to_string(),
                write: TAPE_END_SYMBOL,
                direction: Direction::Left,
            },
        );

        let errors = validate(&definition);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("tape-end"));
    }

    #[test]
    fn test_default_rule_with_undeclared_state() {
        let mut definition = minimal_definition();
        definition.default_rule.next_state = "nowhere".to_string();

        let errors = validate(&definition);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], CompileError::InvalidDefault { .. }));
    }

    #[test]
    fn test_all_defects_are_collected() {
        let mut definition = minimal_definition();
        definition.input_alphabet.push('z');
        definition.default_rule.write = '?';
        definition.add_rule(
            START_STATE,
            TAPE_END_SYMBOL,
            Action {
                next_state: "missing".to_string(),
                write: TAPE_END_SYMBOL,
                direction: Direction::Left,
            },
        );

        let errors = validate(&definition);
        // One alphabet defect, two rule defects, one default-rule defect.
        assert_eq!(errors.len(), 4);
    }
}
