//! Compiler for the textual rule language, built on the `pest` crate.
//!
//! Rule text is one rule per non-blank, non-comment line:
//!
//! ```text
//! SRC_STATE READ_SYMBOL -> DST_STATE WRITE_SYMBOL DIRECTION
//! ```
//!
//! Each line is parsed independently so that every malformed line is
//! reported, tagged with its 1-based line number. Compilation is a pure
//! function of the rule text: it either yields a validated
//! [`MachineDefinition`] or the full list of [`CompileError`]s.

use crate::types::{
    Action, CompileError, Direction, MachineDefinition, RuleTable, ACCEPT_STATE, BLANK_SYMBOL,
    REJECT_STATE, START_STATE, TAPE_END_SYMBOL, WILDCARD,
};
use crate::validator::validate;
use pest::error::LineColLocation;
use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;

/// Character that starts a line comment; the rest of the line is ignored.
pub const COMMENT_CHAR: char = ';';

/// Derives a `PestParser` for the rule-line grammar in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct RuleLineParser;

/// A tokenized rule line, before wildcard expansion.
#[derive(Debug, Clone)]
struct RuleLine {
    src: String,
    read: char,
    dst: String,
    write: char,
    direction: Direction,
}

impl RuleLine {
    fn has_wildcard(&self) -> bool {
        is_wildcard_state(&self.src)
            || is_wildcard_state(&self.dst)
            || self.read == WILDCARD
            || self.write == WILDCARD
    }
}

fn is_wildcard_state(state: &str) -> bool {
    state.len() == 1 && state.starts_with(WILDCARD)
}

/// States and symbols accumulated while scanning rule lines, in declaration
/// order. Kept as an explicit accumulator so compilation stays a pure
/// function of its input text.
#[derive(Debug, Default)]
struct Declarations {
    states: Vec<String>,
    symbols: Vec<char>,
}

impl Declarations {
    fn declare(&mut self, rule: &RuleLine) {
        self.declare_state(&rule.src);
        self.declare_state(&rule.dst);
        self.declare_symbol(rule.read);
        self.declare_symbol(rule.write);
    }

    fn declare_state(&mut self, name: &str) {
        if !is_wildcard_state(name) && !self.states.iter().any(|s| s == name) {
            self.states.push(name.to_string());
        }
    }

    fn declare_symbol(&mut self, symbol: char) {
        if symbol != WILDCARD && !self.symbols.contains(&symbol) {
            self.symbols.push(symbol);
        }
    }
}

/// Compiles rule text into a validated [`MachineDefinition`].
///
/// The first pass tokenizes every line, collecting literal rules (duplicate
/// keys: last write wins), wildcard rules, and the declared states and
/// symbols. The second pass expands wildcard rules against the declared
/// sets without overwriting any existing key, so wildcard rules are
/// strictly lower priority than explicit rules. Tape-end and accept/reject
/// self-loop rules are then synthesized wherever no user rule occupies the
/// key, and the finished definition is validated exhaustively.
pub fn compile(text: &str) -> Result<MachineDefinition, Vec<CompileError>> {
    let mut errors = Vec::new();
    let mut literals = Vec::new();
    let mut wildcards = Vec::new();
    let mut declarations = Declarations::default();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.split(COMMENT_CHAR).next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        match parse_rule_line(line, index + 1) {
            Ok(rule) => {
                declarations.declare(&rule);
                if rule.has_wildcard() {
                    wildcards.push(rule);
                } else {
                    literals.push(rule);
                }
            }
            Err(error) => errors.push(error),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let definition = build_definition(literals, wildcards, declarations);

    let problems = validate(&definition);
    if problems.is_empty() {
        Ok(definition)
    } else {
        Err(problems)
    }
}

/// Parses a single comment-stripped, non-empty line into a [`RuleLine`].
fn parse_rule_line(line: &str, number: usize) -> Result<RuleLine, CompileError> {
    let parsed = RuleLineParser::parse(Rule::rule_line, line).map_err(|e| {
        CompileError::Malformed {
            line: number,
            message: describe_parse_error(&e),
        }
    })?;

    // The grammar guarantees exactly five captured tokens per rule line.
    let mut pairs = parsed.into_iter().next().unwrap().into_inner();
    let src = pairs.next().unwrap().as_str().to_string();
    let read = single_char(pairs.next().unwrap().as_str());
    let dst = pairs.next().unwrap().as_str().to_string();
    let write = single_char(pairs.next().unwrap().as_str());
    let direction = match pairs.next().unwrap().as_str() {
        "L" => Direction::Left,
        _ => Direction::Right,
    };

    Ok(RuleLine {
        src,
        read,
        dst,
        write,
        direction,
    })
}

fn single_char(token: &str) -> char {
    token.chars().next().unwrap_or(BLANK_SYMBOL)
}

/// Renders a pest error as a one-line message with the offending column.
fn describe_parse_error(error: &pest::error::Error<Rule>) -> String {
    let column = match error.line_col {
        LineColLocation::Pos((_, column)) => column,
        LineColLocation::Span((_, column), _) => column,
    };

    format!("column {}: {}", column, error.variant.message())
}

/// Assembles the transition table and alphabets from the two collected rule
/// sets and the declaration accumulator.
fn build_definition(
    literals: Vec<RuleLine>,
    wildcards: Vec<RuleLine>,
    declarations: Declarations,
) -> MachineDefinition {
    let Declarations {
        mut states,
        symbols,
    } = declarations;

    // Wildcards expand over what the rule text itself declared, not over
    // the implicitly added distinguished states and symbols.
    let declared_states = states.clone();
    let declared_symbols = symbols.clone();

    for name in [START_STATE, ACCEPT_STATE, REJECT_STATE] {
        if !states.iter().any(|s| s == name) {
            states.push(name.to_string());
        }
    }

    let mut tape_alphabet = symbols.clone();
    for symbol in [BLANK_SYMBOL, TAPE_END_SYMBOL] {
        if !tape_alphabet.contains(&symbol) {
            tape_alphabet.push(symbol);
        }
    }

    let input_alphabet: Vec<char> = symbols
        .into_iter()
        .filter(|&c| c != BLANK_SYMBOL && c != TAPE_END_SYMBOL)
        .collect();

    let mut rules = RuleTable::new();

    // Literal pass: duplicate (state, symbol) keys replace silently.
    for rule in literals {
        rules.entry(rule.src).or_default().insert(
            rule.read,
            Action {
                next_state: rule.dst,
                write: rule.write,
                direction: rule.direction,
            },
        );
    }

    // Wildcard pass: expand over the declared sets, never overwriting. A
    // wildcard destination resolves to the expanded source state and a
    // wildcard write resolves to the expanded read symbol, so
    // `s * -> s * L` means "keep the symbol and move left". Accept and
    // reject are excluded from source expansion to keep them terminal.
    for rule in wildcards {
        let src_states: Vec<&str> = if is_wildcard_state(&rule.src) {
            declared_states
                .iter()
                .map(String::as_str)
                .filter(|s| *s != ACCEPT_STATE && *s != REJECT_STATE)
                .collect()
        } else {
            vec![rule.src.as_str()]
        };
        let read_symbols: Vec<char> = if rule.read == WILDCARD {
            declared_symbols.clone()
        } else {
            vec![rule.read]
        };

        for src in &src_states {
            for &read in &read_symbols {
                let next_state = if is_wildcard_state(&rule.dst) {
                    src.to_string()
                } else {
                    rule.dst.clone()
                };
                let write = if rule.write == WILDCARD {
                    read
                } else {
                    rule.write
                };

                rules
                    .entry(src.to_string())
                    .or_default()
                    .entry(read)
                    .or_insert(Action {
                        next_state,
                        write,
                        direction: rule.direction,
                    });
            }
        }
    }

    // Synthesized rules, inserted only where no user rule took the key:
    // a tape-end self-rule per state, and accept/reject self-loops over
    // every tape symbol. These make the terminal states loop rightward by
    // construction rather than as a special case in the stepper.
    for state in &states {
        rules
            .entry(state.clone())
            .or_default()
            .entry(TAPE_END_SYMBOL)
            .or_insert(Action {
                next_state: state.clone(),
                write: TAPE_END_SYMBOL,
                direction: Direction::Right,
            });
    }
    for terminal in [ACCEPT_STATE, REJECT_STATE] {
        for &symbol in &tape_alphabet {
            rules
                .entry(terminal.to_string())
                .or_default()
                .entry(symbol)
                .or_insert(Action {
                    next_state: terminal.to_string(),
                    write: symbol,
                    direction: Direction::Right,
                });
        }
    }

    MachineDefinition {
        states,
        input_alphabet,
        tape_alphabet,
        rules,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_simple_rules() {
        let input = "\
state_start # -> scan # R
scan a -> scan a R
scan _ -> state_accept _ R
";

        let definition = compile(input).unwrap();
        assert_eq!(definition.start_state, START_STATE);
        assert!(definition.states.iter().any(|s| s == "scan"));
        assert_eq!(definition.input_alphabet, vec!['a']);
        assert!(definition.tape_alphabet.contains(&BLANK_SYMBOL));
        assert!(definition.tape_alphabet.contains(&TAPE_END_SYMBOL));

        let action = definition.rule("scan", 'a').unwrap();
        assert_eq!(action.next_state, "scan");
        assert_eq!(action.write, 'a');
        assert_eq!(action.direction, Direction::Right);
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let input = "\
; a full-line comment
state_start # -> scan # R   ; trailing comment

scan _ -> state_accept _ R
";

        let definition = compile(input).unwrap();
        assert_eq!(
            definition.rule(START_STATE, '#').unwrap().next_state,
            "scan"
        );
    }

    #[test]
    fn test_malformed_lines_are_all_collected() {
        let input = "\
state_start # -> scan # R
scan a scan a R
scan b -> scan b X
scan _ -> state_accept _ R
";

        let errors = compile(input).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors[0],
            CompileError::Malformed { line: 2, .. }
        ));
        assert!(matches!(
            errors[1],
            CompileError::Malformed { line: 3, .. }
        ));
    }

    #[test]
    fn test_line_numbers_count_comment_lines() {
        let input = "\
; comment on line one

bad line three
";

        let errors = compile(input).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            CompileError::Malformed { line: 3, .. }
        ));
    }

    #[test]
    fn test_wrong_token_count_is_an_error() {
        let errors = compile("state_start # -> scan # R extra").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("line 1"));
    }

    #[test]
    fn test_duplicate_literal_rule_last_write_wins() {
        let input = "\
state_start a -> s1 a R
state_start a -> s2 b L
s1 x -> s1 x R
s2 x -> s2 x R
";

        let definition = compile(input).unwrap();
        let action = definition.rule(START_STATE, 'a').unwrap();
        assert_eq!(action.next_state, "s2");
        assert_eq!(action.write, 'b');
        assert_eq!(action.direction, Direction::Left);
    }

    #[test]
    fn test_wildcard_expands_over_declared_states() {
        let input = "\
s1 x -> s2 x R
* a -> * b R
";

        let definition = compile(input).unwrap();

        for state in ["s1", "s2"] {
            let action = definition.rule(state, 'a').unwrap();
            assert_eq!(action.next_state, state);
            assert_eq!(action.write, 'b');
            assert_eq!(action.direction, Direction::Right);
        }
    }

    #[test]
    fn test_explicit_rule_beats_wildcard() {
        let input = "\
s1 x -> s2 x R
s1 a -> s2 c R
* a -> * b R
";

        let definition = compile(input).unwrap();

        let explicit = definition.rule("s1", 'a').unwrap();
        assert_eq!(explicit.next_state, "s2");
        assert_eq!(explicit.write, 'c');

        let expanded = definition.rule("s2", 'a').unwrap();
        assert_eq!(expanded.next_state, "s2");
        assert_eq!(expanded.write, 'b');
    }

    #[test]
    fn test_wildcard_write_keeps_read_symbol() {
        // The rewind idiom from the demo programs: on any symbol other
        // than the sentinel, keep it and move left.
        let input = "\
state_start # -> scan # R
scan 0 -> scan 0 R
state_start * -> state_start * L
";

        let definition = compile(input).unwrap();

        let expanded = definition.rule(START_STATE, '0').unwrap();
        assert_eq!(expanded.next_state, START_STATE);
        assert_eq!(expanded.write, '0');
        assert_eq!(expanded.direction, Direction::Left);

        // (state_start, #) was taken by the literal rule.
        let literal = definition.rule(START_STATE, TAPE_END_SYMBOL).unwrap();
        assert_eq!(literal.next_state, "scan");
        assert_eq!(literal.direction, Direction::Right);
    }

    #[test]
    fn test_tape_end_rule_synthesized_for_every_state() {
        let input = "\
state_start a -> s1 a R
s1 a -> state_accept a R
";

        let definition = compile(input).unwrap();
        for state in &definition.states {
            let action = definition.rule(state, TAPE_END_SYMBOL).unwrap();
            assert_eq!(action.next_state, *state, "state {}", state);
            assert_eq!(action.write, TAPE_END_SYMBOL);
            assert_eq!(action.direction, Direction::Right);
        }
    }

    #[test]
    fn test_accept_and_reject_self_loops_synthesized() {
        let definition = compile("state_start a -> state_accept a R").unwrap();

        for terminal in [ACCEPT_STATE, REJECT_STATE] {
            for &symbol in &definition.tape_alphabet {
                let action = definition.rule(terminal, symbol).unwrap();
                assert_eq!(action.next_state, terminal);
                assert_eq!(action.write, symbol);
                assert_eq!(action.direction, Direction::Right);
            }
        }
    }

    #[test]
    fn test_user_tape_end_rule_takes_precedence() {
        let definition = compile("state_start # -> scan # R\nscan a -> scan a R").unwrap();
        let action = definition.rule(START_STATE, TAPE_END_SYMBOL).unwrap();
        assert_eq!(action.next_state, "scan");
    }

    #[test]
    fn test_tape_end_violation_is_a_compile_error() {
        let errors = compile("state_start # -> state_start # L").unwrap_err();
        assert!(!errors.is_empty());
        assert!(errors[0].to_string().contains("tape-end"));
    }

    #[test]
    fn test_tape_end_rewrite_violation_is_a_compile_error() {
        let errors = compile("state_start # -> state_start a R").unwrap_err();
        assert!(!errors.is_empty());
        assert!(errors[0].to_string().contains("tape-end"));
    }

    #[test]
    fn test_empty_text_compiles_to_skeleton_machine() {
        let definition = compile("").unwrap();
        assert_eq!(
            definition.states,
            vec![
                START_STATE.to_string(),
                ACCEPT_STATE.to_string(),
                REJECT_STATE.to_string()
            ]
        );
        assert!(definition.input_alphabet.is_empty());
        assert_eq!(definition.tape_alphabet, vec![BLANK_SYMBOL, TAPE_END_SYMBOL]);
    }

    #[test]
    fn test_default_rule_rejects() {
        let definition = compile("state_start a -> state_start a R").unwrap();
        assert_eq!(definition.default_rule.next_state, REJECT_STATE);
        assert_eq!(definition.default_rule.write, BLANK_SYMBOL);
        assert_eq!(definition.default_rule.direction, Direction::Right);
    }
}
