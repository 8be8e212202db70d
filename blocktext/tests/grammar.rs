use blocktext::ParseError;
use blocktext::grammar::{self, GrammarTable, Production as P, RuleName as R};
use blocktext::parser::error::ConfigurationError;
use blocktext::token::{TokenCategory, TokenKind as K};

fn build_error(start: R, rules: Vec<(R, P)>) -> ConfigurationError {
    GrammarTable::build(start, rules).expect_err("grammar should be rejected")
}

#[test]
fn notation_grammar_validates() {
    grammar::validate().expect("built-in grammar is invalid");
    let table = grammar::notation().unwrap();
    assert_eq!(table.start(), R::Code);
    assert!(table.rule(R::Predicate).is_some());
}

#[test]
fn notation_lead_tokens() {
    let table = grammar::notation().unwrap();

    assert_eq!(table.first(R::Condition), vec![K::LCurly, K::LAngle]);
    assert_eq!(
        table.first(R::Composite),
        vec![K::Forever, K::Repeat, K::RepeatUntil, K::If]
    );
    for kind in TokenCategory::Literal.kinds() {
        assert!(table.starts(R::Argument, *kind));
        assert!(table.starts(R::Block, *kind));
    }
    assert!(table.starts(R::Block, K::Label));
    assert!(!table.starts(R::Block, K::End));
    assert!(table.starts(R::Clause, K::Delimiter));
    assert!(table.starts(R::Clause, K::End));
}

#[test]
fn notation_nullable_rules() {
    let table = grammar::notation().unwrap();
    for rule in [R::Code, R::Clause, R::Modifier, R::Annotations] {
        assert!(table.is_nullable(rule), "{} should be nullable", rule);
    }
    for rule in [R::Stack, R::Block, R::Atomic, R::Argument, R::Condition, R::Predicate] {
        assert!(!table.is_nullable(rule), "{} should not be nullable", rule);
    }
}

#[test]
fn rejects_duplicate_rule() {
    let error = build_error(
        R::Code,
        vec![(R::Code, P::token(K::Label)), (R::Code, P::token(K::End))],
    );
    assert_eq!(error, ConfigurationError::DuplicateRule(R::Code));
}

#[test]
fn rejects_missing_start_rule() {
    let error = build_error(R::Code, vec![(R::Stack, P::token(K::Label))]);
    assert_eq!(
        error,
        ConfigurationError::UndefinedRule {
            rule: R::Code,
            referenced_by: None
        }
    );
    assert_eq!(error.to_string(), "start rule `code` is not defined");
}

#[test]
fn rejects_undefined_reference() {
    let error = build_error(R::Code, vec![(R::Code, P::rule(R::Stack))]);
    assert_eq!(
        error,
        ConfigurationError::UndefinedRule {
            rule: R::Stack,
            referenced_by: Some(R::Code)
        }
    );
}

#[test]
fn rejects_left_recursion() {
    let error = build_error(
        R::Code,
        vec![
            (R::Code, P::rule(R::Stack)),
            (
                R::Stack,
                P::seq(vec![P::optional(P::token(K::Delimiter)), P::rule(R::Code)]),
            ),
        ],
    );
    assert_eq!(
        error,
        ConfigurationError::LeftRecursion(vec![R::Code, R::Stack, R::Code])
    );
    assert_eq!(error.to_string(), "left recursion: code -> stack -> code");
}

#[test]
fn recursion_after_a_token_is_fine() {
    let table = GrammarTable::build(
        R::Expression,
        vec![(
            R::Expression,
            P::seq(vec![
                P::token(K::LRound),
                P::optional(P::rule(R::Expression)),
                P::token(K::RRound),
            ]),
        )],
    )
    .expect("grammar should be accepted");
    assert_eq!(table.first(R::Expression), vec![K::LRound]);
}

#[test]
fn rejects_loop_over_nullable_body() {
    let error = build_error(
        R::Code,
        vec![(R::Code, P::many(P::optional(P::token(K::Label))))],
    );
    assert_eq!(error, ConfigurationError::EmptyLoop(R::Code));
}

#[test]
fn rejects_overlapping_alternatives() {
    let error = build_error(
        R::Block,
        vec![(
            R::Block,
            P::choice(vec![
                P::token(K::Label),
                P::seq(vec![P::token(K::Label), P::token(K::End)]),
            ]),
        )],
    );
    assert_eq!(
        error,
        ConfigurationError::AmbiguousChoice {
            rule: R::Block,
            overlap: vec![K::Label]
        }
    );
}

#[test]
fn category_terminals_count_towards_overlap() {
    let error = build_error(
        R::Argument,
        vec![(
            R::Argument,
            P::choice(vec![
                P::category(TokenCategory::Literal),
                P::token(K::NumberLiteral),
            ]),
        )],
    );
    assert_eq!(
        error,
        ConfigurationError::AmbiguousChoice {
            rule: R::Argument,
            overlap: vec![K::NumberLiteral]
        }
    );
}

#[test]
fn rejects_several_empty_alternatives() {
    let error = build_error(
        R::Clause,
        vec![(
            R::Clause,
            P::choice(vec![
                P::optional(P::token(K::Label)),
                P::many(P::token(K::End)),
            ]),
        )],
    );
    assert_eq!(error, ConfigurationError::NullableAlternatives(R::Clause));
}

#[test]
fn configuration_errors_render_as_parse_errors() {
    let error = ParseError::from(ConfigurationError::EmptyLoop(R::Stack));
    assert!(error.span().is_none());
    assert_eq!(
        error.to_string(),
        "invalid grammar: grammar rule `stack` repeats a body \
         that can match without consuming input"
    );
}
