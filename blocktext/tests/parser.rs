use blocktext::block::{
    Annotations, Argument, Atomic, AtomicElement, Block, Composite, Condition, Value,
};
use blocktext::grammar::RuleName;
use blocktext::parser::MAX_NESTING;
use blocktext::parser::error::{NestingError, SyntaxError};
use blocktext::stack::Segment;
use blocktext::token::TokenKind;
use blocktext::{Code, ParseError, Parser};

fn parse(source: &str) -> Code {
    Parser::new(source.to_string(), 0)
        .parse()
        .expect("parse failed")
}

fn syntax_error(source: &str) -> SyntaxError {
    match Parser::new(source.to_string(), 0).parse() {
        Err(ParseError::Syntax(error)) => error,
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

fn blocks(code: &Code) -> Vec<&Block> {
    code.stacks().flat_map(|stack| stack.blocks.iter()).collect()
}

fn single_atomic(code: &Code) -> &Atomic {
    match blocks(code).as_slice() {
        [Block::Atomic(atomic)] => atomic,
        other => panic!("expected one atomic block, got {:?}", other),
    }
}

fn single_composite(code: &Code) -> &Composite {
    match blocks(code).as_slice() {
        [Block::Composite(composite)] => composite,
        other => panic!("expected one composite block, got {:?}", other),
    }
}

fn label_texts(code: &Code) -> Vec<String> {
    code.atomic_blocks().iter().map(|a| a.label_text()).collect()
}

#[test]
fn plain_atomic_block() {
    let code = parse("move 10 steps");
    let atomic = single_atomic(&code);
    assert_eq!(atomic.elements.len(), 1);
    assert!(matches!(&atomic.elements[0], AtomicElement::Label(t) if t.text == "move 10 steps"));
    assert!(atomic.modifier.is_none());
    assert!(atomic.annotations.is_none());
}

#[test]
fn atomic_with_argument_modifier_and_id() {
    let code = parse("move {10} steps :: my blocks @id1");
    let atomic = single_atomic(&code);

    let labels: Vec<&str> = atomic.labels().map(|t| t.text.as_str()).collect();
    assert_eq!(labels, vec!["move", "steps"]);

    let arguments: Vec<&Argument> = atomic.arguments().collect();
    assert_eq!(arguments.len(), 1);
    match arguments[0] {
        Argument::Curly {
            value: Some(Value::Literal(token)),
            id: None,
            ..
        } => {
            assert_eq!(token.kind, TokenKind::NumberLiteral);
            assert_eq!(token.text, "10");
        }
        other => panic!("unexpected argument {:?}", other),
    }

    let modifier = atomic.modifier.as_ref().expect("modifier");
    assert_eq!(modifier.name(), "my blocks");

    match &atomic.annotations {
        Some(Annotations::Identified { id, comment: None }) => assert_eq!(id.text, "@id1"),
        other => panic!("unexpected annotations {:?}", other),
    }
}

#[test]
fn atomic_span_covers_modifier_and_annotations() {
    let source = "move {10} steps :: motion |note|";
    let code = parse(source);
    let atomic = single_atomic(&code);
    assert_eq!(atomic.span, 0..source.len());
    assert_eq!(atomic.label_text(), "move _ steps");
}

#[test]
fn remark_then_id() {
    let code = parse("move |note| @b1");
    match &single_atomic(&code).annotations {
        Some(Annotations::Remark { comment, id: Some(id) }) => {
            assert_eq!(comment.text, "|note|");
            assert_eq!(id.text, "@b1");
        }
        other => panic!("unexpected annotations {:?}", other),
    }
}

#[test]
fn empty_and_identified_arguments() {
    let code = parse("set {@var} to {}");
    let arguments: Vec<&Argument> = single_atomic(&code).arguments().collect();
    assert_eq!(arguments.len(), 2);
    assert!(arguments[0].value().is_none());
    assert_eq!(arguments[0].id().map(|t| t.text.as_str()), Some("@var"));
    assert!(arguments[1].value().is_none());
    assert!(arguments[1].id().is_none());
}

#[test]
fn if_with_predicate_then_and_end() {
    let code = parse("if <x > 5> then move {10} steps end");
    let Composite::IfElse(if_else) = single_composite(&code) else {
        panic!("expected if/else");
    };

    let Condition::Bare(predicate) = &if_else.condition else {
        panic!("expected a bare predicate");
    };
    let inner = predicate.atomic.as_ref().expect("predicate body");
    assert_eq!(inner.label_text(), "x > 5");

    assert!(if_else.then.is_some());
    assert_eq!(if_else.then_clause.blocks().len(), 1);
    assert!(if_else.then_clause.end.is_some());
    assert!(if_else.else_branch.is_none());
}

#[test]
fn trailing_end_is_optional() {
    let code = parse("if <x > 5> then move {10} steps");
    let Composite::IfElse(if_else) = single_composite(&code) else {
        panic!("expected if/else");
    };
    assert_eq!(if_else.then_clause.blocks().len(), 1);
    assert!(if_else.then_clause.end.is_none());
}

#[test]
fn if_else_on_separate_lines() {
    let code = parse("if <a>\n  say hi\nelse\n  say bye\nend");
    let Composite::IfElse(if_else) = single_composite(&code) else {
        panic!("expected if/else");
    };
    assert!(if_else.then.is_none());
    assert!(if_else.then_clause.end.is_none());
    let branch = if_else.else_branch.as_ref().expect("else branch");
    assert_eq!(branch.clause.blocks().len(), 1);
    assert!(branch.clause.end.is_some());
    assert_eq!(label_texts(&code), vec!["a", "say hi", "say bye"]);
}

#[test]
fn curly_condition_with_id() {
    let code = parse("if {<a> @c1} then\nend");
    let Composite::IfElse(if_else) = single_composite(&code) else {
        panic!("expected if/else");
    };
    match &if_else.condition {
        Condition::Curly {
            predicate: Some(_),
            id: Some(id),
            ..
        } => assert_eq!(id.text, "@c1"),
        other => panic!("unexpected condition {:?}", other),
    }
    assert!(if_else.then_clause.is_empty());
}

#[test]
fn nested_loops() {
    let code = parse("forever\n  repeat {10}\n    move {1} steps\n  end\nend");
    let Composite::Forever(forever) = single_composite(&code) else {
        panic!("expected forever");
    };
    assert!(forever.body.end.is_some());
    let [Block::Composite(Composite::Repeat(repeat))] = forever.body.blocks() else {
        panic!("expected a nested repeat");
    };
    assert!(matches!(
        &repeat.count,
        Argument::Curly { value: Some(Value::Literal(_)), .. }
    ));
    assert!(repeat.body.end.is_some());
    assert_eq!(label_texts(&code), vec!["move _ steps"]);
}

#[test]
fn repeat_with_bare_count() {
    let code = parse("repeat 10\nmove\nend");
    let Composite::Repeat(repeat) = single_composite(&code) else {
        panic!("expected repeat");
    };
    match &repeat.count {
        Argument::Bare(Value::Literal(token)) => assert_eq!(token.kind, TokenKind::NumberLiteral),
        other => panic!("unexpected count {:?}", other),
    }
}

#[test]
fn repeat_until_condition() {
    let code = parse("repeat until <touching [edge]?>\n  move {10} steps\nend");
    let Composite::RepeatUntil(repeat_until) = single_composite(&code) else {
        panic!("expected repeat until");
    };
    assert_eq!(repeat_until.keyword.kind, TokenKind::RepeatUntil);
    assert_eq!(repeat_until.body.blocks().len(), 1);
    assert_eq!(label_texts(&code), vec!["touching _ ?", "move _ steps"]);
}

#[test]
fn empty_bodies() {
    let Composite::Forever(forever) = single_composite(&parse("forever")).clone() else {
        panic!("expected forever");
    };
    assert!(forever.body.is_empty());
    assert!(forever.body.end.is_none());

    let Composite::Forever(forever) = single_composite(&parse("forever end")).clone() else {
        panic!("expected forever");
    };
    assert!(forever.body.is_empty());
    assert!(forever.body.end.is_some());
}

#[test]
fn nested_expressions_walk_depth_first() {
    let code = parse("say (join [a] (length of [b])) for {2} seconds");
    assert_eq!(
        label_texts(&code),
        vec!["say _ for _ seconds", "join _ _", "length of _"]
    );
}

#[test]
fn stacks_separated_by_blank_lines_and_comments() {
    let code = parse("|header|\n\nwhen flag clicked\nmove\n\n|between|\nturn");
    assert_eq!(code.comments.as_ref().map(|c| c.remarks.len()), Some(1));
    assert_eq!(code.segments.len(), 3);
    assert!(matches!(code.segments[1], Segment::Comments(_)));
    assert_eq!(code.stacks().count(), 2);
    assert_eq!(label_texts(&code), vec!["when flag clicked", "move", "turn"]);
}

#[test]
fn blank_and_comment_only_inputs() {
    assert!(parse("").is_empty());
    assert!(parse("\n\n;\n").is_empty());
    let code = parse("// nothing here\n|just a remark|");
    assert!(code.is_empty());
    assert!(code.comments.is_some());
}

#[test]
fn if_without_condition() {
    let error = syntax_error("if then move end");
    assert_eq!(error.rule, RuleName::Condition);
    assert_eq!(error.expected, vec![TokenKind::LCurly, TokenKind::LAngle]);
    assert_eq!(error.found.as_ref().map(|t| t.kind), Some(TokenKind::Then));
    assert_eq!(error.span, 3..7);
}

#[test]
fn unclosed_argument() {
    let error = syntax_error("move {10 steps");
    assert_eq!(error.rule, RuleName::Argument);
    assert_eq!(error.expected, vec![TokenKind::RCurly]);
}

#[test]
fn unexpected_end_of_input() {
    let error = syntax_error("say (hello");
    assert_eq!(error.rule, RuleName::Expression);
    assert!(error.found.is_none());
    assert_eq!(error.span, 10..10);
    assert_eq!(
        error.to_string(),
        "expected `)` in expression, found end of input"
    );
}

#[test]
fn modifier_requires_a_label() {
    let error = syntax_error("move ::");
    assert_eq!(error.rule, RuleName::Modifier);
    assert_eq!(error.expected, vec![TokenKind::Label]);
}

#[test]
fn trailing_tokens_list_what_could_continue() {
    use TokenKind::*;

    let error = syntax_error("move )");
    assert_eq!(error.rule, RuleName::Code);
    assert!(error.end_of_input);
    assert_eq!(
        error.expected,
        vec![
            Comment,
            StringLiteral,
            NumberLiteral,
            ColorLiteral,
            ChoiceLiteral,
            Delimiter,
            Label,
            LCurly,
            LRound,
            LAngle,
            DoubleColon,
            Id,
        ]
    );
    let message = error.to_string();
    assert!(message.starts_with("expected one of remark `|...|`, string literal"));
    assert!(message.ends_with("identifier `@...`, end of input in code, found `)`"));
}

#[test]
fn stray_end_after_a_block() {
    let error = syntax_error("move end");
    assert!(error.end_of_input);
    assert!(error.expected.contains(&TokenKind::DoubleColon));
    assert!(error.expected.contains(&TokenKind::LCurly));
    assert!(matches!(&error.found, Some(token) if token.kind == TokenKind::End));

    let error = syntax_error("move\nend");
    assert!(error.end_of_input);
    assert!(error.expected.contains(&TokenKind::Delimiter));
    assert!(error.expected.contains(&TokenKind::Forever));
    assert!(!error.expected.contains(&TokenKind::DoubleColon));
}

fn nesting_error(source: &str) -> NestingError {
    match Parser::new(source.to_string(), 0).parse() {
        Err(ParseError::Nesting(error)) => error,
        other => panic!("expected a nesting error, got {:?}", other),
    }
}

#[test]
fn deeply_nested_expressions_are_rejected() {
    let source = format!("say {}x{}", "(".repeat(5000), ")".repeat(5000));
    let error = nesting_error(&source);
    assert_eq!(error.rule, RuleName::Expression);
    assert_eq!(error.limit, MAX_NESTING);
    let offset = 4 + MAX_NESTING;
    assert_eq!(error.span, offset..offset + 1);
    assert_eq!(
        error.to_string(),
        format!("expression nested more than {} levels deep", MAX_NESTING)
    );
}

#[test]
fn deeply_nested_predicates_are_rejected() {
    let source = format!("if {}x{}", "<".repeat(5000), ">".repeat(5000));
    assert_eq!(nesting_error(&source).rule, RuleName::Predicate);
}

#[test]
fn deeply_nested_loops_are_rejected() {
    let source = "forever\n".repeat(5000);
    assert_eq!(nesting_error(&source).rule, RuleName::Clause);
}

#[test]
fn moderate_nesting_parses() {
    let source = format!("say {}x{}", "(".repeat(20), ")".repeat(20));
    assert_eq!(label_texts(&parse(&source)).len(), 21);

    let source = "forever\n".repeat(20) + "move";
    assert_eq!(label_texts(&parse(&source)), vec!["move"]);
}

#[test]
fn nesting_diagnostic_names_the_limit() {
    let source = "repeat {3}\n".repeat(100);
    let error = Parser::new(source, 2).parse().unwrap_err();
    let diagnostic = error.to_diagnostic(2);
    assert_eq!(diagnostic.labels[0].file_id, 2);
    assert!(diagnostic.message.contains("nested more than"));
}

#[test]
fn spaced_operators_stay_outside_predicates() {
    let code = parse("say < mouse down? >");
    let atomic = single_atomic(&code);
    assert_eq!(atomic.elements.len(), 2);
    assert!(matches!(&atomic.elements[0], AtomicElement::Label(t) if t.text == "say"));
    assert!(matches!(
        &atomic.elements[1],
        AtomicElement::Argument(Argument::Bare(Value::Predicate(_)))
    ));
    assert_eq!(label_texts(&code), vec!["say _", "mouse down?"]);
}

#[test]
fn lexical_errors_propagate() {
    let result = Parser::new("say \"abc".to_string(), 0).parse();
    match result {
        Err(ParseError::Lexical(error)) => assert_eq!(error.offset, 4),
        other => panic!("expected a lexical error, got {:?}", other),
    }
}

#[test]
fn diagnostics_point_at_the_error() {
    let error = Parser::new("if then".to_string(), 7).parse().unwrap_err();
    let diagnostic = error.to_diagnostic(7);
    assert_eq!(diagnostic.labels.len(), 1);
    assert_eq!(diagnostic.labels[0].file_id, 7);
    assert_eq!(diagnostic.labels[0].range, 3..7);
}

#[test]
fn parse_tokens_matches_parse() {
    let source = "when flag clicked\nforever\n  move {10} steps :: motion\nend";
    let tokens = blocktext::tokenize(source).unwrap();
    let from_tokens = blocktext::parse_tokens(&tokens, 0).unwrap();
    assert_eq!(from_tokens, parse(source));
}

#[test]
fn parsing_is_deterministic() {
    let source = "if <a> then\n  say (x) :: variables\nelse\n  stop [all]\nend";
    assert_eq!(parse(source), parse(source));
}
