use blocktext::parser::error::LexicalError;
use blocktext::token::{Position, Token, TokenCategory, TokenKind};
use TokenKind::*;

fn tokens(source: &str) -> Vec<Token> {
    blocktext::tokenize(source).expect("tokenize failed")
}

fn kinds(source: &str) -> Vec<TokenKind> {
    tokens(source).into_iter().map(|t| t.kind).collect()
}

fn texts(source: &str) -> Vec<String> {
    tokens(source).into_iter().map(|t| t.text).collect()
}

fn lex_error(source: &str) -> LexicalError {
    blocktext::tokenize(source).expect_err("tokenize should fail")
}

#[test]
fn single_colon_stays_in_label() {
    assert_eq!(kinds("abc:def"), vec![Label]);
    assert_eq!(texts("abc:def"), vec!["abc:def"]);
}

#[test]
fn double_colon_splits_label() {
    assert_eq!(kinds("abc::def"), vec![Label, DoubleColon, Label]);
    assert_eq!(texts("abc::def"), vec!["abc", "::", "def"]);
}

#[test]
fn repeat_until_is_one_token() {
    assert_eq!(kinds("repeat until <done>"), vec![RepeatUntil, LAngle, Label, RAngle]);
    assert_eq!(kinds("REPEAT \t Until <done>")[0], RepeatUntil);
    assert_eq!(kinds("repeat {10}"), vec![Repeat, LCurly, NumberLiteral, RCurly]);
}

#[test]
fn plain_block_is_one_label() {
    assert_eq!(kinds("move 10 steps"), vec![Label]);
    assert_eq!(texts("move 10 steps"), vec!["move 10 steps"]);
}

#[test]
fn number_yields_to_longer_label() {
    assert_eq!(kinds("10 steps"), vec![Label]);
    assert_eq!(kinds("10"), vec![NumberLiteral]);
    assert_eq!(kinds("-3.5"), vec![NumberLiteral]);
    assert_eq!(kinds("{10}"), vec![LCurly, NumberLiteral, RCurly]);
    assert_eq!(kinds("2nd"), vec![Label]);
}

#[test]
fn literals() {
    assert_eq!(kinds(r#""hello \" world""#), vec![StringLiteral]);
    assert_eq!(kinds("#FF00aa"), vec![ColorLiteral]);
    assert_eq!(kinds("#f0a"), vec![ColorLiteral]);
    assert_eq!(kinds("[mouse-pointer]"), vec![ChoiceLiteral]);
    assert_eq!(kinds("[1][2][3]"), vec![ChoiceLiteral, ChoiceLiteral, ChoiceLiteral]);
    for kind in [StringLiteral, NumberLiteral, ColorLiteral, ChoiceLiteral] {
        assert!(kind.belongs_to(TokenCategory::Literal));
        assert!(!kind.belongs_to(TokenCategory::Keyword));
    }
}

#[test]
fn six_digit_color_preferred() {
    let tokens = tokens("#abcdef");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text, "#abcdef");
}

#[test]
fn keywords_are_case_insensitive() {
    assert_eq!(
        kinds("IF <a> THEN\nEnd"),
        vec![If, LAngle, Label, RAngle, Then, Delimiter, End]
    );
    assert_eq!(kinds("forever"), vec![Forever]);
    assert!(Else.belongs_to(TokenCategory::Keyword));
}

#[test]
fn keyword_prefix_falls_back_to_label() {
    assert_eq!(kinds("forevermore"), vec![Label]);
    assert_eq!(kinds("endless loop"), vec![Label]);
    assert_eq!(kinds("iffy"), vec![Label]);
}

#[test]
fn label_stops_before_clause_closer() {
    assert_eq!(
        kinds("move {10} steps end"),
        vec![Label, LCurly, NumberLiteral, RCurly, Label, End]
    );
    assert_eq!(kinds("say hi else think"), vec![Label, Else, Label]);
}

#[test]
fn escaped_clause_closer_stays_in_label() {
    assert_eq!(kinds("say something \\else"), vec![Label]);
    assert_eq!(texts("say the \\end"), vec!["say the \\end"]);
}

#[test]
fn comparison_inside_predicate() {
    assert_eq!(kinds("<x > 5>"), vec![LAngle, Label, RAngle]);
    assert_eq!(texts("<x > 5>")[1], "x > 5");
    assert_eq!(texts("<<a < b> and <c > d>>")[2], "a < b");
}

#[test]
fn spaced_angle_opens_predicate_outside_one() {
    assert_eq!(kinds("say < mouse down? >"), vec![Label, LAngle, Label, RAngle]);
    assert_eq!(texts("say < mouse down? >"), vec!["say", "<", "mouse down?", ">"]);
    assert_eq!(kinds("wait until < x > 5 >"), vec![Label, LAngle, Label, RAngle]);
    assert_eq!(texts("wait until < x > 5 >")[2], "x > 5");
}

#[test]
fn delimiters_collapse() {
    assert_eq!(kinds("a;b"), vec![Label, Delimiter, Label]);
    assert_eq!(kinds("a;  \nb"), vec![Label, Delimiter, Label]);
    assert_eq!(kinds("a\nb"), vec![Label, Delimiter, Label]);
    assert_eq!(texts("a;  \nb")[1], ";  \n");
}

#[test]
fn comments_are_discarded_remarks_kept() {
    assert_eq!(kinds("a // trailing\nb"), vec![Label, Delimiter, Label]);
    assert_eq!(kinds("a /* spans\nlines */ b"), vec![Label, Label]);
    assert_eq!(kinds("a |note|"), vec![Label, Comment]);
}

#[test]
fn escapes_inside_label() {
    assert_eq!(kinds(r"say \{hi\}"), vec![Label]);
    let tokens = tokens("say \\\nmore");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].line_breaks, 1);
}

#[test]
fn identifiers_and_punctuation() {
    assert_eq!(
        kinds("(a) <b> {c @x_1}"),
        vec![LRound, Label, RRound, LAngle, Label, RAngle, LCurly, Label, Id, RCurly]
    );
}

#[test]
fn positions_are_one_based() {
    let tokens = tokens("move\n  turn {15}");
    assert_eq!(tokens[0].position, Position { line: 1, column: 1 });
    assert_eq!(tokens[2].position, Position { line: 2, column: 3 });
    assert_eq!(tokens[2].span, 7..11);
}

#[test]
fn unterminated_string_reports_opening_quote() {
    let error = lex_error("say \"abc");
    assert_eq!(error.offset, 4);
    assert_eq!(error.position, Position { line: 1, column: 5 });
    assert_eq!(error.remainder, "\"abc");
}

#[test]
fn unterminated_remark_and_block_comment_fail() {
    let error = lex_error("move |open remark");
    assert_eq!(error.offset, 5);
    let error = lex_error("a /* never closed");
    assert_eq!(error.offset, 2);
}

#[test]
fn tokenizing_is_deterministic() {
    let source = "when flag clicked\nforever\n  move {10} steps :: motion\nend";
    assert_eq!(tokens(source), tokens(source));
}
