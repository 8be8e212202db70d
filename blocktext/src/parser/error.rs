use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

use crate::grammar::RuleName;
use crate::token::{Position, Token, TokenKind};

/// The production-rule set failed self-validation. Raised once, before any input is parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    DuplicateRule(RuleName),
    /// `referenced_by` is `None` when the missing rule is the start rule.
    UndefinedRule {
        rule: RuleName,
        referenced_by: Option<RuleName>,
    },
    /// A cycle of rules reachable from themselves without consuming a token.
    LeftRecursion(Vec<RuleName>),
    /// A repetition whose body can match without consuming a token.
    EmptyLoop(RuleName),
    /// Two alternatives of a choice share lead tokens.
    AmbiguousChoice {
        rule: RuleName,
        overlap: Vec<TokenKind>,
    },
    /// More than one alternative of a choice can match nothing.
    NullableAlternatives(RuleName),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::DuplicateRule(rule) => {
                write!(f, "grammar rule `{}` is defined more than once", rule)
            }
            ConfigurationError::UndefinedRule {
                rule,
                referenced_by: Some(parent),
            } => write!(
                f,
                "grammar rule `{}` references undefined rule `{}`",
                parent, rule
            ),
            ConfigurationError::UndefinedRule {
                rule,
                referenced_by: None,
            } => write!(f, "start rule `{}` is not defined", rule),
            ConfigurationError::LeftRecursion(cycle) => {
                let names: Vec<String> = cycle.iter().map(|r| r.to_string()).collect();
                write!(f, "left recursion: {}", names.join(" -> "))
            }
            ConfigurationError::EmptyLoop(rule) => write!(
                f,
                "grammar rule `{}` repeats a body that can match without consuming input",
                rule
            ),
            ConfigurationError::AmbiguousChoice { rule, overlap } => write!(
                f,
                "ambiguous alternatives in grammar rule `{}`: both can start with {}",
                rule,
                join_kinds(overlap)
            ),
            ConfigurationError::NullableAlternatives(rule) => write!(
                f,
                "ambiguous alternatives in grammar rule `{}`: more than one can match nothing",
                rule
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// No token kind matches at some input position.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalError {
    /// Byte offset of the offending position.
    pub offset: usize,
    pub position: Position,
    /// Unmatched input from `offset` to the end of the source.
    pub remainder: String,
}

impl LexicalError {
    pub fn span(&self) -> Range<usize> {
        let width = self.remainder.chars().next().map_or(0, char::len_utf8);
        self.offset..self.offset + width
    }

    fn excerpt(&self) -> String {
        let line = self.remainder.lines().next().unwrap_or("");
        let mut excerpt: String = line.chars().take(24).collect();
        if excerpt.len() < line.len() {
            excerpt.push_str("...");
        }
        excerpt
    }
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unrecognized input at {}:{}: `{}`",
            self.position.line,
            self.position.column,
            self.excerpt()
        )
    }
}

impl std::error::Error for LexicalError {}

/// The token sequence does not match the grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    /// The rule being parsed when the mismatch was found.
    pub rule: RuleName,
    /// Token kinds accepted at the failure point.
    pub expected: Vec<TokenKind>,
    /// End of input would also have been accepted.
    pub end_of_input: bool,
    /// `None` at end of input.
    pub found: Option<Token>,
    pub span: Range<usize>,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found = match &self.found {
            Some(token) => token.to_string(),
            None => "end of input".to_string(),
        };
        let mut accepted: Vec<String> = self.expected.iter().map(|k| k.to_string()).collect();
        if self.end_of_input {
            accepted.push("end of input".to_string());
        }
        let accepted = match accepted.as_slice() {
            [] => "nothing".to_string(),
            [only] => only.clone(),
            _ => format!("one of {}", accepted.join(", ")),
        };
        if self.expected.is_empty() {
            write!(f, "expected {}, found {}", accepted, found)
        } else {
            write!(f, "expected {} in {}, found {}", accepted, self.rule, found)
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Blocks or brackets nested deeper than the parser allows.
#[derive(Debug, Clone, PartialEq)]
pub struct NestingError {
    /// The rule that would have opened one level too many.
    pub rule: RuleName,
    pub limit: usize,
    /// `None` at end of input.
    pub found: Option<Token>,
    pub span: Range<usize>,
}

impl fmt::Display for NestingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} nested more than {} levels deep", self.rule, self.limit)
    }
}

impl std::error::Error for NestingError {}

/// Terminal failure of a tokenize + parse call.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Configuration(ConfigurationError),
    Lexical(LexicalError),
    Syntax(SyntaxError),
    Nesting(NestingError),
}

impl ParseError {
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            ParseError::Configuration(_) => None,
            ParseError::Lexical(error) => Some(error.span()),
            ParseError::Syntax(error) => Some(error.span.clone()),
            ParseError::Nesting(error) => Some(error.span.clone()),
        }
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        let diagnostic = Diagnostic::error().with_message(self.to_string());
        match self {
            ParseError::Configuration(_) => {
                diagnostic.with_notes(vec!["the built-in grammar is inconsistent".to_string()])
            }
            ParseError::Lexical(error) => diagnostic.with_labels(vec![
                Label::primary(file_id, error.span()).with_message("no token matches here"),
            ]),
            ParseError::Syntax(error) => {
                let message = match &error.found {
                    Some(_) => "unexpected token",
                    None => "unexpected end of input",
                };
                diagnostic.with_labels(vec![
                    Label::primary(file_id, error.span.clone()).with_message(message),
                ])
            }
            ParseError::Nesting(error) => diagnostic.with_labels(vec![
                Label::primary(file_id, error.span.clone())
                    .with_message("nesting limit reached here"),
            ]),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Configuration(error) => write!(f, "invalid grammar: {}", error),
            ParseError::Lexical(error) => error.fmt(f),
            ParseError::Syntax(error) => error.fmt(f),
            ParseError::Nesting(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ConfigurationError> for ParseError {
    fn from(error: ConfigurationError) -> Self {
        ParseError::Configuration(error)
    }
}

impl From<LexicalError> for ParseError {
    fn from(error: LexicalError) -> Self {
        ParseError::Lexical(error)
    }
}

impl From<NestingError> for ParseError {
    fn from(error: NestingError) -> Self {
        ParseError::Nesting(error)
    }
}

impl From<SyntaxError> for ParseError {
    fn from(error: SyntaxError) -> Self {
        ParseError::Syntax(error)
    }
}

fn join_kinds(kinds: &[TokenKind]) -> String {
    match kinds {
        [] => "nothing".to_string(),
        [only] => only.to_string(),
        _ => {
            let names: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
            format!("one of {}", names.join(", "))
        }
    }
}
