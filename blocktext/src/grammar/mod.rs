//! Declarative production rules of the notation.
//!
//! The recursive-descent parser in [`crate::parser`] is hand-written, but every
//! lookahead decision it makes is answered from the [`GrammarTable`] built from
//! these rules. The table is validated once per process, before first use.

mod table;

use std::fmt;
use std::sync::LazyLock;

pub use table::GrammarTable;

use crate::parser::error::ConfigurationError;
use crate::token::{TokenCategory, TokenKind};

/// Nonterminals of the notation grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleName {
    Code,
    Comments,
    Stack,
    Block,
    Atomic,
    Composite,
    IfElse,
    Forever,
    Repeat,
    RepeatUntil,
    Clause,
    Modifier,
    Annotations,
    Argument,
    Condition,
    Expression,
    Predicate,
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleName::Code => "code",
            RuleName::Comments => "comments",
            RuleName::Stack => "stack",
            RuleName::Block => "block",
            RuleName::Atomic => "atomic",
            RuleName::Composite => "composite",
            RuleName::IfElse => "ifelse",
            RuleName::Forever => "forever",
            RuleName::Repeat => "repeat",
            RuleName::RepeatUntil => "repeatuntil",
            RuleName::Clause => "clause",
            RuleName::Modifier => "modifier",
            RuleName::Annotations => "annotations",
            RuleName::Argument => "argument",
            RuleName::Condition => "condition",
            RuleName::Expression => "expression",
            RuleName::Predicate => "predicate",
        };
        f.write_str(name)
    }
}

/// Something a production can match: a concrete token kind or any member of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Kind(TokenKind),
    Category(TokenCategory),
}

impl Terminal {
    pub fn kinds(&self) -> &[TokenKind] {
        match self {
            Terminal::Kind(kind) => std::slice::from_ref(kind),
            Terminal::Category(category) => category.kinds(),
        }
    }
}

/// Right-hand side of a rule. Choices are ordered.
#[derive(Debug, Clone, PartialEq)]
pub enum Production {
    Terminal(Terminal),
    Rule(RuleName),
    Seq(Vec<Production>),
    Choice(Vec<Production>),
    Optional(Box<Production>),
    Many(Box<Production>),
    AtLeastOne(Box<Production>),
}

impl Production {
    pub fn token(kind: TokenKind) -> Self {
        Production::Terminal(Terminal::Kind(kind))
    }

    pub fn category(category: TokenCategory) -> Self {
        Production::Terminal(Terminal::Category(category))
    }

    pub fn rule(name: RuleName) -> Self {
        Production::Rule(name)
    }

    pub fn seq(parts: Vec<Production>) -> Self {
        Production::Seq(parts)
    }

    pub fn choice(alternatives: Vec<Production>) -> Self {
        Production::Choice(alternatives)
    }

    pub fn optional(inner: Production) -> Self {
        Production::Optional(Box::new(inner))
    }

    pub fn many(inner: Production) -> Self {
        Production::Many(Box::new(inner))
    }

    pub fn at_least_one(inner: Production) -> Self {
        Production::AtLeastOne(Box::new(inner))
    }
}

/// The production rules of the notation, start rule first.
pub fn notation_rules() -> Vec<(RuleName, Production)> {
    use Production as P;
    use RuleName as R;
    use TokenKind as K;

    vec![
        (
            R::Code,
            P::seq(vec![
                P::many(P::token(K::Delimiter)),
                P::optional(P::rule(R::Comments)),
                P::optional(P::seq(vec![
                    P::rule(R::Stack),
                    P::many(P::seq(vec![
                        P::at_least_one(P::choice(vec![
                            P::token(K::Delimiter),
                            P::rule(R::Comments),
                        ])),
                        P::optional(P::rule(R::Stack)),
                    ])),
                ])),
            ]),
        ),
        (
            R::Comments,
            P::at_least_one(P::seq(vec![
                P::token(K::Comment),
                P::many(P::token(K::Delimiter)),
            ])),
        ),
        (
            R::Stack,
            P::seq(vec![
                P::rule(R::Block),
                P::many(P::seq(vec![P::token(K::Delimiter), P::rule(R::Block)])),
                P::optional(P::token(K::Delimiter)),
            ]),
        ),
        (
            R::Block,
            P::choice(vec![P::rule(R::Atomic), P::rule(R::Composite)]),
        ),
        (
            R::Atomic,
            P::seq(vec![
                P::at_least_one(P::choice(vec![
                    P::token(K::Label),
                    P::rule(R::Argument),
                ])),
                P::rule(R::Modifier),
                P::rule(R::Annotations),
            ]),
        ),
        (
            R::Composite,
            P::choice(vec![
                P::rule(R::IfElse),
                P::rule(R::Forever),
                P::rule(R::Repeat),
                P::rule(R::RepeatUntil),
            ]),
        ),
        (
            R::IfElse,
            P::seq(vec![
                P::token(K::If),
                P::rule(R::Condition),
                P::optional(P::token(K::Then)),
                P::rule(R::Annotations),
                P::rule(R::Clause),
                P::optional(P::seq(vec![P::token(K::Else), P::rule(R::Clause)])),
            ]),
        ),
        (
            R::Forever,
            P::seq(vec![
                P::token(K::Forever),
                P::rule(R::Annotations),
                P::rule(R::Clause),
            ]),
        ),
        (
            R::Repeat,
            P::seq(vec![
                P::token(K::Repeat),
                P::rule(R::Argument),
                P::rule(R::Annotations),
                P::rule(R::Clause),
            ]),
        ),
        (
            R::RepeatUntil,
            P::seq(vec![
                P::token(K::RepeatUntil),
                P::rule(R::Condition),
                P::rule(R::Annotations),
                P::rule(R::Clause),
            ]),
        ),
        (
            R::Clause,
            P::seq(vec![
                P::optional(P::token(K::Delimiter)),
                P::optional(P::rule(R::Stack)),
                P::optional(P::token(K::End)),
            ]),
        ),
        (
            R::Modifier,
            P::optional(P::seq(vec![P::token(K::DoubleColon), P::token(K::Label)])),
        ),
        (
            R::Annotations,
            P::optional(P::choice(vec![
                P::seq(vec![P::token(K::Comment), P::optional(P::token(K::Id))]),
                P::seq(vec![P::token(K::Id), P::optional(P::token(K::Comment))]),
            ])),
        ),
        (
            R::Argument,
            P::choice(vec![
                P::seq(vec![
                    P::token(K::LCurly),
                    P::optional(P::choice(vec![
                        P::category(TokenCategory::Literal),
                        P::rule(R::Expression),
                        P::rule(R::Predicate),
                    ])),
                    P::optional(P::token(K::Id)),
                    P::token(K::RCurly),
                ]),
                P::category(TokenCategory::Literal),
                P::rule(R::Expression),
                P::rule(R::Predicate),
            ]),
        ),
        (
            R::Condition,
            P::choice(vec![
                P::seq(vec![
                    P::token(K::LCurly),
                    P::optional(P::rule(R::Predicate)),
                    P::optional(P::token(K::Id)),
                    P::token(K::RCurly),
                ]),
                P::rule(R::Predicate),
            ]),
        ),
        (
            R::Expression,
            P::seq(vec![
                P::token(K::LRound),
                P::optional(P::rule(R::Atomic)),
                P::token(K::RRound),
            ]),
        ),
        (
            R::Predicate,
            P::seq(vec![
                P::token(K::LAngle),
                P::optional(P::rule(R::Atomic)),
                P::token(K::RAngle),
            ]),
        ),
    ]
}

static NOTATION: LazyLock<Result<GrammarTable, ConfigurationError>> =
    LazyLock::new(|| GrammarTable::build(RuleName::Code, notation_rules()));

/// The validated notation grammar, built on first use and shared read-only afterwards.
pub fn notation() -> Result<&'static GrammarTable, ConfigurationError> {
    NOTATION.as_ref().map_err(Clone::clone)
}

/// Force grammar validation now instead of on the first parse.
pub fn validate() -> Result<(), ConfigurationError> {
    notation().map(|_| ())
}
