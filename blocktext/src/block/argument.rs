use std::ops::Range;

use crate::block::Atomic;
use crate::token::Token;

/// A value embedded in a block: a literal or a bracketed sub-block.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Any `Literal` token: string, number, color or choice.
    Literal(Token),
    Expression(Expression),
    Predicate(Predicate),
}

impl Value {
    pub fn span(&self) -> Range<usize> {
        match self {
            Value::Literal(token) => token.span.clone(),
            Value::Expression(expression) => expression.span(),
            Value::Predicate(predicate) => predicate.span(),
        }
    }

    fn collect_atomics<'a>(&'a self, out: &mut Vec<&'a Atomic>) {
        match self {
            Value::Literal(_) => {}
            Value::Expression(expression) => expression.collect_atomics(out),
            Value::Predicate(predicate) => predicate.collect_atomics(out),
        }
    }
}

/// An argument slot of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// `{ value? @id? }`
    Curly {
        open: Token,
        value: Option<Value>,
        id: Option<Token>,
        close: Token,
    },
    /// A literal, expression or predicate written without braces.
    Bare(Value),
}

impl Argument {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Argument::Curly { value, .. } => value.as_ref(),
            Argument::Bare(value) => Some(value),
        }
    }

    pub fn id(&self) -> Option<&Token> {
        match self {
            Argument::Curly { id, .. } => id.as_ref(),
            Argument::Bare(_) => None,
        }
    }

    pub fn span(&self) -> Range<usize> {
        match self {
            Argument::Curly { open, close, .. } => open.span.start..close.span.end,
            Argument::Bare(value) => value.span(),
        }
    }

    pub(crate) fn collect_atomics<'a>(&'a self, out: &mut Vec<&'a Atomic>) {
        if let Some(value) = self.value() {
            value.collect_atomics(out);
        }
    }
}

/// The condition of `if` and `repeat until`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `{ <predicate>? @id? }`
    Curly {
        open: Token,
        predicate: Option<Predicate>,
        id: Option<Token>,
        close: Token,
    },
    Bare(Predicate),
}

impl Condition {
    pub fn predicate(&self) -> Option<&Predicate> {
        match self {
            Condition::Curly { predicate, .. } => predicate.as_ref(),
            Condition::Bare(predicate) => Some(predicate),
        }
    }

    pub fn span(&self) -> Range<usize> {
        match self {
            Condition::Curly { open, close, .. } => open.span.start..close.span.end,
            Condition::Bare(predicate) => predicate.span(),
        }
    }

    pub(crate) fn collect_atomics<'a>(&'a self, out: &mut Vec<&'a Atomic>) {
        if let Some(predicate) = self.predicate() {
            predicate.collect_atomics(out);
        }
    }
}

/// `( atomic? )` -- a value-valued sub-block.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub open: Token,
    pub atomic: Option<Atomic>,
    pub close: Token,
}

impl Expression {
    pub fn span(&self) -> Range<usize> {
        self.open.span.start..self.close.span.end
    }

    fn collect_atomics<'a>(&'a self, out: &mut Vec<&'a Atomic>) {
        if let Some(atomic) = &self.atomic {
            atomic.collect_atomics(out);
        }
    }
}

/// `< atomic? >` -- a boolean-valued sub-block.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub open: Token,
    pub atomic: Option<Atomic>,
    pub close: Token,
}

impl Predicate {
    pub fn span(&self) -> Range<usize> {
        self.open.span.start..self.close.span.end
    }

    fn collect_atomics<'a>(&'a self, out: &mut Vec<&'a Atomic>) {
        if let Some(atomic) = &self.atomic {
            atomic.collect_atomics(out);
        }
    }
}
