pub mod argument;
pub mod composite;

use std::ops::Range;

use crate::token::Token;

pub use argument::{Argument, Condition, Expression, Predicate, Value};
pub use composite::{Clause, Composite, ElseBranch, Forever, IfElse, Repeat, RepeatUntil};

/// A script block: either a leaf or a control structure owning nested bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Atomic(Atomic),
    Composite(Composite),
}

impl Block {
    pub fn span(&self) -> Range<usize> {
        match self {
            Block::Atomic(atomic) => atomic.span.clone(),
            Block::Composite(composite) => composite.span(),
        }
    }

    pub(crate) fn collect_atomics<'a>(&'a self, out: &mut Vec<&'a Atomic>) {
        match self {
            Block::Atomic(atomic) => atomic.collect_atomics(out),
            Block::Composite(composite) => composite.collect_atomics(out),
        }
    }
}

/// One element of an atomic block's text.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomicElement {
    Label(Token),
    Argument(Argument),
}

/// A leaf block: free-text labels interleaved with arguments, e.g. `move {10} steps`.
#[derive(Debug, Clone, PartialEq)]
pub struct Atomic {
    /// Never empty.
    pub elements: Vec<AtomicElement>,
    pub modifier: Option<Modifier>,
    pub annotations: Option<Annotations>,
    /// Byte span in source, modifier and annotations included.
    pub span: Range<usize>,
}

impl Atomic {
    pub fn labels(&self) -> impl Iterator<Item = &Token> {
        self.elements.iter().filter_map(|element| match element {
            AtomicElement::Label(token) => Some(token),
            AtomicElement::Argument(_) => None,
        })
    }

    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.elements.iter().filter_map(|element| match element {
            AtomicElement::Argument(argument) => Some(argument),
            AtomicElement::Label(_) => None,
        })
    }

    /// The block's labels joined by spaces, each argument rendered as `_`.
    pub fn label_text(&self) -> String {
        let parts: Vec<&str> = self
            .elements
            .iter()
            .map(|element| match element {
                AtomicElement::Label(token) => token.text.as_str(),
                AtomicElement::Argument(_) => "_",
            })
            .collect();
        parts.join(" ")
    }

    pub(crate) fn collect_atomics<'a>(&'a self, out: &mut Vec<&'a Atomic>) {
        out.push(self);
        for argument in self.arguments() {
            argument.collect_atomics(out);
        }
    }
}

/// `:: name` suffix naming a semantic classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    /// The `::` token.
    pub marker: Token,
    pub label: Token,
}

impl Modifier {
    pub fn name(&self) -> &str {
        &self.label.text
    }

    pub fn span(&self) -> Range<usize> {
        self.marker.span.start..self.label.span.end
    }
}

/// A remark and/or identifier attached to a block, in either order.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotations {
    /// `|remark| @id`
    Remark { comment: Token, id: Option<Token> },
    /// `@id |remark|`
    Identified { id: Token, comment: Option<Token> },
}

impl Annotations {
    pub fn comment(&self) -> Option<&Token> {
        match self {
            Annotations::Remark { comment, .. } => Some(comment),
            Annotations::Identified { comment, .. } => comment.as_ref(),
        }
    }

    pub fn id(&self) -> Option<&Token> {
        match self {
            Annotations::Remark { id, .. } => id.as_ref(),
            Annotations::Identified { id, .. } => Some(id),
        }
    }
}
