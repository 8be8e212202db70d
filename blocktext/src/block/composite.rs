use std::ops::Range;

use crate::block::{Annotations, Argument, Atomic, Block, Condition};
use crate::stack::Stack;
use crate::token::Token;

/// A control-structure block.
#[derive(Debug, Clone, PartialEq)]
pub enum Composite {
    IfElse(IfElse),
    Forever(Forever),
    Repeat(Repeat),
    RepeatUntil(RepeatUntil),
}

impl Composite {
    pub fn span(&self) -> Range<usize> {
        match self {
            Composite::IfElse(block) => block.span.clone(),
            Composite::Forever(block) => block.span.clone(),
            Composite::Repeat(block) => block.span.clone(),
            Composite::RepeatUntil(block) => block.span.clone(),
        }
    }

    pub fn annotations(&self) -> Option<&Annotations> {
        match self {
            Composite::IfElse(block) => block.annotations.as_ref(),
            Composite::Forever(block) => block.annotations.as_ref(),
            Composite::Repeat(block) => block.annotations.as_ref(),
            Composite::RepeatUntil(block) => block.annotations.as_ref(),
        }
    }

    /// The bodies of this block, in source order.
    pub fn clauses(&self) -> Vec<&Clause> {
        match self {
            Composite::IfElse(block) => {
                let mut clauses = vec![&block.then_clause];
                if let Some(branch) = &block.else_branch {
                    clauses.push(&branch.clause);
                }
                clauses
            }
            Composite::Forever(block) => vec![&block.body],
            Composite::Repeat(block) => vec![&block.body],
            Composite::RepeatUntil(block) => vec![&block.body],
        }
    }

    pub(crate) fn collect_atomics<'a>(&'a self, out: &mut Vec<&'a Atomic>) {
        match self {
            Composite::IfElse(block) => block.condition.collect_atomics(out),
            Composite::Repeat(block) => block.count.collect_atomics(out),
            Composite::RepeatUntil(block) => block.condition.collect_atomics(out),
            Composite::Forever(_) => {}
        }
        for clause in self.clauses() {
            if let Some(stack) = &clause.body {
                stack.collect_atomics(out);
            }
        }
    }
}

/// `if <cond> then? ... (else ...)?`
#[derive(Debug, Clone, PartialEq)]
pub struct IfElse {
    pub keyword: Token,
    pub condition: Condition,
    pub then: Option<Token>,
    pub annotations: Option<Annotations>,
    pub then_clause: Clause,
    pub else_branch: Option<ElseBranch>,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseBranch {
    pub keyword: Token,
    pub clause: Clause,
}

/// `forever ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Forever {
    pub keyword: Token,
    pub annotations: Option<Annotations>,
    pub body: Clause,
    pub span: Range<usize>,
}

/// `repeat {n} ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Repeat {
    pub keyword: Token,
    pub count: Argument,
    pub annotations: Option<Annotations>,
    pub body: Clause,
    pub span: Range<usize>,
}

/// `repeat until <cond> ...`
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatUntil {
    pub keyword: Token,
    pub condition: Condition,
    pub annotations: Option<Annotations>,
    pub body: Clause,
    pub span: Range<usize>,
}

/// The body of a control structure. Every part is optional: an empty body is
/// valid and the closing `end` may be left implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub delimiter: Option<Token>,
    pub body: Option<Stack>,
    pub end: Option<Token>,
}

impl Clause {
    pub fn is_empty(&self) -> bool {
        self.body.is_none()
    }

    pub fn blocks(&self) -> &[Block] {
        match &self.body {
            Some(stack) => &stack.blocks,
            None => &[],
        }
    }

    /// Byte span of whatever the clause consumed, if anything.
    pub fn span(&self) -> Option<Range<usize>> {
        let start = self
            .delimiter
            .as_ref()
            .map(|t| t.span.start)
            .or_else(|| self.body.as_ref().map(|s| s.span.start))
            .or_else(|| self.end.as_ref().map(|t| t.span.start))?;
        let end = self
            .end
            .as_ref()
            .map(|t| t.span.end)
            .or_else(|| self.body.as_ref().map(|s| s.span.end))
            .or_else(|| self.delimiter.as_ref().map(|t| t.span.end))?;
        Some(start..end)
    }
}
