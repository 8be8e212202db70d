pub mod block;
pub mod grammar;
pub mod parser;
pub mod stack;
pub mod token;

use std::ops::Range;

use crate::block::Atomic;
use crate::stack::{Comments, Segment, Stack};

pub use crate::parser::lexer::tokenize;
pub use crate::parser::{ParseError, Parser, parse_tokens};

/// A parsed script.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    /// Remarks preceding the first stack.
    pub comments: Option<Comments>,
    /// Stacks and comment runs, in source order.
    pub segments: Vec<Segment>,
    pub span: Range<usize>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

impl Code {
    pub fn stacks(&self) -> impl Iterator<Item = &Stack> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Stack(stack) => Some(stack),
            Segment::Comments(_) => None,
        })
    }

    /// Every atomic block in the script, depth-first in source order. A block
    /// comes before the blocks nested in its arguments, and control structures
    /// contribute their condition before their bodies.
    pub fn atomic_blocks(&self) -> Vec<&Atomic> {
        let mut out = Vec::new();
        for stack in self.stacks() {
            stack.collect_atomics(&mut out);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
