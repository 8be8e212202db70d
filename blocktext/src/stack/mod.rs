use std::ops::Range;

use crate::block::{Atomic, Block};
use crate::token::Token;

/// A non-empty sequence of blocks separated by delimiters.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub blocks: Vec<Block>,
    pub span: Range<usize>,
}

impl Stack {
    pub(crate) fn collect_atomics<'a>(&'a self, out: &mut Vec<&'a Atomic>) {
        for block in &self.blocks {
            block.collect_atomics(out);
        }
    }
}

/// A run of remark tokens, possibly separated by delimiters.
#[derive(Debug, Clone, PartialEq)]
pub struct Comments {
    pub remarks: Vec<Token>,
    pub span: Range<usize>,
}

/// Top-level content after the leading comments.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Stack(Stack),
    Comments(Comments),
}
