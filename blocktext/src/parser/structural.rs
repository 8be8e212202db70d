//! Script structure: code, comment runs, stacks, blocks and control structures.

use crate::Code;
use crate::block::{Block, Clause, Composite, ElseBranch, Forever, IfElse, Repeat, RepeatUntil};
use crate::grammar::RuleName;
use crate::parser::Cursor;
use crate::parser::error::ParseError;
use crate::stack::{Comments, Segment, Stack};
use crate::token::TokenKind;

impl Cursor<'_> {
    /// `Delimiter* comments? (stack (Delimiter | comments)+ stack?)*`, then end of input.
    pub(super) fn parse_code(&mut self, source_id: usize) -> Result<Code, ParseError> {
        let start = self.start();

        while self.eat(TokenKind::Delimiter).is_some() {}

        let comments = if self.at_rule(RuleName::Comments) {
            Some(self.parse_comments()?)
        } else {
            None
        };

        let mut segments = Vec::new();
        if self.at_rule(RuleName::Stack) {
            segments.push(Segment::Stack(self.parse_stack()?));

            while self.at_separator() {
                while self.at_separator() {
                    if self.eat(TokenKind::Delimiter).is_none() {
                        segments.push(Segment::Comments(self.parse_comments()?));
                    }
                }
                if self.at_rule(RuleName::Stack) {
                    segments.push(Segment::Stack(self.parse_stack()?));
                }
            }
        }

        if self.peek().is_some() {
            return Err(self.leftover_error());
        }

        Ok(Code {
            comments,
            segments,
            span: start..self.prev_end.max(start),
            source_id,
        })
    }

    fn at_separator(&mut self) -> bool {
        self.at(TokenKind::Delimiter) || self.at_rule(RuleName::Comments)
    }

    /// `(Comment Delimiter*)+`
    fn parse_comments(&mut self) -> Result<Comments, ParseError> {
        let start = self.start();
        let mut remarks = vec![self.expect(RuleName::Comments, TokenKind::Comment)?];
        let mut end = self.prev_end;
        loop {
            while self.eat(TokenKind::Delimiter).is_some() {}
            match self.eat(TokenKind::Comment) {
                Some(remark) => {
                    end = remark.span.end;
                    remarks.push(remark);
                }
                None => break,
            }
        }
        Ok(Comments {
            remarks,
            span: start..end,
        })
    }

    /// `block (Delimiter block)* Delimiter?`
    pub(super) fn parse_stack(&mut self) -> Result<Stack, ParseError> {
        let start = self.start();
        let mut blocks = vec![self.parse_block()?];
        while self.at(TokenKind::Delimiter) && self.rule_at(1, RuleName::Block) {
            self.advance();
            blocks.push(self.parse_block()?);
        }
        let end = self.prev_end;
        self.eat(TokenKind::Delimiter);
        Ok(Stack {
            blocks,
            span: start..end,
        })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        if self.at_rule(RuleName::Atomic) {
            Ok(Block::Atomic(self.parse_atomic()?))
        } else if self.at_rule(RuleName::Composite) {
            Ok(Block::Composite(self.parse_composite()?))
        } else {
            Err(self.error(RuleName::Block, self.grammar.first(RuleName::Block)))
        }
    }

    fn parse_composite(&mut self) -> Result<Composite, ParseError> {
        if self.at_rule(RuleName::IfElse) {
            Ok(Composite::IfElse(self.parse_if_else()?))
        } else if self.at_rule(RuleName::Forever) {
            Ok(Composite::Forever(self.parse_forever()?))
        } else if self.at_rule(RuleName::Repeat) {
            Ok(Composite::Repeat(self.parse_repeat()?))
        } else if self.at_rule(RuleName::RepeatUntil) {
            Ok(Composite::RepeatUntil(self.parse_repeat_until()?))
        } else {
            Err(self.error(RuleName::Composite, self.grammar.first(RuleName::Composite)))
        }
    }

    /// `if condition then? annotations clause (else clause)?`
    fn parse_if_else(&mut self) -> Result<IfElse, ParseError> {
        let start = self.start();
        let keyword = self.expect(RuleName::IfElse, TokenKind::If)?;
        let condition = self.parse_condition()?;
        let then = self.eat(TokenKind::Then);
        let annotations = self.parse_annotations();
        let then_clause = self.parse_clause()?;
        let else_branch = match self.eat(TokenKind::Else) {
            Some(keyword) => Some(ElseBranch {
                keyword,
                clause: self.parse_clause()?,
            }),
            None => None,
        };
        Ok(IfElse {
            keyword,
            condition,
            then,
            annotations,
            then_clause,
            else_branch,
            span: start..self.prev_end,
        })
    }

    /// `forever annotations clause`
    fn parse_forever(&mut self) -> Result<Forever, ParseError> {
        let start = self.start();
        let keyword = self.expect(RuleName::Forever, TokenKind::Forever)?;
        let annotations = self.parse_annotations();
        let body = self.parse_clause()?;
        Ok(Forever {
            keyword,
            annotations,
            body,
            span: start..self.prev_end,
        })
    }

    /// `repeat argument annotations clause`
    fn parse_repeat(&mut self) -> Result<Repeat, ParseError> {
        let start = self.start();
        let keyword = self.expect(RuleName::Repeat, TokenKind::Repeat)?;
        let count = self.parse_argument()?;
        let annotations = self.parse_annotations();
        let body = self.parse_clause()?;
        Ok(Repeat {
            keyword,
            count,
            annotations,
            body,
            span: start..self.prev_end,
        })
    }

    /// `repeat until condition annotations clause`
    fn parse_repeat_until(&mut self) -> Result<RepeatUntil, ParseError> {
        let start = self.start();
        let keyword = self.expect(RuleName::RepeatUntil, TokenKind::RepeatUntil)?;
        let condition = self.parse_condition()?;
        let annotations = self.parse_annotations();
        let body = self.parse_clause()?;
        Ok(RepeatUntil {
            keyword,
            condition,
            annotations,
            body,
            span: start..self.prev_end,
        })
    }

    /// `Delimiter? stack? end?`
    fn parse_clause(&mut self) -> Result<Clause, ParseError> {
        self.nested(RuleName::Clause, |cursor| {
            let delimiter = cursor.eat(TokenKind::Delimiter);
            let body = if cursor.at_rule(RuleName::Stack) {
                Some(cursor.parse_stack()?)
            } else {
                None
            };
            let end = cursor.eat(TokenKind::End);
            Ok(Clause {
                delimiter,
                body,
                end,
            })
        })
    }
}
