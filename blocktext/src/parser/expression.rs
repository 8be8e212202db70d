//! Atomic blocks and the values nested inside them.

use crate::block::{
    Annotations, Argument, Atomic, AtomicElement, Condition, Expression, Modifier, Predicate,
    Value,
};
use crate::grammar::RuleName;
use crate::parser::Cursor;
use crate::parser::error::ParseError;
use crate::token::{TokenCategory, TokenKind};

impl Cursor<'_> {
    /// `(Label | argument)+ modifier annotations`
    pub(super) fn parse_atomic(&mut self) -> Result<Atomic, ParseError> {
        let start = self.start();
        let mut elements = Vec::new();
        loop {
            if let Some(label) = self.eat(TokenKind::Label) {
                elements.push(AtomicElement::Label(label));
            } else if self.at_rule(RuleName::Argument) {
                elements.push(AtomicElement::Argument(self.parse_argument()?));
            } else {
                break;
            }
        }
        if elements.is_empty() {
            return Err(self.error(RuleName::Atomic, self.grammar.first(RuleName::Atomic)));
        }

        let modifier = self.parse_modifier()?;
        let annotations = self.parse_annotations();

        Ok(Atomic {
            elements,
            modifier,
            annotations,
            span: start..self.prev_end,
        })
    }

    fn parse_modifier(&mut self) -> Result<Option<Modifier>, ParseError> {
        let Some(marker) = self.eat(TokenKind::DoubleColon) else {
            return Ok(None);
        };
        let label = self.expect(RuleName::Modifier, TokenKind::Label)?;
        Ok(Some(Modifier { marker, label }))
    }

    /// `(Comment Id? | Id Comment?)?`
    pub(super) fn parse_annotations(&mut self) -> Option<Annotations> {
        if let Some(comment) = self.eat(TokenKind::Comment) {
            let id = self.eat(TokenKind::Id);
            Some(Annotations::Remark { comment, id })
        } else if let Some(id) = self.eat(TokenKind::Id) {
            let comment = self.eat(TokenKind::Comment);
            Some(Annotations::Identified { id, comment })
        } else {
            None
        }
    }

    /// `{ value? Id? }` or a bare value.
    pub(super) fn parse_argument(&mut self) -> Result<Argument, ParseError> {
        if let Some(open) = self.eat(TokenKind::LCurly) {
            let value = if self.at_value() {
                Some(self.parse_value()?)
            } else {
                None
            };
            let id = self.eat(TokenKind::Id);
            let close = self.expect(RuleName::Argument, TokenKind::RCurly)?;
            return Ok(Argument::Curly {
                open,
                value,
                id,
                close,
            });
        }

        if self.at_value() {
            return Ok(Argument::Bare(self.parse_value()?));
        }

        Err(self.error(RuleName::Argument, self.grammar.first(RuleName::Argument)))
    }

    fn at_value(&mut self) -> bool {
        self.note(self.pos, TokenCategory::Literal.kinds().iter().copied());
        self.peek()
            .is_some_and(|token| token.belongs_to(TokenCategory::Literal))
            || self.at_rule(RuleName::Expression)
            || self.at_rule(RuleName::Predicate)
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        if self.at_rule(RuleName::Expression) {
            return Ok(Value::Expression(self.parse_expression()?));
        }
        if self.at_rule(RuleName::Predicate) {
            return Ok(Value::Predicate(self.parse_predicate()?));
        }
        match self.peek() {
            Some(token) if token.belongs_to(TokenCategory::Literal) => {
                let literal = token.clone();
                self.advance();
                Ok(Value::Literal(literal))
            }
            _ => Err(self.error(RuleName::Argument, self.grammar.first(RuleName::Argument))),
        }
    }

    /// `{ predicate? Id? }` or a bare predicate.
    pub(super) fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        if let Some(open) = self.eat(TokenKind::LCurly) {
            let predicate = if self.at_rule(RuleName::Predicate) {
                Some(self.parse_predicate()?)
            } else {
                None
            };
            let id = self.eat(TokenKind::Id);
            let close = self.expect(RuleName::Condition, TokenKind::RCurly)?;
            return Ok(Condition::Curly {
                open,
                predicate,
                id,
                close,
            });
        }

        if self.at_rule(RuleName::Predicate) {
            return Ok(Condition::Bare(self.parse_predicate()?));
        }

        Err(self.error(RuleName::Condition, self.grammar.first(RuleName::Condition)))
    }

    /// `( atomic? )`
    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.nested(RuleName::Expression, |cursor| {
            let open = cursor.expect(RuleName::Expression, TokenKind::LRound)?;
            let atomic = cursor.parse_nested_atomic()?;
            let close = cursor.expect(RuleName::Expression, TokenKind::RRound)?;
            Ok(Expression {
                open,
                atomic,
                close,
            })
        })
    }

    /// `< atomic? >`
    fn parse_predicate(&mut self) -> Result<Predicate, ParseError> {
        self.nested(RuleName::Predicate, |cursor| {
            let open = cursor.expect(RuleName::Predicate, TokenKind::LAngle)?;
            let atomic = cursor.parse_nested_atomic()?;
            let close = cursor.expect(RuleName::Predicate, TokenKind::RAngle)?;
            Ok(Predicate {
                open,
                atomic,
                close,
            })
        })
    }

    fn parse_nested_atomic(&mut self) -> Result<Option<Atomic>, ParseError> {
        if self.at_rule(RuleName::Atomic) {
            self.parse_atomic().map(Some)
        } else {
            Ok(None)
        }
    }
}
