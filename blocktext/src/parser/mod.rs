pub mod error;
mod expression;
pub mod lexer;
mod structural;

use std::collections::BTreeSet;
use std::ops::Range;

pub use error::{ConfigurationError, LexicalError, NestingError, ParseError, SyntaxError};

use crate::Code;
use crate::grammar::{self, GrammarTable, RuleName};
use crate::token::{Token, TokenKind};

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Tokenize and parse the whole source into a `Code` tree.
    pub fn parse(&self) -> Result<Code, ParseError> {
        let grammar = grammar::notation()?;
        let tokens = lexer::tokenize(&self.source)?;
        Cursor::new(&tokens, grammar).parse_code(self.file_id)
    }
}

/// Parse an already tokenized source.
pub fn parse_tokens(tokens: &[Token], file_id: usize) -> Result<Code, ParseError> {
    let grammar = grammar::notation()?;
    Cursor::new(tokens, grammar).parse_code(file_id)
}

// ---------------------------------------------------------------------------
// Token cursor
// ---------------------------------------------------------------------------

/// Deepest allowed nesting of clauses, expressions and predicates combined.
pub const MAX_NESTING: usize = 32;

/// Position in a token sequence. All lookahead decisions consult the grammar table.
struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// End offset of the last consumed token.
    prev_end: usize,
    grammar: &'static GrammarTable,
    /// Clauses, expressions and predicates currently open.
    depth: usize,
    /// Token kinds tested for at token index `tried_at`.
    tried: BTreeSet<TokenKind>,
    tried_at: usize,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token], grammar: &'static GrammarTable) -> Self {
        Cursor {
            tokens,
            pos: 0,
            prev_end: tokens.first().map_or(0, |t| t.span.start),
            grammar,
            depth: 0,
            tried: BTreeSet::new(),
            tried_at: 0,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    /// Record that any of `kinds` would have been accepted at token index `at`.
    fn note(&mut self, at: usize, kinds: impl IntoIterator<Item = TokenKind>) {
        if at > self.tried_at {
            self.tried.clear();
            self.tried_at = at;
        }
        if at == self.tried_at {
            self.tried.extend(kinds);
        }
    }

    fn at(&mut self, kind: TokenKind) -> bool {
        self.note(self.pos, [kind]);
        self.peek_kind() == Some(kind)
    }

    /// Whether the next token can begin `rule`.
    fn at_rule(&mut self, rule: RuleName) -> bool {
        self.rule_at(0, rule)
    }

    /// Whether the token `offset` places ahead can begin `rule`.
    fn rule_at(&mut self, offset: usize, rule: RuleName) -> bool {
        let at = self.pos + offset;
        self.note(at, self.grammar.first(rule));
        self.tokens
            .get(at)
            .is_some_and(|token| self.grammar.starts(rule, token.kind))
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek()?.clone();
        self.pos += 1;
        self.prev_end = token.span.end;
        Some(token)
    }

    /// Consume the next token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) { self.advance() } else { None }
    }

    fn expect(&mut self, rule: RuleName, kind: TokenKind) -> Result<Token, ParseError> {
        match self.eat(kind) {
            Some(token) => Ok(token),
            None => Err(self.error(rule, vec![kind])),
        }
    }

    /// Run `parse` one nesting level deeper, failing once `MAX_NESTING` is reached.
    fn nested<T>(
        &mut self,
        rule: RuleName,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(NestingError {
                rule,
                limit: MAX_NESTING,
                found: self.peek().cloned(),
                span: self.found_span(),
            }
            .into());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Offset where the next construct starts.
    fn start(&self) -> usize {
        self.peek().map_or(self.prev_end, |t| t.span.start)
    }

    fn error(&self, rule: RuleName, expected: Vec<TokenKind>) -> ParseError {
        SyntaxError {
            rule,
            expected,
            end_of_input: false,
            found: self.peek().cloned(),
            span: self.found_span(),
        }
        .into()
    }

    /// A token is left where the input could have ended. Lists every kind
    /// tested for at this position.
    fn leftover_error(&self) -> ParseError {
        let expected = if self.tried_at == self.pos {
            self.tried.iter().copied().collect()
        } else {
            Vec::new()
        };
        SyntaxError {
            rule: RuleName::Code,
            expected,
            end_of_input: true,
            found: self.peek().cloned(),
            span: self.found_span(),
        }
        .into()
    }

    /// Span of the next token, or an empty span at the end of the input.
    fn found_span(&self) -> Range<usize> {
        match self.peek() {
            Some(token) => token.span.clone(),
            None => {
                let end = self.tokens.last().map_or(0, |t| t.span.end);
                end..end
            }
        }
    }
}
