use crate::parser::error::LexicalError;
use crate::token::{Position, Token, TokenKind};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Tokenize a complete source buffer.
///
/// At each position the token kinds are tried in a fixed priority order:
/// skipped whitespace and comments, remarks, literals, keywords, delimiters,
/// labels, punctuation, `::`, identifiers. The first kind that matches wins.
/// Inside `<...>` a label may also span spaced comparison operators.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexicalError> {
    Lexer::new(source).run()
}

// ---------------------------------------------------------------------------
// Lexer state
// ---------------------------------------------------------------------------

/// Characters that never appear unescaped inside a label.
const STRUCTURAL: &[char] = &['{', '}', '(', ')', '<', '>', '[', ']', ';', '"', '#', '@', '|'];

/// Keywords in the order they are tried. `repeat until` must precede `repeat`.
const KEYWORDS: &[(TokenKind, &str)] = &[
    (TokenKind::Forever, "forever"),
    (TokenKind::End, "end"),
    (TokenKind::RepeatUntil, "repeat"),
    (TokenKind::Repeat, "repeat"),
    (TokenKind::If, "if"),
    (TokenKind::Else, "else"),
    (TokenKind::Then, "then"),
];

/// Words a label never extends into across whitespace.
const CLAUSE_CLOSERS: &[&str] = &["end", "else"];

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    /// Unclosed `<` tokens so far.
    angle_depth: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            source,
            pos: 0,
            line: 1,
            column: 1,
            angle_depth: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexicalError> {
        while self.pos < self.source.len() {
            let rest = &self.source[self.pos..];
            if let Some(len) = skipped_len(rest) {
                self.advance(len);
                continue;
            }
            let Some((kind, len)) = match_token(rest, self.angle_depth > 0) else {
                return Err(LexicalError {
                    offset: self.pos,
                    position: self.position(),
                    remainder: rest.to_string(),
                });
            };
            match kind {
                TokenKind::LAngle => self.angle_depth += 1,
                TokenKind::RAngle => self.angle_depth = self.angle_depth.saturating_sub(1),
                _ => {}
            }
            self.push(kind, len);
        }
        Ok(self.tokens)
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn push(&mut self, kind: TokenKind, len: usize) {
        let text = &self.source[self.pos..self.pos + len];
        self.tokens.push(Token {
            kind,
            text: text.to_string(),
            span: self.pos..self.pos + len,
            position: self.position(),
            line_breaks: text.matches('\n').count(),
        });
        self.advance(len);
    }

    fn advance(&mut self, len: usize) {
        for c in self.source[self.pos..self.pos + len].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += len;
    }
}

// ---------------------------------------------------------------------------
// Matchers: each returns the byte length of the match at the start of `rest`
// ---------------------------------------------------------------------------

fn skipped_len(rest: &str) -> Option<usize> {
    let ws = horizontal_ws(rest);
    if ws > 0 {
        return Some(ws);
    }
    if rest.starts_with("//") {
        return Some(rest.find('\n').unwrap_or(rest.len()));
    }
    if rest.starts_with("/*") {
        return rest[2..].find("*/").map(|close| close + 4);
    }
    None
}

/// `operators` allows spaced `<` and `>` inside labels.
fn match_token(rest: &str, operators: bool) -> Option<(TokenKind, usize)> {
    if let Some(len) = delimited_len(rest, '|', '|') {
        return Some((TokenKind::Comment, len));
    }

    if let Some(len) = delimited_len(rest, '"', '"') {
        return Some((TokenKind::StringLiteral, len));
    }
    if let Some(len) = number_len(rest) {
        // A longer label reading at the same position wins: `10 steps`.
        return match label_len(rest, operators) {
            Some(label) if label > len => Some((TokenKind::Label, label)),
            _ => Some((TokenKind::NumberLiteral, len)),
        };
    }
    if let Some(len) = color_len(rest) {
        return Some((TokenKind::ColorLiteral, len));
    }
    if let Some(len) = delimited_len(rest, '[', ']') {
        return Some((TokenKind::ChoiceLiteral, len));
    }

    if let Some(matched) = keyword(rest, operators) {
        return Some(matched);
    }

    if let Some(len) = delimiter_len(rest) {
        return Some((TokenKind::Delimiter, len));
    }

    if let Some(len) = label_len(rest, operators) {
        return Some((TokenKind::Label, len));
    }

    let punctuation = match rest.chars().next()? {
        '{' => Some(TokenKind::LCurly),
        '}' => Some(TokenKind::RCurly),
        '(' => Some(TokenKind::LRound),
        ')' => Some(TokenKind::RRound),
        '>' => Some(TokenKind::RAngle),
        '<' => Some(TokenKind::LAngle),
        _ => None,
    };
    if let Some(kind) = punctuation {
        return Some((kind, 1));
    }
    if rest.starts_with("::") {
        return Some((TokenKind::DoubleColon, 2));
    }

    id_len(rest).map(|len| (TokenKind::Id, len))
}

/// `open ... close` where a backslash escapes any character but a line break.
/// Used for strings, choices and remarks.
fn delimited_len(rest: &str, open: char, close: char) -> Option<usize> {
    let mut chars = rest.char_indices();
    if chars.next()?.1 != open {
        return None;
    }
    while let Some((i, c)) = chars.next() {
        if c == close {
            return Some(i + c.len_utf8());
        }
        if c == '\\' {
            match chars.next() {
                Some((_, '\n')) | None => return None,
                Some(_) => {}
            }
        }
    }
    None
}

/// `-?digits(.digits)?`
fn number_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let sign = usize::from(bytes.first() == Some(&b'-'));
    let digits = count_digits(&bytes[sign..]);
    if digits == 0 {
        return None;
    }
    let mut end = sign + digits;
    if bytes.get(end) == Some(&b'.') {
        let fraction = count_digits(&bytes[end + 1..]);
        if fraction > 0 {
            end += 1 + fraction;
        }
    }
    Some(end)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// `#RRGGBB` or `#RGB`, the six-digit form first.
fn color_len(rest: &str) -> Option<usize> {
    let digits = rest.strip_prefix('#')?;
    let hex = digits.bytes().take_while(u8::is_ascii_hexdigit).count();
    if hex >= 6 {
        Some(7)
    } else if hex >= 3 {
        Some(4)
    } else {
        None
    }
}

/// Keywords match case-insensitively. A keyword directly followed by label
/// text is really a longer label that starts with the keyword's spelling.
fn keyword(rest: &str, operators: bool) -> Option<(TokenKind, usize)> {
    for &(kind, word) in KEYWORDS {
        let len = if kind == TokenKind::RepeatUntil {
            repeat_until_len(rest)
        } else {
            starts_with_word(rest, word).then_some(word.len())
        };
        let Some(len) = len else { continue };
        if label_unit(&rest[len..]).is_some() {
            return label_len(rest, operators).map(|label| (TokenKind::Label, label));
        }
        return Some((kind, len));
    }
    None
}

/// `repeat[ \t]+until`
fn repeat_until_len(rest: &str) -> Option<usize> {
    if !starts_with_word(rest, "repeat") {
        return None;
    }
    let gap = rest[6..]
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    if gap == 0 || !starts_with_word(&rest[6 + gap..], "until") {
        return None;
    }
    Some(6 + gap + 5)
}

fn starts_with_word(rest: &str, word: &str) -> bool {
    rest.get(..word.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(word))
}

/// `;` with optional trailing whitespace and a line break, a bare `;`, or a bare line break.
fn delimiter_len(rest: &str) -> Option<usize> {
    if let Some(after) = rest.strip_prefix(';') {
        let ws = horizontal_ws(after);
        if after[ws..].starts_with('\n') {
            return Some(ws + 2);
        }
        return Some(1);
    }
    rest.starts_with('\n').then_some(1)
}

fn id_len(rest: &str) -> Option<usize> {
    let name = rest.strip_prefix('@')?;
    let len = name
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    (len > 0).then_some(len + 1)
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Length of one label character at the start of `rest`: a backslash escape
/// (any character, line breaks included), a colon not followed by another
/// colon, or any character that is not structural, whitespace, or the start
/// of a comment.
fn label_unit(rest: &str) -> Option<usize> {
    let mut chars = rest.chars();
    match chars.next()? {
        '\\' => chars.next().map(|escaped| 1 + escaped.len_utf8()),
        ':' => (!rest[1..].starts_with(':')).then_some(1),
        ' ' | '\t' | '\r' | '\n' => None,
        '/' if rest.starts_with("//") || rest.starts_with("/*") => None,
        c if STRUCTURAL.contains(&c) => None,
        c => Some(c.len_utf8()),
    }
}

/// A maximal run of label characters, with single runs of horizontal
/// whitespace allowed between them. The label never starts or ends on whitespace.
/// With `operators`, a spaced `<` or `>` between words is part of the label.
fn label_len(rest: &str, operators: bool) -> Option<usize> {
    let mut end = label_unit(rest)?;
    loop {
        while let Some(len) = label_unit(&rest[end..]) {
            end += len;
        }
        let gap = horizontal_ws(&rest[end..]);
        if gap == 0 {
            break;
        }
        let next = &rest[end + gap..];
        if closes_clause(next) {
            break;
        }
        let operator = || operators.then(|| spaced_operator(next)).flatten();
        if let Some(len) = label_unit(next).or_else(operator) {
            end += gap + len;
            continue;
        }
        break;
    }
    Some(end)
}

/// `<` or `>` with whitespace on both sides and more label text after it,
/// as in `x > 5`.
fn spaced_operator(rest: &str) -> Option<usize> {
    if !rest.starts_with(['<', '>']) {
        return None;
    }
    let gap = horizontal_ws(&rest[1..]);
    if gap == 0 {
        return None;
    }
    let next = &rest[1 + gap..];
    (label_unit(next).is_some() && !closes_clause(next)).then_some(1)
}

/// A standalone `end` or `else` word. Labels stop in front of one, so a
/// block cannot read `say something else` unless the word is escaped as `\else`.
fn closes_clause(rest: &str) -> bool {
    CLAUSE_CLOSERS
        .iter()
        .any(|word| starts_with_word(rest, word) && label_unit(&rest[word.len()..]).is_none())
}

fn horizontal_ws(rest: &str) -> usize {
    rest.bytes()
        .take_while(|b| matches!(b, b' ' | b'\t' | b'\r'))
        .count()
}
