use std::fmt;
use std::ops::Range;

/// Concrete token kinds produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    // Remarks: `|...|`
    Comment,

    // Literals
    StringLiteral,
    NumberLiteral,
    ColorLiteral,
    ChoiceLiteral,

    // Keywords
    Forever,
    End,
    Then,
    Repeat,
    RepeatUntil,
    If,
    Else,

    // Separators: `;`, `;\n`, `\n`
    Delimiter,

    // Free text
    Label,

    // Punctuation
    LCurly,
    RCurly,
    LRound,
    RRound,
    LAngle,
    RAngle,
    DoubleColon,

    // `@name`
    Id,
}

/// Abstract token categories. A kind may be tested against any category it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenCategory {
    Literal,
    Keyword,
}

const LITERALS: &[TokenKind] = &[
    TokenKind::StringLiteral,
    TokenKind::NumberLiteral,
    TokenKind::ColorLiteral,
    TokenKind::ChoiceLiteral,
];

const KEYWORDS: &[TokenKind] = &[
    TokenKind::Forever,
    TokenKind::End,
    TokenKind::Then,
    TokenKind::Repeat,
    TokenKind::RepeatUntil,
    TokenKind::If,
    TokenKind::Else,
];

impl TokenCategory {
    /// The concrete kinds belonging to this category.
    pub fn kinds(self) -> &'static [TokenKind] {
        match self {
            TokenCategory::Literal => LITERALS,
            TokenCategory::Keyword => KEYWORDS,
        }
    }
}

impl TokenKind {
    /// The abstract categories this kind belongs to.
    pub fn categories(self) -> &'static [TokenCategory] {
        match self {
            TokenKind::StringLiteral
            | TokenKind::NumberLiteral
            | TokenKind::ColorLiteral
            | TokenKind::ChoiceLiteral => &[TokenCategory::Literal],
            TokenKind::Forever
            | TokenKind::End
            | TokenKind::Then
            | TokenKind::Repeat
            | TokenKind::RepeatUntil
            | TokenKind::If
            | TokenKind::Else => &[TokenCategory::Keyword],
            _ => &[],
        }
    }

    pub fn belongs_to(self, category: TokenCategory) -> bool {
        self.categories().contains(&category)
    }

    /// Human-readable description used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Comment => "remark `|...|`",
            TokenKind::StringLiteral => "string literal",
            TokenKind::NumberLiteral => "number literal",
            TokenKind::ColorLiteral => "color literal",
            TokenKind::ChoiceLiteral => "choice literal",
            TokenKind::Forever => "`forever`",
            TokenKind::End => "`end`",
            TokenKind::Then => "`then`",
            TokenKind::Repeat => "`repeat`",
            TokenKind::RepeatUntil => "`repeat until`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::Delimiter => "delimiter",
            TokenKind::Label => "label",
            TokenKind::LCurly => "`{`",
            TokenKind::RCurly => "`}`",
            TokenKind::LRound => "`(`",
            TokenKind::RRound => "`)`",
            TokenKind::LAngle => "`<`",
            TokenKind::RAngle => "`>`",
            TokenKind::DoubleColon => "`::`",
            TokenKind::Id => "identifier `@...`",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// 1-based line and column (in characters) of a token's first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A classified token. Immutable once produced by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text exactly as matched.
    pub text: String,
    /// Byte span in source.
    pub span: Range<usize>,
    pub position: Position,
    /// Number of line breaks inside `text`.
    pub line_breaks: usize,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn belongs_to(&self, category: TokenCategory) -> bool {
        self.kind.belongs_to(category)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Delimiter => write!(f, "delimiter"),
            _ => write!(f, "`{}`", self.text),
        }
    }
}
