use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Int,
    Float,
    String,
    Identifier,
    Keyword(Keyword),

    // Single-character tokens
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    Less,
    Greater,

    // `=` or `==`, decided with one character of lookahead
    Equal,
    EqualEqual,

    // Never produced by the lexer; kept so the tag set stays closed.
    BangEqual,
    LessEqual,
    GreaterEqual,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "INT"),
            Self::Float => write!(f, "FLOAT"),
            Self::String => write!(f, "STRING"),
            Self::Identifier => write!(f, "IDENTIFIER"),
            Self::Keyword(k) => write!(f, "{k}"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::LeftBracket => write!(f, "["),
            Self::RightBracket => write!(f, "]"),
            Self::Comma => write!(f, ","),
            Self::Semicolon => write!(f, ";"),
            Self::Less => write!(f, "<"),
            Self::Greater => write!(f, ">"),
            Self::Equal => write!(f, "="),
            Self::EqualEqual => write!(f, "=="),
            Self::BangEqual => write!(f, "!="),
            Self::LessEqual => write!(f, "<="),
            Self::GreaterEqual => write!(f, ">="),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

/// Reserved words. Matching happens on NFC-normalized identifier text, so
/// the serialized forms below must stay in NFC.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
pub enum Keyword {
    #[strum(serialize = "चर")]
    Var,
    #[strum(serialize = "यदि")]
    If,
    #[strum(serialize = "तदा")]
    Then,
    #[strum(serialize = "अन्यथा")]
    Else,
    #[strum(serialize = "पर्यंतम्")]
    While,
    #[strum(serialize = "प्रति")]
    Step,
    #[strum(serialize = "प्रत्याययतु")]
    Function,
    #[strum(serialize = "प्रत्यावर्तयतु")]
    Return,
    #[strum(serialize = "लिखतु")]
    Print,
    #[strum(serialize = "पठतु")]
    Read,
    #[strum(serialize = "प्रारभ्य")]
    Begin,
    #[strum(serialize = "समाप्य")]
    End,
    #[strum(serialize = "विस्मर्यताम्")]
    Forget,
    #[strum(serialize = "सत्यम्")]
    True,
    #[strum(serialize = "असत्यम्")]
    False,
    #[strum(serialize = "शून्यम्")]
    Null,
    #[strum(serialize = "न")]
    Not,
}

impl Keyword {
    /// Keywords that open a statement; the parser resynchronizes on these.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            Self::Var
                | Self::If
                | Self::While
                | Self::Function
                | Self::Return
                | Self::Print
                | Self::Begin
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        let end = (other.offset + other.len).max(self.offset + self.len);
        Span::new(self.offset, end - self.offset)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.offset.into(), span.len)
    }
}

/// Payload carried by literal tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. Identifiers and keywords hold their
    /// NFC-normalized text, numbers their ASCII digits, strings their contents.
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            span,
        }
    }

    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TokenKind::Keyword(_) => "Keyword".to_string(),
            other => format!("{other:?}"),
        };
        write!(f, "{kind} '{}' @{}", self.lexeme, self.span.offset)
    }
}

/// Look up the keyword for already-normalized identifier text.
pub fn keyword_kind(ident: &str) -> Option<TokenKind> {
    ident.parse::<Keyword>().ok().map(TokenKind::Keyword)
}
