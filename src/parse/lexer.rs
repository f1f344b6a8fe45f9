use logos::Logos;
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq)]
pub enum TokenKind {
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"([0-9]+\.[0-9]*)|(\.[0-9]+)")]
    Decimal,
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r#"'([^'\\]|\\.)*'"#)]
    String,
    #[regex(r"[a-zA-Z][a-zA-Z0-9]*")]
    Identifier,

    #[token("d")]
    Dice,
    #[regex(r"d[0-9]+")]
    DiceSides,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token(";")]
    Semicolon,
    #[token("@")]
    At,
    #[token("=")]
    Equal,
    #[token("->")]
    Arrow,
    #[token("\\")]
    Backslash,
    #[token("$")]
    Dollar,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,

    #[token("^")]
    Caret,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("!")]
    Bang,
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<=")]
    LessEqual,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,

    #[regex(r#""([^"\\]|\\.)*"#)]
    #[regex(r#"'([^'\\]|\\.)*"#)]
    ErrUnterminatedString,

    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer => "<integer>",
            Decimal => "<decimal>",
            String => "<string>",
            Identifier => "<identifier>",
            Dice => "'d'",
            DiceSides => "<dice>",
            LeftParen => "'('",
            RightParen => "')'",
            Semicolon => "';'",
            At => "'@'",
            Equal => "'='",
            Arrow => "'->'",
            Backslash => "'\\'",
            Dollar => "'$'",
            Question => "'?'",
            Colon => "':'",
            Caret => "'^'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Bang => "'!'",
            Ampersand => "'&'",
            Pipe => "'|'",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            GreaterEqual => "'>='",
            LessEqual => "'<='",
            LessThan => "'<'",
            GreaterThan => "'>'",
            ErrUnterminatedString | Error => "<error>",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub kind: TokenKind,
    /// Byte range within the lexed text.
    pub span: Range<usize>,
}

pub fn tokenize(s: &str) -> Vec<Lexeme> {
    let mut lexer = TokenKind::lexer(s);
    let mut tokens = Vec::new();
    while let Some(kind) = lexer.next() {
        tokens.push(Lexeme {
            kind,
            span: lexer.span(),
        });
    }
    tokens
}
