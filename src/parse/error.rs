use super::lexer::TokenKind;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("error at line {line}, character {column} ({slice:?}): {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte range within the original, still fenced, source.
    pub span: Range<usize>,
    pub slice: String,
    /// 1-based line of `span.start`.
    pub line: usize,
    /// 1-based character (not byte) within `line`.
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, span: Range<usize>, source: &str) -> Self {
        let slice = source.get(span.clone()).unwrap_or_default().to_string();
        let (line, column) = line_column(source, span.start);
        Self {
            kind,
            span,
            slice,
            line,
            column,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: TokenKind,
        expected: Vec<TokenKind>,
    },
    ExpectedExpression {
        found: TokenKind,
    },
    UnexpectedEnd {
        expected: Vec<TokenKind>,
    },
    UnexpectedCharacter,
    UnterminatedString,
    UnclosedCodeBlock,
    InvalidNumber,
    ReservedIdentifier,
    TooDeep,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token: found {}, expected ", found)?;
                fmt_expected(expected, f)
            }
            Self::ExpectedExpression { found } => {
                write!(f, "unexpected token: found {}, expected an expression", found)
            }
            Self::UnexpectedEnd { expected } if expected.is_empty() => {
                write!(f, "unexpected end of source, expected an expression")
            }
            Self::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of source, expected ")?;
                fmt_expected(expected, f)
            }
            Self::UnexpectedCharacter => write!(f, "unexpected character"),
            Self::UnterminatedString => write!(f, "unterminated string"),
            Self::UnclosedCodeBlock => write!(f, "unclosed code block"),
            Self::InvalidNumber => write!(f, "number is out of range"),
            Self::ReservedIdentifier => {
                write!(f, "`d` and `d` followed by digits are reserved for dice")
            }
            Self::TooDeep => write!(f, "expression is nested too deeply"),
        }
    }
}

fn fmt_expected(expected: &[TokenKind], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expected {
        [] => Ok(()),
        [a] => f.write_str(a.as_str()),
        [a, b] => write!(f, "{} or {}", a, b),
        [init @ .., last] => {
            for exp in init {
                write!(f, "{}, ", exp)?;
            }
            write!(f, "or {}", last)
        }
    }
}

/// 1-based line and character of the byte offset `pos` within `source`.
fn line_column(source: &str, pos: usize) -> (usize, usize) {
    let before = source.get(..pos).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("1 + x", 4), (1, 5));
        assert_eq!(line_column("1;\n  x", 5), (2, 3));
        assert_eq!(line_column("\"é\" + x", 7), (1, 7));
    }

    #[test]
    fn test_fmt_expected() {
        let kind = ParseErrorKind::UnexpectedToken {
            found: TokenKind::RightParen,
            expected: vec![TokenKind::Semicolon, TokenKind::Colon, TokenKind::Arrow],
        };
        assert_eq!(
            kind.to_string(),
            "unexpected token: found ')', expected ';', ':', or '->'"
        );
    }
}
