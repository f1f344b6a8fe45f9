use crate::parse::ParseError;
use crate::roll::RollError;
use std::fmt::Write;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Roll(#[from] RollError),
}

impl Error {
    /// Renders the error for the person who wrote `source`.
    ///
    /// Parse errors point at the offending fragment with a caret; runtime
    /// errors show the source followed by the expressions that were being
    /// evaluated, innermost first.
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        match self {
            Self::Parse(err) => {
                let line = source.lines().nth(err.line - 1).unwrap_or_default();
                let width = err.slice.chars().count().max(1);
                let _ = writeln!(out, "{}", err);
                let _ = writeln!(out, "{}", line);
                let _ = writeln!(out, "{}{}", " ".repeat(err.column - 1), "^".repeat(width));
            }
            Self::Roll(err) if err.kind.is_internal() => {
                tracing::error!(error = %err, source, "internal error while rolling");
                out.push_str("something went wrong while rolling; this is a bug\n");
            }
            Self::Roll(err) => {
                let _ = writeln!(out, "{}", err);
                let _ = writeln!(out, "{}", source.trim_end());
                let _ = write!(out, "{}", err.trace);
            }
        }
        out
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Roll(err) if err.kind.is_internal())
    }
}
