use crate::parse::ast::Node;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RollErrorKind {
    #[error("`{0}` is not defined")]
    UndefinedIdentifier(String),
    #[error("`{0}` is declared more than once")]
    DuplicateDeclaration(String),
    #[error("no case matches {0}")]
    CaseFailure(String),
    #[error("cannot divide by zero")]
    ZeroDivision,
    #[error("cannot roll zero dice")]
    ZeroDiceCount,
    #[error("cannot roll a negative number of dice ({0})")]
    NegativeDiceCount(String),
    #[error("cannot roll a fractional number of dice ({0})")]
    FloatingPointDiceCount(String),
    #[error("cannot roll dice with zero sides")]
    ZeroDiceSides,
    #[error("cannot roll dice with a negative number of sides ({0})")]
    NegativeDiceSides(String),
    #[error("cannot roll dice with a fractional number of sides ({0})")]
    FloatingPointDiceSides(String),
    #[error("cannot roll {count} dice at once; the limit is {max}")]
    ExcessiveDiceRolls { count: u64, max: u64 },
    #[error("{0} is not a function")]
    NotAFunction(String),
    #[error("expected a value but found the function {0}")]
    FunctionValue(String),
    #[error("'{op}' cannot be applied to {operands}")]
    OperandType { op: &'static str, operands: String },
    #[error("number is too large")]
    Overflow,
    #[error("math domain error")]
    MathDomain,
    #[error("{0}")]
    RunTime(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl RollErrorKind {
    /// A broken invariant rather than a mistake in the submitted program.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    pub(crate) fn internal(msg: impl ToString) -> Self {
        let msg = msg.to_string();
        tracing::error!(%msg, "internal error during evaluation");
        Self::Internal(msg)
    }
}

/// The nodes that were being resolved or reduced when an error occurred,
/// innermost first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Trace {
    frames: Vec<String>,
    elided: usize,
}

impl Trace {
    const MAX_FRAMES: usize = 12;
    const MAX_FRAME_WIDTH: usize = 80;

    fn push(&mut self, node: &Node) {
        if self.frames.len() >= Self::MAX_FRAMES {
            self.elided += 1;
            return;
        }

        let mut frame = node.to_string();
        if let Some((cut, _)) = frame.char_indices().nth(Self::MAX_FRAME_WIDTH) {
            frame.truncate(cut);
            frame.push_str("...");
        }
        // Variables and literals repeat their parent's text without adding context.
        if self.frames.last() != Some(&frame) {
            self.frames.push(frame);
        }
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn elided(&self) -> usize {
        self.elided
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "  in {}", frame)?;
        }
        if self.elided > 0 {
            writeln!(f, "  ... and {} more", self.elided)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct RollError {
    pub kind: RollErrorKind,
    pub trace: Trace,
}

impl RollError {
    /// Records `node` as the next enclosing frame while the error unwinds.
    pub(crate) fn traced(mut self, node: &Node) -> Self {
        self.trace.push(node);
        self
    }
}

impl From<RollErrorKind> for RollError {
    fn from(kind: RollErrorKind) -> Self {
        Self {
            kind,
            trace: Trace::default(),
        }
    }
}
