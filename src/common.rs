use std::fmt;

#[cfg(test)]
pub use vec1::vec1;

pub type Int = i64;
pub type UInt = u64;
pub type Float = f64;

/// Identifier assigned to a binder during resolution (positive) or minted
/// at runtime for hygienic renaming (negative).
pub type Id = i64;

/// Identifier carried by a variable or binder that has not been resolved yet.
pub const UNRESOLVED: Id = 0;

pub type NonEmpty<T> = vec1::Vec1<T>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Operator {
    Neg,
    Not,
    Pow,
    Mul,
    Div,
    Add,
    Sub,
    And,
    Or,
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl Operator {
    pub const fn arity(&self) -> usize {
        match self {
            Self::Neg | Self::Not => 1,
            _ => 2,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
            Self::Pow => "^",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Add => "+",
            Self::Sub => "-",
            Self::And => "&",
            Self::Or => "|",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
