use super::error::RollErrorKind;
use crate::common::*;
use std::cmp::Ordering;
use std::fmt;

type OpResult = Result<Primitive, RollErrorKind>;

/// A fully reduced value.
#[derive(Debug, Clone)]
pub enum Primitive {
    Int(Int),
    Float(Float),
    Str(String),
}

impl Primitive {
    pub const FALSE: Self = Self::Int(0);
    pub const TRUE: Self = Self::Int(1);

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(x) => *x != 0,
            Self::Float(x) => *x != 0.0,
            Self::Str(s) => !s.is_empty(),
        }
    }

    pub fn as_float(&self) -> Option<Float> {
        match self {
            Self::Int(x) => Some(*x as Float),
            Self::Float(x) => Some(*x),
            Self::Str(_) => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "an integer",
            Self::Float(_) => "a decimal",
            Self::Str(_) => "a string",
        }
    }

    fn type_error(op: Operator, operands: &[&Self]) -> RollErrorKind {
        let operands = operands
            .iter()
            .map(|x| x.type_name())
            .collect::<Vec<_>>()
            .join(" and ");
        RollErrorKind::OperandType {
            op: op.as_str(),
            operands,
        }
    }

    fn float(x: Float) -> OpResult {
        if x.is_nan() {
            Err(RollErrorKind::MathDomain)
        } else if x.is_infinite() {
            Err(RollErrorKind::Overflow)
        } else {
            Ok(Self::Float(x))
        }
    }

    fn from_bool(b: bool) -> Self {
        if b {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    pub fn unary(op: Operator, x: &Self) -> OpResult {
        match (op, x) {
            (Operator::Not, x) => Ok(Self::from_bool(!x.is_truthy())),
            (Operator::Neg, Self::Int(x)) => x.checked_neg().map(Self::Int).ok_or(RollErrorKind::Overflow),
            (Operator::Neg, Self::Float(x)) => Ok(Self::Float(-x)),
            (op, x) => Err(Self::type_error(op, &[x])),
        }
    }

    pub fn binary(op: Operator, lhs: &Self, rhs: &Self) -> OpResult {
        use Operator::*;

        match op {
            Add => lhs.add(rhs),
            Sub => arithmetic(op, lhs, rhs, Int::checked_sub, |x, y| x - y),
            Mul => arithmetic(op, lhs, rhs, Int::checked_mul, |x, y| x * y),
            Div => lhs.div(rhs),
            Pow => lhs.pow(rhs),
            And => Ok(Self::from_bool(lhs.is_truthy() & rhs.is_truthy())),
            Or => Ok(Self::from_bool(lhs.is_truthy() | rhs.is_truthy())),
            Eq => Ok(Self::from_bool(lhs == rhs)),
            Ne => Ok(Self::from_bool(lhs != rhs)),
            Gt | Ge | Lt | Le => {
                let ordering = lhs
                    .partial_cmp(rhs)
                    .ok_or_else(|| Self::type_error(op, &[lhs, rhs]))?;
                Ok(Self::from_bool(match op {
                    Gt => ordering == Ordering::Greater,
                    Ge => ordering != Ordering::Less,
                    Lt => ordering == Ordering::Less,
                    _ => ordering != Ordering::Greater,
                }))
            }
            Neg | Not => Err(RollErrorKind::internal(format!(
                "unary operator '{}' applied to two operands",
                op
            ))),
        }
    }

    fn add(&self, rhs: &Self) -> OpResult {
        match (self, rhs) {
            (Self::Str(x), Self::Str(y)) => Ok(Self::Str(format!("{}{}", x, y))),
            (x, y) => arithmetic(Operator::Add, x, y, Int::checked_add, |x, y| x + y),
        }
    }

    fn div(&self, rhs: &Self) -> OpResult {
        match (self.as_float(), rhs.as_float()) {
            (Some(_), Some(y)) if y == 0.0 => Err(RollErrorKind::ZeroDivision),
            (Some(x), Some(y)) => Self::float(x / y),
            _ => Err(Self::type_error(Operator::Div, &[self, rhs])),
        }
    }

    fn pow(&self, rhs: &Self) -> OpResult {
        match (self, rhs) {
            (Self::Int(x), Self::Int(y)) if *y >= 0 => u32::try_from(*y)
                .ok()
                .and_then(|y| x.checked_pow(y))
                .map(Self::Int)
                .ok_or(RollErrorKind::Overflow),
            (x, y) => match (x.as_float(), y.as_float()) {
                (Some(x), Some(y)) if x == 0.0 && y < 0.0 => Err(RollErrorKind::ZeroDivision),
                (Some(x), Some(y)) => Self::float(x.powf(y)),
                _ => Err(Self::type_error(Operator::Pow, &[self, rhs])),
            },
        }
    }
}

fn arithmetic(
    op: Operator,
    lhs: &Primitive,
    rhs: &Primitive,
    int_op: fn(Int, Int) -> Option<Int>,
    float_op: fn(Float, Float) -> Float,
) -> OpResult {
    match (lhs, rhs) {
        (Primitive::Int(x), Primitive::Int(y)) => {
            int_op(*x, *y).map(Primitive::Int).ok_or(RollErrorKind::Overflow)
        }
        (x, y) => match (x.as_float(), y.as_float()) {
            (Some(x), Some(y)) => Primitive::float(float_op(x, y)),
            _ => Err(Primitive::type_error(op, &[lhs, rhs])),
        },
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(x), Self::Int(y)) => x == y,
            (Self::Str(x), Self::Str(y)) => x == y,
            (Self::Str(_), _) | (_, Self::Str(_)) => false,
            (x, y) => x.as_float() == y.as_float(),
        }
    }
}

impl PartialOrd for Primitive {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(x), Self::Int(y)) => x.partial_cmp(y),
            (Self::Str(x), Self::Str(y)) => x.partial_cmp(y),
            (Self::Str(_), _) | (_, Self::Str(_)) => None,
            (x, y) => x.as_float()?.partial_cmp(&y.as_float()?),
        }
    }
}

impl From<Int> for Primitive {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<Float> for Primitive {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => fmt::Display::fmt(x, f),
            Self::Float(x) => fmt::Debug::fmt(x, f),
            Self::Str(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Primitive::{Float as F, Int as I};

    fn s(x: &str) -> Primitive {
        Primitive::Str(x.to_string())
    }

    fn check(op: Operator, lhs: Primitive, rhs: Primitive, expected: Primitive) {
        let actual = Primitive::binary(op, &lhs, &rhs).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(
            std::mem::discriminant(&actual),
            std::mem::discriminant(&expected)
        );
    }

    fn check_err(op: Operator, lhs: Primitive, rhs: Primitive, expected: RollErrorKind) {
        assert_eq!(Primitive::binary(op, &lhs, &rhs).unwrap_err(), expected);
    }

    fn type_error(op: &'static str, operands: &str) -> RollErrorKind {
        RollErrorKind::OperandType {
            op,
            operands: operands.to_string(),
        }
    }

    #[test]
    fn test_arithmetic() {
        check(Operator::Add, I(2), I(3), I(5));
        check(Operator::Add, I(2), F(0.5), F(2.5));
        check(Operator::Add, s("a"), s("b"), s("ab"));
        check(Operator::Sub, I(2), I(3), I(-1));
        check(Operator::Mul, F(1.5), I(2), F(3.0));
        check(Operator::Div, I(7), I(2), F(3.5));
        check(Operator::Div, I(4), I(2), F(2.0));
        check(Operator::Pow, I(2), I(10), I(1024));
        check(Operator::Pow, I(2), I(-1), F(0.5));
    }

    #[test]
    fn test_arithmetic_errors() {
        check_err(Operator::Div, I(1), I(0), RollErrorKind::ZeroDivision);
        check_err(Operator::Div, F(1.0), F(0.0), RollErrorKind::ZeroDivision);
        check_err(Operator::Pow, I(0), I(-1), RollErrorKind::ZeroDivision);
        check_err(Operator::Add, I(Int::MAX), I(1), RollErrorKind::Overflow);
        check_err(Operator::Pow, I(10), I(100), RollErrorKind::Overflow);
        check_err(Operator::Pow, F(-8.0), F(0.5), RollErrorKind::MathDomain);
        check_err(
            Operator::Sub,
            s("a"),
            I(1),
            type_error("-", "a string and an integer"),
        );
        check_err(
            Operator::Add,
            s("a"),
            F(1.0),
            type_error("+", "a string and a decimal"),
        );
    }

    #[test]
    fn test_comparison() {
        check(Operator::Lt, I(1), I(2), I(1));
        check(Operator::Ge, F(2.0), I(2), I(1));
        check(Operator::Eq, I(1), F(1.0), I(1));
        check(Operator::Eq, s("1"), I(1), I(0));
        check(Operator::Ne, s("a"), s("b"), I(1));
        check(Operator::Gt, s("b"), s("a"), I(1));
        check_err(
            Operator::Lt,
            s("a"),
            I(1),
            type_error("<", "a string and an integer"),
        );
    }

    #[test]
    fn test_logic() {
        check(Operator::And, I(2), s("x"), I(1));
        check(Operator::And, I(2), s(""), I(0));
        check(Operator::Or, I(0), F(0.0), I(0));
        assert_eq!(Primitive::unary(Operator::Not, &I(0)).unwrap(), I(1));
        assert_eq!(Primitive::unary(Operator::Neg, &I(2)).unwrap(), I(-2));
        assert_eq!(
            Primitive::unary(Operator::Neg, &s("a")).unwrap_err(),
            type_error("-", "a string")
        );
    }
}
