//! Reduction of resolved syntax trees to values.

mod ctx;
mod env;
mod error;
mod num;
mod rename;
mod roller;

pub(crate) type RResult<T> = Result<T, RollError>;

pub use ctx::{DefaultRoller, RollContext};
pub use env::Environment;
pub use error::{RollError, RollErrorKind, Trace};
pub use num::Primitive;
pub use roller::Roller;

#[cfg(test)]
pub(crate) use roller::StepRoller;
