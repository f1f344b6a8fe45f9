mod common;
mod config;
mod counter;
mod error;
pub mod parse;
mod program;
mod resolve;
pub mod roll;
mod stack;

pub use common::{Float, Id, Int, Operator, UInt};
pub use config::Config;
pub use counter::HashCounter;
pub use error::Error;
pub use program::Program;
pub use resolve::Resolver;
pub use roll::{Environment, Primitive, RollContext, RollError, RollErrorKind, Roller, Trace};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Parses, resolves and rolls `source`, returning the value of each
/// top-level expression in order.
///
/// # Examples
/// ```
/// # use roll_lang::{roll, Primitive};
///
/// let results = roll("@fact = \\x -> x ? x*(fact x-1) : 1; fact 5; 4^3^2^1").unwrap();
/// assert_eq!(results, [Primitive::Int(120), Primitive::Int(262144)]);
/// ```
pub fn roll(source: &str) -> Result<Vec<Primitive>> {
    Ok(Program::new(source)?.roll()?)
}
