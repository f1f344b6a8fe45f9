pub mod ast;
mod error;
mod fence;
pub mod lexer;
mod parser;
mod stringify;

pub use error::{ParseError, ParseErrorKind};

/// Parses a whole submitted source, optionally wrapped in one code fence,
/// into its top-level items.
pub fn parse(s: &str) -> Result<Vec<ast::Item>, ParseError> {
    parser::Parser::new(s).parse()
}
