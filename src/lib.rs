//! Spintax parsing and expansion.
//!
//! Spintax embeds groups of alternatives in text, e.g. `{Hello|Hi} {world|there}`.
//! [`Parser`] turns such text into a [`Structure`], which can then be expanded into
//! every concrete string it denotes.

pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod expander;
pub mod parser;
pub mod processor;

pub use ast::{Group, Structure, Token, Variant};
pub use diagnostics::{CollectingErrorHandler, ConsoleErrorHandler, ErrorHandler, LogErrorHandler};
pub use error::{ErrorKind, ParseError};
pub use parser::Parser;

/// Parse `input` and expand it in one go, reporting diagnostics to stderr
pub fn expand(input: &str) -> Result<Vec<String>, ParseError> {
    Parser::new().parse(input).map(Structure::permutations)
}
