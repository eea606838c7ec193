mod error;
mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use parser::parse;
