pub mod errors;
mod file;
mod parser;
pub mod types;
pub mod words;

pub use self::errors::{SimError, SyntaxError};
pub use self::file::GCodeFile;
pub use self::parser::{parse, parse_line, strip_comment};
pub use self::types::{Statement, StatementKind};
pub use self::words::{GWord, MWord};
