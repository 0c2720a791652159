use thiserror::Error;

use crate::location::Location;

/// Every fatal condition the generator can raise while reading and
/// compiling a spec file. Rendered as `line:col: message` via `Display`,
/// except for the variants that are unlocated by nature (I/O, missing
/// default parser).
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("{location}: malformed name {found:?}")]
    MalformedName { location: Location, found: String },

    #[error("{location}: unknown instruction {name:?}")]
    UnknownInstruction { location: Location, name: String },

    #[error("{location}: unterminated action body")]
    UnterminatedAction { location: Location },

    #[error("{location}: stray '%'")]
    StrayPercent { location: Location },

    #[error("{location}: unexpected end of file")]
    UnexpectedEof { location: Location },

    #[error("{location}: regex error: {source}")]
    Regex {
        location: Location,
        #[source]
        source: regexp2::ParseError,
    },

    #[error("{location}: rule {tag} (regex {regex:?}) may accept the empty string; no token expression may accept the empty string")]
    EmptyMatch {
        location: Location,
        tag: u32,
        regex: String,
    },

    #[error("no default parser: every rule was declared inside a named parser block")]
    NoDefaultParser,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
