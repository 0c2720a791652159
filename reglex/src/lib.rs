pub mod cli;
pub mod codegen;
pub mod definitions;
pub mod driver;
pub mod error;
pub mod location;
pub mod pipeline;
pub mod reader;
pub mod spec;

pub use error::SpecError;
pub use pipeline::{compile_parser, CompiledParser};
pub use spec::{read_spec, ParserSpec, Rule, SpecFile};
