use std::path::PathBuf;

use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};

const USAGE: &str = "\
reglex: compile a %%-sectioned lexer spec into a standalone tokenizer.

USAGE:
    reglex [OPTIONS] [PATH ...]

    PATH defaults to, or may be given as, '-' for stdin.

OPTIONS:
    -o, --output PATH   Write generated source to PATH (default: stdout).
    -d, --debug         Prepend a debug dump of rules/automata as comments.
    -h, --help          Print this message and exit.
    -v, --version       Print the version and exit.
";

pub struct Options {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub debug: bool,
}

/// Two mutually exclusive informational flags short-circuit the rest of
/// argument parsing.
pub enum Action {
    Run(Options),
    Help,
    Version,
}

pub fn parse(p: &mut Parser) -> anyhow::Result<Action> {
    let mut inputs = Vec::new();
    let mut output = None;
    let mut debug = false;

    while let Some(arg) = p.next()? {
        match arg {
            Arg::Short('o') | Arg::Long("output") => {
                let path: PathBuf = p.value().context("--output")?.into();
                output = Some(path);
            }
            Arg::Short('d') | Arg::Long("debug") => debug = true,
            Arg::Short('h') | Arg::Long("help") => return Ok(Action::Help),
            Arg::Short('v') | Arg::Long("version") => return Ok(Action::Version),
            Arg::Value(val) => inputs.push(PathBuf::from(val)),
            arg => return Err(arg.unexpected().into()),
        }
    }

    Ok(Action::Run(Options {
        inputs,
        output,
        debug,
    }))
}

pub fn usage() -> &'static str {
    USAGE
}
