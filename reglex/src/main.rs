use std::fs;
use std::io::{self, Read, Write};

use anyhow::Context;
use log::info;

use reglex::cli::{self, Action, Options};
use reglex::driver;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = dispatch(&mut lexopt::Parser::from_env()) {
        if std::env::var("RUST_BACKTRACE").map_or(false, |v| v == "1") {
            writeln!(&mut io::stderr(), "{:?}", err).unwrap();
        } else {
            writeln!(&mut io::stderr(), "{:#}", err).unwrap();
        }
        std::process::exit(1);
    }
}

fn dispatch(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    match cli::parse(p)? {
        Action::Help => {
            print!("{}", cli::usage());
            Ok(())
        }
        Action::Version => {
            println!("reglex {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Action::Run(opts) => run(opts),
    }
}

fn run(opts: Options) -> anyhow::Result<()> {
    let input = read_inputs(&opts.inputs)?;
    let output = driver::build(&input, opts.debug)?;
    write_output(opts.output.as_deref(), &output)?;
    info!("wrote {} bytes", output.len());
    Ok(())
}

/// Reads and logically concatenates every input path (`-` or no paths at
/// all meaning stdin); `%%` delimiters are not meaningful across a file
/// boundary.
fn read_inputs(paths: &[std::path::PathBuf]) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if paths.is_empty() {
        io::stdin()
            .read_to_end(&mut buf)
            .context("reading stdin")?;
        return Ok(buf);
    }
    for path in paths {
        if path.as_os_str() == "-" {
            io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
        } else {
            let contents =
                fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            buf.extend_from_slice(&contents);
        }
    }
    Ok(buf)
}

fn write_output(path: Option<&std::path::Path>, contents: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
        }
        None => io::stdout()
            .write_all(contents.as_bytes())
            .context("writing stdout"),
    }
}
