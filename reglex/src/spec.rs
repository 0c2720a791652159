use regexp2::{Ast, Parser as RegexParser};

use crate::definitions::Definitions;
use crate::error::SpecError;
use crate::location::Location;
use crate::reader::Reader;

/// One `(regex_ast, action_text, tag)` triple. `tag` is dense and 0-based
/// *within its parser*: each named sub-lexer gets its own reject/action
/// switch, so each keeps its own tag space rather than sharing one counter
/// across the whole rules section.
#[derive(Debug, Clone)]
pub struct Rule {
    pub ast: Ast,
    pub regex_text: String,
    pub action: Vec<u8>,
    pub tag: u32,
    pub location: Location,
}

/// A named or unnamed sub-lexer and its rules. Its minimal DFA is filled
/// in later by `pipeline::compile_parser`; it isn't part of what the spec
/// reader produces.
#[derive(Debug, Clone)]
pub struct ParserSpec {
    pub name: Option<String>,
    pub is_default: bool,
    pub rules: Vec<Rule>,
}

impl ParserSpec {
    pub fn unique_name(&self) -> &str {
        self.name.as_deref().unwrap_or("default")
    }
}

#[derive(Debug, Clone)]
pub struct SpecFile {
    pub host_prologue: Vec<u8>,
    pub emit_main: bool,
    pub parsers: Vec<ParserSpec>,
    pub host_epilogue: Vec<u8>,
}

/// Parse a whole spec file. `input` is the logical concatenation of every
/// file given on the command line: the `%%` delimiters are not meaningful
/// across file boundaries, so the driver has already joined them before
/// this runs.
pub fn read_spec(input: &[u8]) -> Result<SpecFile, SpecError> {
    let mut r = Reader::new(input);

    let host_prologue = read_host_segment_until_delim(&mut r)?;
    let emit_main = parse_instructions(&mut r)?;
    let defs = parse_definitions(&mut r)?;
    let parsers = parse_rules(&mut r, &defs)?;
    let host_epilogue = read_host_segment_to_eof(&mut r);

    Ok(SpecFile {
        host_prologue,
        emit_main,
        parsers,
        host_epilogue,
    })
}

fn read_host_segment_until_delim(r: &mut Reader) -> Result<Vec<u8>, SpecError> {
    let mut out = Vec::new();
    loop {
        if r.at_eof() {
            return Err(SpecError::UnexpectedEof { location: r.loc() });
        }
        if r.eat(b"%%") {
            return Ok(out);
        }
        // A '%' not immediately followed by '%' is a literal byte; only
        // the one byte is consumed; the next loop iteration re-examines
        // whatever follows.
        out.push(r.bump().unwrap());
    }
}

fn read_host_segment_to_eof(r: &mut Reader) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(b) = r.bump() {
        out.push(b);
    }
    out
}

fn read_ident(r: &mut Reader) -> String {
    let mut buf = Vec::new();
    while matches!(r.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
        buf.push(r.bump().unwrap());
    }
    String::from_utf8(buf).expect("identifier bytes are ASCII by construction")
}

/// A regex token runs until whitespace or the start of an action body
/// (`%{`); `%` has no meaning in this grammar's regex syntax, so `%{`
/// unambiguously ends the token even with no separating whitespace.
fn read_regex_token(r: &mut Reader) -> String {
    let mut buf = Vec::new();
    loop {
        match r.peek() {
            None => break,
            Some(b' ' | b'\t' | b'\r' | b'\n') => break,
            Some(b'%') if r.starts_with(b"%{") || r.starts_with(b"%%") => break,
            Some(_) => buf.push(r.bump().unwrap()),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn parse_instructions(r: &mut Reader) -> Result<bool, SpecError> {
    let mut emit_main = false;
    loop {
        r.skip_whitespace();
        if r.eat(b"%%") {
            return Ok(emit_main);
        }
        if r.at_eof() {
            return Err(SpecError::UnexpectedEof { location: r.loc() });
        }
        let location = r.loc();
        let name = read_ident(r);
        if name.is_empty() {
            return Err(SpecError::MalformedName {
                location,
                found: (r.peek().map(|b| (b as char).to_string())).unwrap_or_default(),
            });
        }
        match name.as_str() {
            "emit_main" => emit_main = true,
            _ => return Err(SpecError::UnknownInstruction { location, name }),
        }
    }
}

fn parse_definitions(r: &mut Reader) -> Result<Definitions, SpecError> {
    let mut defs = Definitions::new();
    loop {
        r.skip_whitespace();
        if r.eat(b"%%") {
            return Ok(defs);
        }
        if r.at_eof() {
            return Err(SpecError::UnexpectedEof { location: r.loc() });
        }
        let name_location = r.loc();
        let name = read_ident(r);
        if name.is_empty() {
            return Err(SpecError::MalformedName {
                location: name_location,
                found: (r.peek().map(|b| (b as char).to_string())).unwrap_or_default(),
            });
        }
        r.skip_whitespace();

        let regex_location = r.loc();
        let regex_text = read_regex_token(r);
        let ast = RegexParser::new(&defs)
            .parse(&regex_text)
            .map_err(|source| SpecError::Regex {
                location: regex_location,
                source,
            })?;
        defs.insert(name, ast);
    }
}

fn parse_rules(r: &mut Reader, defs: &Definitions) -> Result<Vec<ParserSpec>, SpecError> {
    let mut parsers = vec![ParserSpec {
        name: None,
        is_default: true,
        rules: Vec::new(),
    }];
    let mut current = 0usize;

    loop {
        r.skip_whitespace();
        if r.eat(b"%%") {
            break;
        }
        if r.at_eof() {
            return Err(SpecError::UnexpectedEof { location: r.loc() });
        }

        if r.starts_with(b"%{") {
            // Position resolves the marker-vs-rule ambiguity: at the top
            // of this loop a regex has not been read yet, so `%{` can
            // only open a parser marker here, never an action body.
            r.eat(b"%{");
            let name_location = r.loc();
            let name = read_ident(r);
            if name.is_empty() {
                return Err(SpecError::MalformedName {
                    location: name_location,
                    found: (r.peek().map(|b| (b as char).to_string())).unwrap_or_default(),
                });
            }
            if !r.eat(b"%}") {
                return Err(SpecError::UnterminatedAction { location: r.loc() });
            }

            match parsers.iter().position(|p| p.name.as_deref() == Some(name.as_str())) {
                Some(idx) => current = idx,
                None => {
                    parsers.push(ParserSpec {
                        name: Some(name),
                        is_default: false,
                        rules: Vec::new(),
                    });
                    current = parsers.len() - 1;
                }
            }
            continue;
        }

        let rule_location = r.loc();
        let regex_text = read_regex_token(r);
        if regex_text.is_empty() {
            return Err(SpecError::MalformedName {
                location: rule_location,
                found: (r.peek().map(|b| (b as char).to_string())).unwrap_or_default(),
            });
        }
        r.skip_whitespace();
        if !r.eat(b"%{") {
            return Err(SpecError::StrayPercent { location: r.loc() });
        }
        let action = read_action_body(r)?;

        let ast = RegexParser::new(defs)
            .parse(&regex_text)
            .map_err(|source| SpecError::Regex {
                location: rule_location,
                source,
            })?;

        let tag = parsers[current].rules.len() as u32;
        parsers[current].rules.push(Rule {
            ast,
            regex_text,
            action,
            tag,
            location: rule_location,
        });
    }

    // The unnamed parser is seeded up front so rules can accumulate into it
    // before any `%{name%}` marker is seen; if the spec never actually puts
    // a rule there (every rule ended up under a named marker), it isn't a
    // real default parser and must not satisfy the "has a default parser"
    // check -- drop it rather than leave a phantom zero-rule `is_default`
    // entry behind.
    if parsers[0].rules.is_empty() {
        parsers.remove(0);
    }

    Ok(parsers)
}

/// `%{` has already been consumed; reads until the matching `%}`. Inside,
/// any `%` not followed by `}` contributes a literal `%`.
fn read_action_body(r: &mut Reader) -> Result<Vec<u8>, SpecError> {
    let mut out = Vec::new();
    loop {
        match r.peek() {
            None => return Err(SpecError::UnterminatedAction { location: r.loc() }),
            Some(b'%') => {
                r.bump();
                if r.eat(b"}") {
                    return Ok(out);
                }
                out.push(b'%');
            }
            Some(_) => out.push(r.bump().unwrap()),
        }
    }
}
