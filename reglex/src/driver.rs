use log::{debug, info};

use crate::codegen;
use crate::error::SpecError;
use crate::pipeline::{compile_parser, CompiledParser};
use crate::spec::{read_spec, SpecFile};

/// Read the spec, compile each named/unnamed parser's rules down to a
/// minimal DFA, splice the runtime template, return the finished output
/// source. `debug` requests the `-d`/`--debug` rule/automaton dump
/// prepended as comments.
pub fn build(input: &[u8], debug: bool) -> Result<String, SpecError> {
    let spec = read_spec(input)?;
    debug!(
        "read spec: {} parser(s), emit_main={}",
        spec.parsers.len(),
        spec.emit_main
    );

    if !spec.parsers.iter().any(|p| p.is_default) {
        return Err(SpecError::NoDefaultParser);
    }

    let mut compiled: Vec<CompiledParser> = Vec::with_capacity(spec.parsers.len());
    for parser in &spec.parsers {
        debug!(
            "building NFA for parser {}: {} rules",
            parser.unique_name(),
            parser.rules.len()
        );
        let c = compile_parser(parser)?;
        debug!(
            "parser {} minimized to {} states",
            parser.unique_name(),
            c.dfa.total_states
        );
        compiled.push(c);
    }

    let mut output = String::new();
    if debug {
        output.push_str(&debug_dump(&spec, &compiled));
    }
    output.push_str(&codegen::generate(&spec, &compiled));
    info!("generated {} bytes of output", output.len());
    Ok(output)
}

/// `-d`/`--debug`: prepend a human-readable dump of each parser's rule set
/// and minimal DFA as `//` comments.
pub fn debug_dump(spec: &SpecFile, compiled: &[CompiledParser]) -> String {
    let mut out = String::new();
    out.push_str("// reglex debug dump\n");
    for parser in compiled {
        out.push_str(&format!(
            "// parser {:?}: {} rules, {} DFA states\n",
            parser.name, parser.rules.len(), parser.dfa.total_states
        ));
        for rule in parser.rules {
            out.push_str(&format!(
                "//   tag {}: {:?}\n",
                rule.tag, rule.regex_text
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_output_for_a_minimal_spec() {
        let input = b"%% %% %% [0-9]+ %{ a %} [a-z]+ %{ b %} %%";
        let output = build(input, false).unwrap();
        assert!(output.contains("pub struct Lexer"));
    }

    #[test]
    fn empty_match_rule_fails_the_build() {
        let input = b"%% %% %% a* %{ a %} %%";
        assert!(matches!(
            build(input, false),
            Err(SpecError::EmptyMatch { .. })
        ));
    }

    #[test]
    fn spec_with_only_named_parsers_fails_for_missing_default() {
        let input = b"%% %% %% %{code%} a %{ x %} %%";
        assert!(matches!(build(input, false), Err(SpecError::NoDefaultParser)));
    }
}
