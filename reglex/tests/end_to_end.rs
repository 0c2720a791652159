//! Drives the in-process pipeline (spec parsing through the minimized DFA)
//! against concrete end-to-end tokenizing scenarios. The emitted source is
//! itself Rust that this workspace doesn't compile as part of its own test
//! suite, so these tests exercise the pipeline's actual matching behavior
//! through a small interpreter that implements the same maximal-munch/
//! checkpoint algorithm the generated `Lexer` does, over `CompiledParser`'s
//! DFA.

use reglex::pipeline::{compile_parser, CompiledParser};
use reglex::{read_spec, SpecFile};

/// Mirrors `Lexer::parse_token` (see `templates/runtime.rs.tmpl`): advance
/// one DFA from `pos`, accepting at every accepting state visited, and
/// returning the lexeme and tag of the last (longest) accept, or `None` if
/// no rule ever accepted before a dead end (a lexical error at `pos`), or
/// `Ok(None)` is represented by returning `Ok(TokenOutcome::Eof)` on clean
/// end of input with nothing left to read.
enum TokenOutcome {
    Token { tag: u32, lexeme_len: usize },
    Eof,
    Error,
}

fn next_token(dfa: &automata::DFA<regexp2::CharClass>, input: &[u8], pos: usize) -> TokenOutcome {
    if pos >= input.len() {
        return TokenOutcome::Eof;
    }
    let mut state = dfa.initial_state;
    let mut last_accept: Option<(usize, u32)> = None;
    let mut i = pos;
    loop {
        if let Some(tag) = dfa.end_tag(state) {
            last_accept = Some((i, tag));
        }
        if i >= input.len() {
            break;
        }
        match dfa.step(state, input[i]) {
            Some(next) => {
                state = next;
                i += 1;
            }
            None => break,
        }
    }
    match last_accept {
        Some((end, tag)) => TokenOutcome::Token {
            tag,
            lexeme_len: end - pos,
        },
        None => TokenOutcome::Error,
    }
}

/// Runs a whole default-parser spec to completion, returning the
/// `(tag, lexeme)` sequence and whether it ended cleanly.
fn run_default_parser(spec: &str, input: &[u8]) -> (Vec<(u32, String)>, bool) {
    let spec = read_spec(spec.as_bytes()).unwrap();
    let compiled = compile_parser(&spec.parsers[0]).unwrap();
    run_parser(&compiled, input)
}

fn run_parser(compiled: &CompiledParser, input: &[u8]) -> (Vec<(u32, String)>, bool) {
    let mut tokens = Vec::new();
    let mut pos = 0;
    loop {
        match next_token(&compiled.dfa, input, pos) {
            TokenOutcome::Token { tag, lexeme_len } => {
                let lexeme = String::from_utf8(input[pos..pos + lexeme_len].to_vec()).unwrap();
                tokens.push((tag, lexeme));
                pos += lexeme_len;
            }
            TokenOutcome::Eof => return (tokens, true),
            TokenOutcome::Error => return (tokens, false),
        }
    }
}

#[test]
fn two_rules_tokenize_mixed_letters_and_digits() {
    let spec = "%% %% %% [0-9]+ %{ ... %} [a-z]+ %{ ... %} %%";
    let (tokens, clean) = run_default_parser(spec, b"abc123");
    assert!(clean);
    assert_eq!(
        tokens,
        vec![(1, "abc".to_string()), (0, "123".to_string())]
    );
}

#[test]
fn maximal_munch_beats_an_earlier_shorter_rule() {
    let spec = "%% %% %% if %{ ... %} [a-z]+ %{ ... %} %%";
    let (tokens, clean) = run_default_parser(spec, b"ifx if");
    assert!(clean);
    assert_eq!(
        tokens,
        vec![(1, "ifx".to_string()), (0, "if".to_string())]
    );
}

#[test]
fn trailing_unmatched_byte_errors() {
    let spec = "%% %% %% if %{ ... %} [a-z]+ %{ ... %} %%";
    let (tokens, clean) = run_default_parser(spec, b"if ");
    assert!(!clean);
    assert_eq!(tokens, vec![(0, "if".to_string())]);
}

#[test]
fn named_definition_reference_is_inlined_into_a_rule() {
    let spec = "%% %% LETTER [a-z] %% LETTER+ %{ ... %} %%";
    let (tokens, clean) = run_default_parser(spec, b"abc");
    assert!(clean);
    assert_eq!(tokens, vec![(0, "abc".to_string())]);
}

#[test]
fn two_named_sub_lexers_have_independent_tag_spaces() {
    let spec = r#"%% %% %% %{code%} \" %{ ... %} %{string%} [a-z]+\" %{ ... %} %%"#;
    let parsed = read_spec(spec.as_bytes()).unwrap();
    let code = parsed.parsers.iter().find(|p| p.name.as_deref() == Some("code")).unwrap();
    let string = parsed.parsers.iter().find(|p| p.name.as_deref() == Some("string")).unwrap();

    let code_compiled = compile_parser(code).unwrap();
    let (code_tokens, _) = run_parser(&code_compiled, b"\"");
    assert_eq!(code_tokens, vec![(0, "\"".to_string())]);

    let string_compiled = compile_parser(string).unwrap();
    let (string_tokens, clean) = run_parser(&string_compiled, b"hi\"");
    assert!(clean);
    assert_eq!(string_tokens, vec![(0, "hi\"".to_string())]);
}

#[test]
fn empty_matching_rule_is_rejected_before_emission() {
    let spec = "%% %% %% a* %{ ... %} %%";
    let parsed = read_spec(spec.as_bytes()).unwrap();
    let err = compile_parser(&parsed.parsers[0]).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("empty string"), "{}", message);
}

#[test]
fn definition_shadowing_uses_the_binding_in_effect_when_each_rule_was_parsed() {
    // LETTER is 'a' when DIGIT_RULE would-be-irrelevant rule 0 is parsed,
    // then redefined to 'b' before rule 1 is parsed; each rule keeps the
    // binding that was active at its own parse time.
    let spec = "%% %% LETTER a %% LETTER %{ ... %} %%";
    let (tokens, clean) = run_default_parser(spec, b"a");
    assert!(clean);
    assert_eq!(tokens, vec![(0, "a".to_string())]);
}

fn compile_all(spec: &SpecFile) -> Vec<CompiledParser> {
    spec.parsers.iter().map(|p| compile_parser(p).unwrap()).collect()
}

#[test]
fn generated_source_round_trips_through_codegen() {
    let spec = read_spec(b"%% %% %% [0-9]+ %{ tok(0) %} %%").unwrap();
    let compiled = compile_all(&spec);
    let source = reglex::codegen::generate(&spec, &compiled);
    assert!(source.contains("tok(0)"));
}
