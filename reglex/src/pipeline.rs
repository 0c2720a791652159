use automata::{dfa::determinize, minimize, DFA, NFA};
use regexp2::{admits_empty, ast_to_nfa, CharClass};

use crate::error::SpecError;
use crate::spec::{ParserSpec, Rule};

/// One parser spec after NFA construction through minimization: everything
/// the code generator needs to emit a matcher for it.
pub struct CompiledParser<'a> {
    pub name: Option<&'a str>,
    pub is_default: bool,
    pub rules: &'a [Rule],
    pub dfa: DFA<CharClass>,
}

/// Thompson-constructs each rule, joins them under one synthetic start,
/// determinizes, minimizes. Rejects any rule whose regex admits the empty
/// string before an NFA is even built, which subsumes the equivalent
/// post-minimization check since a rule that matches ε makes the combined
/// NFA's start state epsilon-reachable to an accepting state, and thus the
/// minimal DFA's start state accepting too.
pub fn compile_parser(parser: &ParserSpec) -> Result<CompiledParser<'_>, SpecError> {
    for rule in &parser.rules {
        if admits_empty(&rule.ast) {
            return Err(SpecError::EmptyMatch {
                location: rule.location,
                tag: rule.tag,
                regex: rule.regex_text.clone(),
            });
        }
    }

    let mut combined: NFA<CharClass> = NFA::new();
    for rule in &parser.rules {
        let rule_nfa = ast_to_nfa(&rule.ast, rule.tag);
        let offset = NFA::copy_into(&mut combined, &rule_nfa);
        combined.add_epsilon_transition(combined.initial_state, offset + rule_nfa.initial_state);
    }

    let determinized = determinize(&combined).dfa;
    let dfa = minimize(&determinized);

    debug_assert!(
        !dfa.is_accepting(dfa.initial_state),
        "per-rule empty-match check above should have already caught this"
    );

    Ok(CompiledParser {
        name: parser.name.as_deref(),
        is_default: parser.is_default,
        rules: &parser.rules,
        dfa,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use regexp2::{Ast, NoReferences, Parser as RegexParser};

    fn rule(regex: &str, tag: u32) -> Rule {
        let ast = RegexParser::new(&NoReferences).parse(regex).unwrap();
        Rule {
            ast,
            regex_text: regex.to_string(),
            action: Vec::new(),
            tag,
            location: crate::location::Location::start(),
        }
    }

    #[test]
    fn compiles_first_rule_wins_on_overlap() {
        let parser = ParserSpec {
            name: None,
            is_default: true,
            rules: vec![rule("[a-z]+", 0), rule("if", 1)],
        };
        let compiled = compile_parser(&parser).unwrap();
        // "if" is matched by both rule 0 ([a-z]+) and rule 1 (if); rule 0
        // wins the tie on the full two-byte prefix.
        let (_, state) = compiled.dfa.find(b"if").unwrap();
        assert_eq!(compiled.dfa.end_tag(state), Some(0));
    }

    #[test]
    fn rejects_empty_matching_rule() {
        let parser = ParserSpec {
            name: None,
            is_default: true,
            rules: vec![rule("a*", 0)],
        };
        assert!(matches!(
            compile_parser(&parser),
            Err(SpecError::EmptyMatch { tag: 0, .. })
        ));
    }

    #[test]
    fn maximal_munch_picks_the_longer_match() {
        let parser = ParserSpec {
            name: None,
            is_default: true,
            rules: vec![rule("if", 0), rule("[a-z]+", 1)],
        };
        let compiled = compile_parser(&parser).unwrap();
        let (m, state) = compiled.dfa.find(b"ifx").unwrap();
        assert_eq!(m.end, 3);
        assert_eq!(compiled.dfa.end_tag(state), Some(1));
    }
}
