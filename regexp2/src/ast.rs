use automata::NFA;

use crate::class::CharClass;

/// A regular expression, already fully resolved: a bareword reference never
/// survives parsing. The parser inlines a resolved definition's `Ast` in
/// place the moment it recognizes the name, so by the time an `Ast` leaves
/// `parser::parse`, it contains only these six shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Class(CharClass),
    Concat(Vec<Ast>),
    Union(Vec<Ast>),
    Star(Box<Ast>),
    Plus(Box<Ast>),
    Optional(Box<Ast>),
}

/// Supplies the parser with the current regular-definition table: what a
/// bareword identifier resolves to, if anything. Implementations own the
/// "latest-defined-first" shadowing lookup and the occurs-check against
/// cyclic self-reference; `regexp2` only calls `resolve`.
pub trait NameResolver {
    fn resolve(&self, name: &str) -> Option<Ast>;
}

/// A resolver under which no bareword ever names a definition -- every
/// letter run is literal text. Used before any definitions exist, and in
/// standalone tests of the regex parser.
pub struct NoReferences;

impl NameResolver for NoReferences {
    fn resolve(&self, _name: &str) -> Option<Ast> {
        None
    }
}

/// Thompson construction: build a standalone NFA for `ast`, with its
/// unique accepting state tagged `tag`.
pub fn ast_to_nfa(ast: &Ast, tag: u32) -> NFA<CharClass> {
    let mut nfa = NFA::new();
    let (start, accept) = build(&mut nfa, ast);
    nfa.add_epsilon_transition(nfa.initial_state, start);
    nfa.final_states.insert(accept, tag);
    nfa
}

/// Recursively wires `ast` into `nfa`, returning the `(start, accept)`
/// states of the fragment just added. Every fragment has exactly one
/// accepting state; composition is done purely with epsilon-transitions
/// stitching fragments together, the textbook Thompson construction.
fn build(nfa: &mut NFA<CharClass>, ast: &Ast) -> (usize, usize) {
    match ast {
        Ast::Class(class) => {
            let start = nfa.add_state();
            let accept = nfa.add_state();
            nfa.add_transition(start, class.clone(), accept);
            (start, accept)
        }
        Ast::Concat(parts) => {
            let mut parts = parts.iter();
            let first = parts
                .next()
                .expect("Concat with no parts should not occur: an empty match is rejected before NFA construction");
            let (mut start, mut accept) = build(nfa, first);
            let concat_start = start;
            for part in parts {
                let (next_start, next_accept) = build(nfa, part);
                nfa.add_epsilon_transition(accept, next_start);
                start = next_start;
                accept = next_accept;
            }
            (concat_start, accept)
        }
        Ast::Union(alts) => {
            let start = nfa.add_state();
            let accept = nfa.add_state();
            for alt in alts {
                let (alt_start, alt_accept) = build(nfa, alt);
                nfa.add_epsilon_transition(start, alt_start);
                nfa.add_epsilon_transition(alt_accept, accept);
            }
            (start, accept)
        }
        Ast::Star(inner) => {
            let start = nfa.add_state();
            let accept = nfa.add_state();
            let (inner_start, inner_accept) = build(nfa, inner);
            nfa.add_epsilon_transition(start, inner_start);
            nfa.add_epsilon_transition(start, accept);
            nfa.add_epsilon_transition(inner_accept, inner_start);
            nfa.add_epsilon_transition(inner_accept, accept);
            (start, accept)
        }
        Ast::Plus(inner) => {
            let start = nfa.add_state();
            let accept = nfa.add_state();
            let (inner_start, inner_accept) = build(nfa, inner);
            nfa.add_epsilon_transition(start, inner_start);
            nfa.add_epsilon_transition(inner_accept, inner_start);
            nfa.add_epsilon_transition(inner_accept, accept);
            (start, accept)
        }
        Ast::Optional(inner) => {
            let start = nfa.add_state();
            let accept = nfa.add_state();
            let (inner_start, inner_accept) = build(nfa, inner);
            nfa.add_epsilon_transition(start, inner_start);
            nfa.add_epsilon_transition(start, accept);
            nfa.add_epsilon_transition(inner_accept, accept);
            (start, accept)
        }
    }
}

/// Whether `ast` can match the empty string -- used to reject empty-match
/// rules before an NFA is even built, so the diagnostic can point at the
/// rule's regex rather than an automaton state.
pub fn admits_empty(ast: &Ast) -> bool {
    match ast {
        Ast::Class(_) => false,
        Ast::Concat(parts) => parts.iter().all(admits_empty),
        Ast::Union(alts) => alts.iter().any(admits_empty),
        Ast::Star(_) => true,
        Ast::Plus(inner) => admits_empty(inner),
        Ast::Optional(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use automata::dfa::determinize;

    fn lit(b: u8) -> Ast {
        Ast::Class(CharClass::new_single(b))
    }

    #[test]
    fn thompson_construction_matches_concatenation() {
        let ast = Ast::Concat(vec![lit(b'a'), lit(b'b')]);
        let nfa = ast_to_nfa(&ast, 0);
        let dfa = determinize(&nfa).dfa;
        let (m, _) = dfa.find(b"ab").unwrap();
        assert_eq!(m.end, 2);
        assert!(dfa.find(b"a").is_none());
    }

    #[test]
    fn thompson_construction_matches_star() {
        let ast = Ast::Star(Box::new(lit(b'a')));
        let nfa = ast_to_nfa(&ast, 0);
        let dfa = determinize(&nfa).dfa;
        assert_eq!(dfa.find(b"").unwrap().0.end, 0);
        assert_eq!(dfa.find(b"aaa").unwrap().0.end, 3);
        assert_eq!(dfa.find(b"aaab").unwrap().0.end, 3);
    }

    #[test]
    fn admits_empty_detects_star_and_optional_but_not_plus() {
        let a = lit(b'a');
        assert!(admits_empty(&Ast::Star(Box::new(a.clone()))));
        assert!(admits_empty(&Ast::Optional(Box::new(a.clone()))));
        assert!(!admits_empty(&Ast::Plus(Box::new(a))));
    }
}
