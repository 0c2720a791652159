use std::collections::HashMap;

use crate::dfa::DFA;
use crate::label::ByteClass;
use crate::table::{Table, Transition};

/// Partition refinement: the initial partition separates
/// states by `end_tag` (one class per distinct tag, plus one class for all
/// non-accepting states), then classes are split until no class contains
/// two states with different `(byte -> class)` signatures.
///
/// This is the textbook Moore-style fixpoint, not Hopcroft's O(n log n)
/// formulation; generator-scale automata don't need the asymptotics, and
/// the textbook version is easier to convince yourself is correct.
pub fn minimize<T: ByteClass>(dfa: &DFA<T>) -> DFA<T> {
    let mut class_of: Vec<usize> = vec![0; dfa.total_states];
    let mut classes: Vec<Vec<usize>> = Vec::new();

    {
        let mut by_tag: HashMap<Option<u32>, Vec<usize>> = HashMap::new();
        for state in 0..dfa.total_states {
            by_tag.entry(dfa.end_tag(state)).or_default().push(state);
        }
        for states in by_tag.into_values() {
            let class_id = classes.len();
            for &s in &states {
                class_of[s] = class_id;
            }
            classes.push(states);
        }
    }

    loop {
        let signature = |state: usize| -> Vec<Option<usize>> {
            (0u16..=255)
                .map(|b| dfa.step(state, b as u8).map(|d| class_of[d]))
                .collect()
        };

        let mut next_classes: Vec<Vec<usize>> = Vec::new();
        let mut next_class_of = vec![0usize; dfa.total_states];
        let mut split = false;

        for states in &classes {
            let mut groups: Vec<(Vec<Option<usize>>, Vec<usize>)> = Vec::new();
            for &s in states {
                let sig = signature(s);
                match groups.iter_mut().find(|(g, _)| *g == sig) {
                    Some((_, members)) => members.push(s),
                    None => groups.push((sig, vec![s])),
                }
            }
            if groups.len() > 1 {
                split = true;
            }
            for (_, members) in groups {
                let class_id = next_classes.len();
                for &s in &members {
                    next_class_of[s] = class_id;
                }
                next_classes.push(members);
            }
        }

        classes = next_classes;
        class_of = next_class_of;

        if !split {
            break;
        }
    }

    let initial_state = class_of[dfa.initial_state];
    let total_states = classes.len();

    let mut final_states = HashMap::new();
    for (class_id, states) in classes.iter().enumerate() {
        if let Some(tag) = dfa.end_tag(states[0]) {
            final_states.insert(class_id, tag);
        }
    }

    let mut table: Table<T> = Table::new();
    for (class_id, states) in classes.iter().enumerate() {
        let representative = states[0];
        let targets: Vec<Option<usize>> = (0u16..=255)
            .map(|b| dfa.step(representative, b as u8).map(|d| class_of[d]))
            .collect();

        let mut i = 0usize;
        while i < targets.len() {
            match targets[i] {
                None => i += 1,
                Some(dest_class) => {
                    let start_byte = i as u8;
                    let mut end_byte = start_byte;
                    let mut j = i + 1;
                    while j < targets.len() && targets[j] == Some(dest_class) {
                        end_byte = j as u8;
                        j += 1;
                    }
                    table.set(
                        class_id,
                        Transition(T::from_range(start_byte, end_byte)),
                        dest_class,
                    );
                    i = j;
                }
            }
        }
    }

    DFA {
        initial_state,
        total_states,
        final_states,
        transition: table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::determinize;
    use crate::nfa::test_support::RangeSet;
    use crate::nfa::NFA;

    /// `a+` as two NFA states with a self-loop, tag 0. Determinizing this
    /// produces two redundant accepting states (the loop revisits the same
    /// subset); minimization should collapse them.
    fn nfa_a_plus() -> NFA<RangeSet> {
        let mut nfa = NFA::new();
        let mid = nfa.add_state();
        let loop_state = nfa.add_state();
        nfa.add_transition(nfa.initial_state, RangeSet::single(b'a'), mid);
        nfa.add_epsilon_transition(mid, loop_state);
        nfa.add_transition(loop_state, RangeSet::single(b'a'), mid);
        nfa.final_states.insert(mid, 0);
        nfa
    }

    #[test]
    fn minimize_preserves_language() {
        let nfa = nfa_a_plus();
        let determinized = determinize(&nfa).dfa;
        let minimized = minimize(&determinized);

        for input in [&b"a"[..], b"aa", b"aaaa", b"", b"b", b"ab"] {
            let before = determinized.find(input).map(|(m, _)| m.end);
            let after = minimized.find(input).map(|(m, _)| m.end);
            assert_eq!(before, after, "mismatch on {:?}", input);
        }
    }

    #[test]
    fn minimize_is_idempotent() {
        let nfa = nfa_a_plus();
        let determinized = determinize(&nfa).dfa;
        let once = minimize(&determinized);
        let twice = minimize(&once);

        assert_eq!(once.total_states, twice.total_states);
        assert_eq!(once.final_states, twice.final_states);
    }

    #[test]
    fn minimize_never_leaves_an_accepting_start_state_unaccepting() {
        // Minimization must not change whether the start state accepts;
        // that's the empty-match check's job, not this pass's.
        let mut nfa: NFA<RangeSet> = NFA::new();
        nfa.final_states.insert(nfa.initial_state, 0);
        let determinized = determinize(&nfa).dfa;
        let minimized = minimize(&determinized);
        assert!(minimized.is_accepting(minimized.initial_state));
    }
}
