use std::collections::{BTreeSet, HashMap};

use crate::label::ByteClass;
use crate::nfa::NFA;
use crate::table::Table;

/// A deterministic finite automaton over a byte alphabet: at most one
/// transition per `(state, byte)`.
#[derive(Debug, Clone)]
pub struct DFA<T> {
    pub initial_state: usize,
    pub total_states: usize,
    /// Accepting states mapped to the tag of the rule they accept (the
    /// numerically smallest tag among the NFA states they were built from,
    /// per the first-rule-wins tie-break).
    pub final_states: HashMap<usize, u32>,
    pub transition: Table<T>,
}

impl<T: ByteClass> Default for DFA<T> {
    fn default() -> Self {
        DFA {
            initial_state: 0,
            total_states: 1,
            final_states: HashMap::new(),
            transition: Table::new(),
        }
    }
}

impl<T: ByteClass> DFA<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_accepting(&self, state: usize) -> bool {
        self.final_states.contains_key(&state)
    }

    pub fn end_tag(&self, state: usize) -> Option<u32> {
        self.final_states.get(&state).copied()
    }

    pub fn step(&self, state: usize, byte: u8) -> Option<usize> {
        self.transition.get(state, byte)
    }
}

/// The product of subset-constructing a DFA out of an NFA: the DFA itself,
/// plus the mapping from each DFA state back to the set of NFA states it
/// represents (used by minimization's tag-aware initial partition and by
/// diagnostics).
pub struct DFAFromNFA<T> {
    pub dfa: DFA<T>,
    pub nfa_mapping: HashMap<usize, BTreeSet<usize>>,
}

impl<T: ByteClass> From<&NFA<T>> for DFAFromNFA<T> {
    fn from(nfa: &NFA<T>) -> Self {
        determinize(nfa)
    }
}

/// Subset construction. Each DFA state is the epsilon-closed
/// subset of NFA states reachable on the same input prefix; the subset's
/// end tag is the smallest tag among its accepting NFA states.
pub fn determinize<T: ByteClass>(nfa: &NFA<T>) -> DFAFromNFA<T> {
    let start = nfa.epsilon_closure([nfa.initial_state]);

    let mut subsets: Vec<BTreeSet<usize>> = Vec::new();
    let mut index: HashMap<BTreeSet<usize>, usize> = HashMap::new();
    let mut final_states = HashMap::new();
    let mut table = Table::new();

    let start_id = intern(&start, &mut subsets, &mut index, nfa, &mut final_states);
    let mut worklist = vec![start_id];
    let mut seen = vec![start_id];

    while let Some(state_id) = worklist.pop() {
        let subset = subsets[state_id].clone();

        // Move-set per byte, then epsilon-close it.
        let mut targets: Vec<Option<BTreeSet<usize>>> = Vec::with_capacity(256);
        for byte in 0u16..=255 {
            let byte = byte as u8;
            let mut moved: BTreeSet<usize> = BTreeSet::new();
            for &s in &subset {
                for d in nfa.step(s, byte) {
                    moved.insert(d);
                }
            }
            if moved.is_empty() {
                targets.push(None);
            } else {
                targets.push(Some(nfa.epsilon_closure(moved)));
            }
        }

        // Coalesce consecutive bytes with an identical closed target set
        // into a single range-labeled transition.
        let mut i = 0usize;
        while i < targets.len() {
            match &targets[i] {
                None => i += 1,
                Some(target) => {
                    let start_byte = i as u8;
                    let mut end_byte = start_byte;
                    let mut j = i + 1;
                    while j < targets.len() && targets[j].as_ref() == Some(target) {
                        end_byte = j as u8;
                        j += 1;
                    }
                    let dest_id =
                        intern(target, &mut subsets, &mut index, nfa, &mut final_states);
                    if !seen.contains(&dest_id) {
                        seen.push(dest_id);
                        worklist.push(dest_id);
                    }
                    table.set(
                        state_id,
                        crate::table::Transition(T::from_range(start_byte, end_byte)),
                        dest_id,
                    );
                    i = j;
                }
            }
        }
    }

    let dfa = DFA {
        initial_state: start_id,
        total_states: subsets.len(),
        final_states,
        transition: table,
    };
    let nfa_mapping = index.into_iter().map(|(set, id)| (id, set)).collect();

    DFAFromNFA { dfa, nfa_mapping }
}

fn intern<T: ByteClass>(
    subset: &BTreeSet<usize>,
    subsets: &mut Vec<BTreeSet<usize>>,
    index: &mut HashMap<BTreeSet<usize>, usize>,
    nfa: &NFA<T>,
    final_states: &mut HashMap<usize, u32>,
) -> usize {
    if let Some(&id) = index.get(subset) {
        return id;
    }
    let id = subsets.len();
    subsets.push(subset.clone());
    index.insert(subset.clone(), id);
    if let Some(tag) = nfa.end_tag(subset) {
        final_states.insert(id, tag);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::test_support::RangeSet;

    /// Builds the NFA for `a(b|c)` with end tag 0, Thompson-style: start
    /// --a--> mid --eps--> {b,c} --> accept.
    fn nfa_a_b_or_c() -> NFA<RangeSet> {
        let mut nfa = NFA::new();
        let mid = nfa.add_state();
        let b_branch = nfa.add_state();
        let c_branch = nfa.add_state();
        let accept = nfa.add_state();

        nfa.add_transition(nfa.initial_state, RangeSet::single(b'a'), mid);
        nfa.add_epsilon_transition(mid, b_branch);
        nfa.add_epsilon_transition(mid, c_branch);
        nfa.add_transition(b_branch, RangeSet::single(b'b'), accept);
        nfa.add_transition(c_branch, RangeSet::single(b'c'), accept);
        nfa.final_states.insert(accept, 0);
        nfa
    }

    #[test]
    fn determinize_accepts_both_branches() {
        let nfa = nfa_a_b_or_c();
        let DFAFromNFA { dfa, .. } = determinize(&nfa);

        let (m, _) = dfa.find(b"ab").expect("ab should match");
        assert_eq!(m.end, 2);
        let (m, _) = dfa.find(b"ac").expect("ac should match");
        assert_eq!(m.end, 2);
        assert!(dfa.find(b"ad").is_none());
    }

    #[test]
    fn determinize_is_deterministic_per_byte() {
        let nfa = nfa_a_b_or_c();
        let DFAFromNFA { dfa, .. } = determinize(&nfa);
        // At most one destination per (state, byte): `step` itself can only
        // ever return one `Option<usize>`, so this is really a type-level
        // guarantee, but walk the reachable states anyway to make sure two
        // different labels never fight over the same byte in `transition`.
        for state in 0..dfa.total_states {
            for byte in 0u16..=255 {
                let _ = dfa.step(state, byte as u8);
            }
        }
    }

    #[test]
    fn first_rule_wins_on_overlapping_accept() {
        // Two single-state-accepting sub-NFAs for the same literal "a",
        // tags 0 and 1, unioned under one start state. Tag 0 must win.
        let mut nfa: NFA<RangeSet> = NFA::new();
        let accept_low = nfa.add_state();
        let accept_high = nfa.add_state();
        nfa.add_transition(nfa.initial_state, RangeSet::single(b'a'), accept_low);
        nfa.add_transition(nfa.initial_state, RangeSet::single(b'a'), accept_high);
        nfa.final_states.insert(accept_low, 0);
        nfa.final_states.insert(accept_high, 1);

        let DFAFromNFA { dfa, .. } = determinize(&nfa);
        let (_, final_state) = dfa.find(b"a").expect("a should match");
        assert_eq!(dfa.end_tag(final_state), Some(0));
    }
}
