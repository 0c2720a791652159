use std::collections::{BTreeSet, HashMap};

use crate::label::ByteClass;

/// A nondeterministic finite automaton over a byte alphabet.
///
/// States are dense integer ids `0..total_states`; there is no pointer
/// graph to own, so the whole automaton is one `NFA` value, freed
/// wholesale when dropped.
#[derive(Debug, Clone)]
pub struct NFA<T> {
    pub initial_state: usize,
    pub total_states: usize,
    pub epsilon_transitions: Vec<(usize, usize)>,
    pub transitions: Vec<(usize, T, usize)>,
    /// Accepting states mapped to the tag of the rule they accept.
    /// A state absent from this map is non-accepting.
    pub final_states: HashMap<usize, u32>,
}

impl<T> Default for NFA<T> {
    fn default() -> Self {
        NFA {
            initial_state: 0,
            total_states: 1,
            epsilon_transitions: Vec::new(),
            transitions: Vec::new(),
            final_states: HashMap::new(),
        }
    }
}

impl<T: ByteClass> NFA<T> {
    /// A one-state NFA whose only state is the (non-accepting) start state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self) -> usize {
        let id = self.total_states;
        self.total_states += 1;
        id
    }

    pub fn add_epsilon_transition(&mut self, src: usize, dst: usize) {
        self.epsilon_transitions.push((src, dst));
    }

    pub fn add_transition(&mut self, src: usize, label: T, dst: usize) {
        self.transitions.push((src, label, dst));
    }

    /// Append a copy of `other`'s states/transitions into `self`, offsetting
    /// every state id by `self.total_states`. Returns the offset applied, so
    /// the caller can translate `other`'s state ids (e.g. its
    /// `initial_state` and `final_states`) into `self`'s id space.
    pub fn copy_into(dest: &mut NFA<T>, src: &NFA<T>) -> usize {
        let offset = dest.total_states;
        dest.total_states += src.total_states;
        for (s, d) in &src.epsilon_transitions {
            dest.epsilon_transitions.push((s + offset, d + offset));
        }
        for (s, label, d) in &src.transitions {
            dest.transitions
                .push((s + offset, label.clone(), d + offset));
        }
        offset
    }

    /// States reachable from any state in `states` via zero or more
    /// epsilon-transitions, including `states` itself.
    pub fn epsilon_closure(&self, states: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
        let mut closure: BTreeSet<usize> = states.into_iter().collect();
        let mut stack: Vec<usize> = closure.iter().copied().collect();
        while let Some(s) = stack.pop() {
            for (from, to) in &self.epsilon_transitions {
                if *from == s && closure.insert(*to) {
                    stack.push(*to);
                }
            }
        }
        closure
    }

    /// States directly reachable from `state` on a transition whose label
    /// contains `byte` (no epsilon-closure applied).
    pub fn step(&self, state: usize, byte: u8) -> Vec<usize> {
        self.transitions
            .iter()
            .filter(|(s, label, _)| *s == state && label.contains(byte))
            .map(|(_, _, d)| *d)
            .collect()
    }

    /// The smallest tag among accepting states in `states`, implementing
    /// the first-rule-wins tie-break.
    pub fn end_tag(&self, states: &BTreeSet<usize>) -> Option<u32> {
        states
            .iter()
            .filter_map(|s| self.final_states.get(s))
            .min()
            .copied()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RangeSet;
    use super::*;

    #[test]
    fn epsilon_closure_follows_chains() {
        let mut nfa: NFA<RangeSet> = NFA::new();
        let s1 = nfa.add_state();
        let s2 = nfa.add_state();
        nfa.add_epsilon_transition(0, s1);
        nfa.add_epsilon_transition(s1, s2);

        let closure = nfa.epsilon_closure([0]);
        assert!(closure.contains(&0));
        assert!(closure.contains(&s1));
        assert!(closure.contains(&s2));
    }

    #[test]
    fn step_only_follows_matching_labels() {
        let mut nfa: NFA<RangeSet> = NFA::new();
        let s1 = nfa.add_state();
        nfa.add_transition(0, RangeSet::single(b'a'), s1);

        assert_eq!(nfa.step(0, b'a'), vec![s1]);
        assert!(nfa.step(0, b'b').is_empty());
    }

    #[test]
    fn end_tag_picks_smallest_tag_in_subset() {
        let mut nfa: NFA<RangeSet> = NFA::new();
        let s1 = nfa.add_state();
        let s2 = nfa.add_state();
        nfa.final_states.insert(s1, 3);
        nfa.final_states.insert(s2, 1);

        let subset = [s1, s2].into_iter().collect();
        assert_eq!(nfa.end_tag(&subset), Some(1));
    }
}
