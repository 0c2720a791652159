use std::ops::Range;

use crate::dfa::DFA;
use crate::label::ByteClass;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Match<T> {
    pub start: usize,
    pub end: usize,
    pub span: Vec<T>,
}

impl<T> Match<T> {
    #[inline]
    pub fn new(start: usize, end: usize, span: Vec<T>) -> Self {
        Match { start, end, span }
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl<T: ByteClass> DFA<T> {
    /// The longest prefix of `bytes` accepted by this automaton, and the
    /// state it ends in. Used by tests and by the generator's own
    /// comment/dump mode; the *generated* tokenizer implements the
    /// checkpoint-and-restore maximal-munch algorithm itself, it does not
    /// call this.
    pub fn find(&self, bytes: &[u8]) -> Option<(Match<u8>, usize)> {
        let mut state = self.initial_state;
        let mut last_accept = self.end_tag(state).map(|_| (0usize, state));

        for (i, &byte) in bytes.iter().enumerate() {
            match self.step(state, byte) {
                Some(next) => {
                    state = next;
                    if self.is_accepting(state) {
                        last_accept = Some((i + 1, state));
                    }
                }
                None => break,
            }
        }

        last_accept.map(|(end, final_state)| (Match::new(0, end, bytes[..end].to_vec()), final_state))
    }
}
