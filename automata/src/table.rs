use crate::label::ByteClass;

/// An edge label together with a marker newtype, mirroring the shape of a
/// single `(state, label, state)` triple as it is set into a [`Table`].
#[derive(Debug, Clone)]
pub struct Transition<T>(pub T);

/// A sparse, range-compressed transition table: for each source state, a
/// list of `(label, destination)` pairs. At most one pair's label may
/// contain any given byte (the "deterministic" invariant `DFA` relies on);
/// `Table` itself does not enforce this, callers build it correctly by
/// construction (subset construction, see `dfa::determinize`).
#[derive(Debug, Clone, Default)]
pub struct Table<T> {
    entries: Vec<(usize, T, usize)>,
}

impl<T: ByteClass> Table<T> {
    pub fn new() -> Self {
        Table {
            entries: Vec::new(),
        }
    }

    pub fn set(&mut self, src: usize, label: Transition<T>, dst: usize) {
        self.entries.push((src, label.0, dst));
    }

    /// The destination state for `(src, byte)`, if any transition matches.
    pub fn get(&self, src: usize, byte: u8) -> Option<usize> {
        self.entries
            .iter()
            .find(|(s, label, _)| *s == src && label.contains(byte))
            .map(|(_, _, d)| *d)
    }

    /// All outgoing `(label, destination)` pairs from `src`, in insertion
    /// order.
    pub fn transitions_from(&self, src: usize) -> impl Iterator<Item = (&T, usize)> {
        self.entries
            .iter()
            .filter(move |(s, _, _)| *s == src)
            .map(|(_, label, d)| (label, *d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> IntoIterator for Table<T> {
    type Item = (usize, Transition<T>, usize);
    type IntoIter = std::vec::IntoIter<(usize, Transition<T>, usize)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .into_iter()
            .map(|(s, label, d)| (s, Transition(label), d))
            .collect::<Vec<_>>()
            .into_iter()
    }
}
