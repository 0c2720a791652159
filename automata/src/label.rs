/// A set of bytes usable as an edge label in an [`crate::nfa::NFA`] or
/// [`crate::dfa::DFA`].
///
/// `automata` never looks inside a label beyond this trait: concrete
/// character-class representations (ASCII ranges, negated classes, …) live
/// in `regexp2`, which is the crate that actually builds labels out of
/// regex syntax.
pub trait ByteClass: Clone + Eq + std::fmt::Debug {
    /// An empty class that matches nothing.
    fn empty() -> Self;

    /// A class containing exactly the closed range `start..=end`.
    fn from_range(start: u8, end: u8) -> Self;

    /// Whether `byte` is a member of this class.
    fn contains(&self, byte: u8) -> bool;

    /// Add every byte of `other` to `self`.
    fn union_with(&mut self, other: &Self);

    /// The class as a minimal set of disjoint, sorted, closed ranges.
    /// The generator walks this to emit range-compressed dispatch.
    fn ranges(&self) -> Vec<(u8, u8)>;
}
