use automata::ByteClass;

/// A closed, inclusive range of bytes: `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CharRange {
    pub start: u8,
    pub end: u8,
}

impl CharRange {
    pub fn new(start: u8, end: u8) -> Self {
        assert!(start <= end, "invalid range: {} > {}", start, end);
        CharRange { start, end }
    }

    pub fn new_single(byte: u8) -> Self {
        CharRange {
            start: byte,
            end: byte,
        }
    }

    fn contains(&self, byte: u8) -> bool {
        self.start <= byte && byte <= self.end
    }
}

/// A set of bytes, stored as a sorted list of disjoint closed ranges. This
/// is the edge label used throughout the NFA/DFA pipeline; `automata`
/// itself only ever sees it through the `ByteClass` trait.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharClass {
    pub ranges: Vec<CharRange>,
}

impl CharClass {
    pub fn new() -> Self {
        CharClass { ranges: Vec::new() }
    }

    pub fn new_single(byte: u8) -> Self {
        let mut class = Self::new();
        class.add_range(CharRange::new_single(byte));
        class
    }

    pub fn add_range(&mut self, range: CharRange) {
        self.ranges.push(range);
        self.normalize();
    }

    pub fn copy_into(dest: &mut CharClass, src: &CharClass) {
        dest.ranges.extend(src.ranges.iter().copied());
        dest.normalize();
    }

    fn normalize(&mut self) {
        if self.ranges.is_empty() {
            return;
        }
        self.ranges.sort();
        let mut merged: Vec<CharRange> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if range.start as u16 <= last.end as u16 + 1 => {
                    if range.end > last.end {
                        last.end = range.end;
                    }
                }
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }

    /// Every byte not in `self`, within the full `0..=255` alphabet.
    pub fn complement(&self) -> Self {
        let mut result = CharClass::new();
        let mut next_start: u16 = 0;
        for range in &self.ranges {
            if (range.start as u16) > next_start {
                result
                    .ranges
                    .push(CharRange::new(next_start as u8, range.start - 1));
            }
            next_start = range.end as u16 + 1;
        }
        if next_start <= 255 {
            result.ranges.push(CharRange::new(next_start as u8, 255));
        }
        result
    }

    pub fn all_but_newline() -> Self {
        CharClass::new_single(b'\n').complement()
    }

    pub fn decimal_number() -> Self {
        let mut c = CharClass::new();
        c.add_range(CharRange::new(b'0', b'9'));
        c
    }

    pub fn word() -> Self {
        let mut c = CharClass::new();
        c.add_range(CharRange::new(b'a', b'z'));
        c.add_range(CharRange::new(b'A', b'Z'));
        c.add_range(CharRange::new(b'0', b'9'));
        c.add_range(CharRange::new_single(b'_'));
        c
    }

    pub fn whitespace() -> Self {
        let mut c = CharClass::new();
        c.add_range(CharRange::new_single(b' '));
        c.add_range(CharRange::new(b'\t', b'\r')); // \t \n \v \f \r
        c
    }
}

impl ByteClass for CharClass {
    fn empty() -> Self {
        CharClass::new()
    }

    fn from_range(start: u8, end: u8) -> Self {
        let mut c = CharClass::new();
        c.add_range(CharRange::new(start, end));
        c
    }

    fn contains(&self, byte: u8) -> bool {
        self.ranges.iter().any(|r| r.contains(byte))
    }

    fn union_with(&mut self, other: &Self) {
        CharClass::copy_into(self, other);
    }

    fn ranges(&self) -> Vec<(u8, u8)> {
        self.ranges.iter().map(|r| (r.start, r.end)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_merges_adjacent_and_overlapping_ranges() {
        let mut c = CharClass::new();
        c.add_range(CharRange::new(b'a', b'c'));
        c.add_range(CharRange::new(b'd', b'f')); // adjacent to the above
        c.add_range(CharRange::new(b'b', b'e')); // overlaps both
        assert_eq!(c.ranges, vec![CharRange::new(b'a', b'f')]);
    }

    #[test]
    fn complement_round_trips() {
        let digits = CharClass::decimal_number();
        let not_digits = digits.complement();
        for b in 0u16..=255 {
            let b = b as u8;
            assert_ne!(digits.contains(b), not_digits.contains(b), "byte {}", b);
        }
    }

    #[test]
    fn complement_of_empty_is_everything() {
        let empty = CharClass::new();
        let everything = empty.complement();
        for b in 0u16..=255 {
            assert!(everything.contains(b as u8));
        }
    }
}
