use std::fmt;

/// A 1-based line/column pair into the spec file being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Location {
    pub line: u32,
    pub col: u32,
}

impl Location {
    pub fn start() -> Self {
        Location { line: 1, col: 1 }
    }

    /// Advance past one input byte: newline increments `line` and resets
    /// `col` to 1, anything else advances `col`.
    pub fn advance(&mut self, byte: u8) {
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
