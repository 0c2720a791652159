use std::{error, fmt, result};

use crate::ast::{Ast, NameResolver};
use crate::class::{CharClass, CharRange};

pub type Result<T> = result::Result<T, ParseError>;

/// A shift-reduce regex parser producing an `Ast`. The operator precedence
/// and reduction rules are a direct generalization of a classic
/// two-stack (operand stack + operator stack) regex parser: concatenation
/// is implicit (inserted between adjacent atoms), the four postfix/infix
/// operators `* + ? |` each have their own precedence, and parentheses
/// group. Bareword identifiers are the one addition to plain regex syntax:
/// a maximal run of `[A-Za-z0-9_]` is looked up against `resolver` as a
/// whole; if it resolves it is inlined as a single atom, otherwise each of
/// its bytes is re-scanned as an individual literal -- a named reference
/// by bare identifier, without requiring a separating syntax like `{name}`.
pub struct Parser<'a> {
    resolver: &'a dyn NameResolver,
}

impl<'a> Parser<'a> {
    pub fn new(resolver: &'a dyn NameResolver) -> Self {
        Parser { resolver }
    }

    pub fn parse(&self, expr: &str) -> Result<Ast> {
        let mut state = ParserState::new(self.resolver);
        let bytes = expr.as_bytes();
        let mut pos = 0usize;

        while pos < bytes.len() {
            let c = bytes[pos];
            pos += 1;

            match c {
                b'|' => {
                    if state.escaped {
                        state.escaped = false;
                        state.handle_escaped_literal(c)?;
                    } else if state.in_char_class {
                        state.append_char_range_buf(c);
                    } else {
                        state.handle_union()?;
                    }
                }
                b'*' => {
                    if state.escaped {
                        state.escaped = false;
                        state.handle_escaped_literal(c)?;
                    } else if state.in_char_class {
                        state.append_char_range_buf(c);
                    } else {
                        state.handle_kleene_star()?;
                    }
                }
                b'+' => {
                    if state.escaped {
                        state.escaped = false;
                        state.handle_escaped_literal(c)?;
                    } else if state.in_char_class {
                        state.append_char_range_buf(c);
                    } else {
                        state.handle_plus()?;
                    }
                }
                b'?' => {
                    if state.escaped {
                        state.escaped = false;
                        state.handle_escaped_literal(c)?;
                    } else if state.in_char_class {
                        state.append_char_range_buf(c);
                    } else {
                        state.handle_optional()?;
                    }
                }
                b'(' => {
                    if state.escaped {
                        state.escaped = false;
                        state.handle_escaped_literal(c)?;
                    } else if state.in_char_class {
                        state.append_char_range_buf(c);
                    } else {
                        state.handle_left_paren()?;
                    }
                }
                b')' => {
                    if state.escaped {
                        state.escaped = false;
                        state.handle_escaped_literal(c)?;
                    } else if state.in_char_class {
                        state.append_char_range_buf(c);
                    } else {
                        state.handle_right_paren()?;
                    }
                }
                b'[' => {
                    if state.in_char_class {
                        state.append_char_range_buf(c);
                    } else if state.escaped {
                        state.escaped = false;
                        state.handle_literal_byte(c)?;
                    } else {
                        state.in_char_class = true;
                        state.clear_char_class_buf();
                    }
                }
                b']' => {
                    if state.escaped {
                        state.escaped = false;
                        state.handle_escaped_literal(c)?;
                    } else if state.in_char_class {
                        state.handle_right_bracket()?;
                    } else {
                        state.handle_literal_byte(c)?;
                    }
                }
                b'\\' => {
                    if state.escaped {
                        state.escaped = false;
                        state.handle_literal_byte(c)?;
                    } else {
                        state.escaped = true;
                    }
                }
                b'^' => {
                    if state.escaped {
                        state.escaped = false;
                        state.handle_escaped_literal(c)?;
                    } else if state.in_char_class {
                        if state.char_range_buf.is_empty() && state.char_class_buf.0.ranges.is_empty() {
                            state.char_class_buf.1 = true;
                        } else {
                            state.append_char_range_buf(c);
                        }
                    } else {
                        state.handle_literal_byte(c)?;
                    }
                }
                b'.' => {
                    if state.escaped {
                        state.escaped = false;
                        state.handle_escaped_literal(c)?;
                    } else if state.in_char_class {
                        state.append_char_range_buf(c);
                    } else {
                        state.handle_char_class(CharClass::all_but_newline())?;
                    }
                }
                _ if state.escaped => {
                    state.escaped = false;
                    let special = match c {
                        b'd' => Some(CharClass::decimal_number()),
                        b'D' => Some(CharClass::decimal_number().complement()),
                        b'w' => Some(CharClass::word()),
                        b'W' => Some(CharClass::word().complement()),
                        b'n' => Some(CharClass::new_single(b'\n')),
                        b't' => Some(CharClass::new_single(b'\t')),
                        b'r' => Some(CharClass::new_single(b'\r')),
                        b's' => Some(CharClass::whitespace()),
                        b'S' => Some(CharClass::whitespace().complement()),
                        _ => None,
                    };
                    match special {
                        Some(class) if state.in_char_class => {
                            state.handle_incomplete_char_range_buf();
                            CharClass::copy_into(&mut state.char_class_buf.0, &class);
                        }
                        Some(class) => state.handle_char_class(class)?,
                        None if state.in_char_class => state.append_char_range_buf(c),
                        None => state.handle_literal_byte(c)?,
                    }
                }
                _ if state.in_char_class => {
                    state.append_char_range_buf(c);
                }
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' => {
                    let start = pos - 1;
                    let mut end = pos;
                    while end < bytes.len() && is_ident_byte(bytes[end]) {
                        end += 1;
                    }
                    let name = std::str::from_utf8(&bytes[start..end])
                        .expect("identifier bytes are ASCII by construction");
                    match self.resolver.resolve(name) {
                        Some(ast) => {
                            state.handle_reference(ast)?;
                            pos = end;
                        }
                        None => {
                            // Not a known name: only the first byte is
                            // literal, the rest is re-scanned byte by byte
                            // (so "if" with no definition named "if" or
                            // "i" is two concatenated single-char
                            // literals).
                            state.handle_literal_byte(c)?;
                        }
                    }
                }
                _ => state.handle_literal_byte(c)?,
            }
        }

        if expr.is_empty() {
            state.op_stack.push(Operator::EmptyPlaceholder);
        }

        while !state.op_stack.is_empty() {
            state.reduce_stack()?;
        }

        state.stack.pop().ok_or(ParseError::EmptyExpression)
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Union,
    Concatenation,
    KleeneStar,
    Plus,
    Optional,
    LeftParen,
    EmptyPlaceholder,
}

struct CharRangeBuf(Option<u8>, Option<u8>, Option<u8>);

impl CharRangeBuf {
    fn new() -> Self {
        CharRangeBuf(None, None, None)
    }

    fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    fn clear(&mut self) {
        self.0 = None;
        self.1 = None;
        self.2 = None;
    }
}

struct ParserState<'a> {
    stack: Vec<Ast>,
    op_stack: Vec<Operator>,
    paren_count_stack: Vec<usize>,

    escaped: bool,
    insert_concat: bool,

    in_char_class: bool,
    char_class_buf: (CharClass, bool),
    char_range_buf: CharRangeBuf,

    resolver: &'a dyn NameResolver,
}

impl<'a> ParserState<'a> {
    fn new(resolver: &'a dyn NameResolver) -> Self {
        ParserState {
            stack: Vec::new(),
            op_stack: Vec::new(),
            paren_count_stack: Vec::new(),
            escaped: false,
            insert_concat: false,
            in_char_class: false,
            char_class_buf: (CharClass::new(), false),
            char_range_buf: CharRangeBuf::new(),
            resolver,
        }
    }

    fn handle_literal_byte(&mut self, c: u8) -> Result<()> {
        if self.in_char_class {
            self.append_char_range_buf(c);
            Ok(())
        } else {
            self.handle_char_class(CharClass::new_single(c))
        }
    }

    fn handle_escaped_literal(&mut self, c: u8) -> Result<()> {
        if self.in_char_class {
            self.append_char_range_buf(c);
            Ok(())
        } else {
            self.handle_char_class(CharClass::new_single(c))
        }
    }

    fn handle_char_class(&mut self, class: CharClass) -> Result<()> {
        while self.precedence_reduce_stack(&Operator::Concatenation)? {}

        if self.insert_concat {
            self.op_stack.push(Operator::Concatenation);
        }

        self.stack.push(Ast::Class(class));
        self.insert_concat = true;
        Ok(())
    }

    fn handle_reference(&mut self, ast: Ast) -> Result<()> {
        while self.precedence_reduce_stack(&Operator::Concatenation)? {}

        if self.insert_concat {
            self.op_stack.push(Operator::Concatenation);
        }

        self.stack.push(ast);
        self.insert_concat = true;
        Ok(())
    }

    fn handle_union(&mut self) -> Result<()> {
        let op = Operator::Union;
        self.precedence_reduce_stack(&op)?;
        self.op_stack.push(op);
        self.insert_concat = false;
        Ok(())
    }

    fn handle_kleene_star(&mut self) -> Result<()> {
        let op = Operator::KleeneStar;
        self.precedence_reduce_stack(&op)?;
        self.op_stack.push(op);
        self.insert_concat = true;
        Ok(())
    }

    fn handle_plus(&mut self) -> Result<()> {
        let op = Operator::Plus;
        self.precedence_reduce_stack(&op)?;
        self.op_stack.push(op);
        self.insert_concat = true;
        Ok(())
    }

    fn handle_optional(&mut self) -> Result<()> {
        let op = Operator::Optional;
        self.precedence_reduce_stack(&op)?;
        self.op_stack.push(op);
        self.insert_concat = true;
        Ok(())
    }

    fn handle_left_paren(&mut self) -> Result<()> {
        let op = Operator::LeftParen;
        self.precedence_reduce_stack(&op)?;

        if self.insert_concat {
            self.op_stack.push(Operator::Concatenation);
        }

        self.op_stack.push(op);
        self.paren_count_stack.push(self.stack.len());
        self.insert_concat = false;
        Ok(())
    }

    fn handle_right_paren(&mut self) -> Result<()> {
        let last_op = self
            .op_stack
            .last()
            .ok_or(ParseError::UnbalancedOperators)?;
        let prev_node_count = self
            .paren_count_stack
            .last()
            .ok_or(ParseError::UnbalancedParentheses)?;

        if *last_op == Operator::LeftParen && *prev_node_count == self.stack.len() {
            self.op_stack.pop().ok_or(ParseError::UnbalancedOperators)?;
            self.op_stack.push(Operator::EmptyPlaceholder);
            self.reduce_stack()?;
        } else {
            while !self.op_stack.is_empty() && *self.op_stack.last().unwrap() != Operator::LeftParen {
                self.reduce_stack()?;
            }
            self.op_stack.pop().ok_or(ParseError::UnbalancedOperators)?;
        }
        self.paren_count_stack
            .pop()
            .ok_or(ParseError::UnbalancedParentheses)?;

        self.insert_concat = true;
        Ok(())
    }

    fn handle_right_bracket(&mut self) -> Result<()> {
        self.in_char_class = false;

        if self.char_range_buf.is_empty() && self.char_class_buf.0.ranges.is_empty() {
            return Err(ParseError::EmptyCharacterClass);
        }

        self.handle_incomplete_char_range_buf();

        let class = if self.char_class_buf.1 {
            self.char_class_buf.0.complement()
        } else {
            self.char_class_buf.0.clone()
        };
        self.handle_char_class(class)?;
        self.clear_char_class_buf();
        Ok(())
    }

    fn handle_incomplete_char_range_buf(&mut self) {
        if let Some(s) = self.char_range_buf.0 {
            self.char_class_buf.0.add_range(CharRange::new_single(s));
            if let Some(s) = self.char_range_buf.1 {
                self.char_class_buf.0.add_range(CharRange::new_single(s));
            }
        }
        self.char_range_buf.clear();
    }

    /// Only called while `in_char_class`; escaping of `]` is handled by the
    /// caller before this runs.
    fn append_char_range_buf(&mut self, c: u8) {
        if self.char_range_buf.0.is_none() {
            self.char_range_buf.0 = Some(c);
        } else if self.char_range_buf.1.is_none() {
            if c == b'-' {
                self.char_range_buf.1 = Some(c);
            } else {
                let start = self.char_range_buf.0.unwrap();
                self.char_class_buf.0.add_range(CharRange::new_single(start));
                self.char_range_buf.clear();
                self.append_char_range_buf(c);
            }
        } else if self.char_range_buf.2.is_none() {
            let start = self.char_range_buf.0.unwrap();
            self.char_class_buf.0.add_range(CharRange::new(start, c));
            self.char_range_buf.clear();
        }
    }

    fn clear_char_class_buf(&mut self) {
        self.char_class_buf = (CharClass::new(), false);
    }

    fn reduce_stack(&mut self) -> Result<()> {
        let op = self.op_stack.pop().ok_or(ParseError::UnbalancedOperators)?;
        match op {
            Operator::EmptyPlaceholder => {
                // Nothing to combine; used to unwind a redundant `()`.
            }
            Operator::LeftParen => return Err(ParseError::UnbalancedParentheses),
            Operator::KleeneStar | Operator::Plus | Operator::Optional => {
                let operand = self.stack.pop().ok_or(ParseError::UnbalancedOperators)?;
                let node = match op {
                    Operator::KleeneStar => Ast::Star(Box::new(operand)),
                    Operator::Plus => Ast::Plus(Box::new(operand)),
                    Operator::Optional => Ast::Optional(Box::new(operand)),
                    _ => unreachable!(),
                };
                self.stack.push(node);
            }
            Operator::Concatenation | Operator::Union => {
                let rhs = self.stack.pop().ok_or(ParseError::UnbalancedOperators)?;
                let lhs = self.stack.pop().ok_or(ParseError::UnbalancedOperators)?;
                let node = match op {
                    Operator::Concatenation => flatten_concat(lhs, rhs),
                    Operator::Union => flatten_union(lhs, rhs),
                    _ => unreachable!(),
                };
                self.stack.push(node);
            }
        }
        Ok(())
    }

    fn precedence_reduce_stack(&mut self, op: &Operator) -> Result<bool> {
        let reduce = match self.op_stack.last() {
            Some(last_op) => {
                if last_op == op && *last_op != Operator::LeftParen {
                    true
                } else if *op == Operator::Union {
                    matches!(
                        last_op,
                        Operator::Concatenation
                            | Operator::KleeneStar
                            | Operator::Plus
                            | Operator::Optional
                    )
                } else if *op == Operator::Concatenation {
                    matches!(
                        last_op,
                        Operator::KleeneStar | Operator::Plus | Operator::Optional
                    )
                } else if matches!(
                    op,
                    Operator::KleeneStar | Operator::Plus | Operator::Optional
                ) {
                    false
                } else if *op == Operator::LeftParen {
                    matches!(
                        last_op,
                        Operator::KleeneStar | Operator::Plus | Operator::Optional
                    )
                } else {
                    false
                }
            }
            None => false,
        };

        if reduce {
            self.reduce_stack()?;
        }
        Ok(reduce)
    }
}

fn flatten_concat(lhs: Ast, rhs: Ast) -> Ast {
    match (lhs, rhs) {
        (Ast::Concat(mut parts), rhs) => {
            parts.push(rhs);
            Ast::Concat(parts)
        }
        (lhs, rhs) => Ast::Concat(vec![lhs, rhs]),
    }
}

fn flatten_union(lhs: Ast, rhs: Ast) -> Ast {
    match (lhs, rhs) {
        (Ast::Union(mut alts), rhs) => {
            alts.push(rhs);
            Ast::Union(alts)
        }
        (lhs, rhs) => Ast::Union(vec![lhs, rhs]),
    }
}

#[derive(Debug)]
pub enum ParseError {
    UnbalancedOperators,
    UnbalancedParentheses,
    EmptyCharacterClass,
    EmptyExpression,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnbalancedOperators => write!(f, "unbalanced operators"),
            Self::UnbalancedParentheses => write!(f, "unbalanced parentheses"),
            Self::EmptyCharacterClass => write!(f, "empty character class"),
            Self::EmptyExpression => write!(f, "empty regular expression"),
        }
    }
}

impl error::Error for ParseError {}
