//! Formula scanner and recursive-descent parser.
//!
//! Grammar (spaces are skipped between tokens):
//!
//! ```text
//! expr      := term ( '+' term )*
//! term      := number | cellref | constref | name '(' arg ( ',' arg )* ')'
//! arg       := range | expr
//! cellref   := LETTER DIGIT+ | DIRCHAR DIGIT*
//! range     := cellref ':' cellref
//! constref  := '$' cellref
//! ```
//!
//! Relative references (`^ > v <` with an optional step count) are resolved
//! against the position of the cell being parsed, so the tree only ever holds
//! concrete positions. Nodes are allocated into the table's [`ExprArena`].

use std::fmt;

use super::expr::{ExprArena, ExprId, Expression};
use super::position::{CellPosition, Direction, Range};
use crate::error::ParseError;

/// Function calls nested deeper than this are rejected.
const MAX_CALL_NESTING: usize = 64;

/// Parse formula text (without the leading `=`) written in the cell at `origin`.
pub fn parse_formula(
    text: &str,
    origin: CellPosition,
    arena: &mut ExprArena,
) -> Result<ExprId, ParseError> {
    let mut parser = Parser::new(text, origin, arena)?;
    let root = parser.parse_expression()?;
    match parser.lookahead {
        Token::End => Ok(root),
        ref token => Err(ParseError::UnexpectedToken {
            found: token.to_string(),
            expected: "operator",
        }),
    }
}

/// Parse the text after a clone marker `:`, e.g. `^`, `v3`, `>2`.
pub fn parse_clone(text: &str) -> Result<(Direction, usize), ParseError> {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return Err(ParseError::NoCloneDirection);
    };
    let direction =
        Direction::from_char(first).ok_or_else(|| ParseError::InvalidCloneDirection(text.to_string()))?;

    let rest = chars.as_str().trim();
    if rest.is_empty() {
        return Ok((direction, 1));
    }
    match rest.parse::<usize>() {
        Ok(offset) if offset > 0 => Ok((direction, offset)),
        _ => Err(ParseError::InvalidCloneOffset(rest.to_string())),
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Plus,
    LParen,
    RParen,
    Comma,
    Number(f64),
    Cell(CellPosition),
    Pinned(CellPosition),
    Range(Range),
    Name(String),
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Plus => write!(f, "'+'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Number(n) => write!(f, "'{}'", n),
            Token::Cell(pos) => write!(f, "'{}'", pos),
            Token::Pinned(pos) => write!(f, "'${}'", pos),
            Token::Range(range) => write!(f, "'{}'", range),
            Token::Name(name) => write!(f, "'{}'", name),
            Token::End => write!(f, "end of formula"),
        }
    }
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    origin: CellPosition,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, origin: CellPosition) -> Self {
        Scanner {
            text,
            pos: 0,
            origin,
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.text[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Consume characters while `pred` holds and return them.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.text[start..self.pos]
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.take_while(|c| c == ' ' || c == '\t');
        let Some(c) = self.peek() else {
            return Ok(Token::End);
        };

        match c {
            '+' => {
                self.bump();
                Ok(Token::Plus)
            }
            '(' => {
                self.bump();
                Ok(Token::LParen)
            }
            ')' => {
                self.bump();
                Ok(Token::RParen)
            }
            ',' => {
                self.bump();
                Ok(Token::Comma)
            }
            '$' => {
                self.bump();
                let pos = self.scan_reference()?;
                if self.peek() == Some(':') {
                    return Err(ParseError::PinnedRange);
                }
                Ok(Token::Pinned(pos))
            }
            '0'..='9' | '.' => self.scan_number(),
            // `v` doubles as the "down" marker; a following letter makes it a name.
            'v' if self.peek_second().is_some_and(|c| c.is_ascii_alphabetic() || c == '_') => {
                self.scan_name()
            }
            '^' | '>' | 'v' | '<' => self.scan_reference_or_range(),
            'A'..='Z' if self.peek_second().is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_reference_or_range()
            }
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_name(),
            c => Err(ParseError::UnexpectedChar(c)),
        }
    }

    fn scan_number(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.take_while(|c| c.is_ascii_digit() || c == '.');
        self.take_while(is_name_char);
        let text = &self.text[start..self.pos];
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ParseError::MalformedNumber(text.to_string()))
    }

    fn scan_name(&mut self) -> Result<Token, ParseError> {
        let name = self.take_while(is_name_char);
        Ok(Token::Name(name.to_string()))
    }

    fn scan_reference_or_range(&mut self) -> Result<Token, ParseError> {
        let start = self.scan_reference()?;
        if self.peek() != Some(':') {
            return Ok(Token::Cell(start));
        }
        self.bump();
        let end = self.scan_reference()?;
        Ok(Token::Range(Range::new(start, end)))
    }

    /// `A1` style or a relative `^ > v <` reference, resolved against the origin.
    fn scan_reference(&mut self) -> Result<CellPosition, ParseError> {
        if let Some(direction) = self.peek().and_then(Direction::from_char) {
            self.bump();
            let digits = self.take_while(|c| c.is_ascii_digit());
            let count = if digits.is_empty() {
                1
            } else {
                digits
                    .parse::<usize>()
                    .map_err(|_| ParseError::MalformedOffset(digits.to_string()))?
            };
            return Ok(self.origin.offset(direction, count));
        }

        match self.peek() {
            Some(c) if c.is_ascii_uppercase() => {
                let text = self.take_while(is_name_char);
                CellPosition::parse_a1(text)
                    .ok_or_else(|| ParseError::MalformedReference(text.to_string()))
            }
            Some(c) => Err(ParseError::UnexpectedChar(c)),
            None => Err(ParseError::MissingValue),
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    lookahead: Token,
    arena: &'a mut ExprArena,
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn new(
        text: &'a str,
        origin: CellPosition,
        arena: &'a mut ExprArena,
    ) -> Result<Self, ParseError> {
        let mut scanner = Scanner::new(text, origin);
        let lookahead = scanner.next_token()?;
        Ok(Parser {
            scanner,
            lookahead,
            arena,
            nesting: 0,
        })
    }

    /// Return the current token and scan the next one.
    fn advance(&mut self) -> Result<Token, ParseError> {
        let next = self.scanner.next_token()?;
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    fn parse_expression(&mut self) -> Result<ExprId, ParseError> {
        let first = self.parse_term()?;
        self.parse_sum(first)
    }

    /// A function argument may be a bare range; anything else is an expression.
    fn parse_argument(&mut self) -> Result<ExprId, ParseError> {
        let first = self.parse_term()?;
        if self.is_range(first) && matches!(self.lookahead, Token::Comma | Token::RParen) {
            return Ok(first);
        }
        self.parse_sum(first)
    }

    fn parse_sum(&mut self, mut lhs: ExprId) -> Result<ExprId, ParseError> {
        self.reject_range(lhs)?;
        while self.lookahead == Token::Plus {
            self.advance()?;
            let rhs = self.parse_term()?;
            self.reject_range(rhs)?;
            lhs = self.arena.alloc(Expression::Add(lhs, rhs));
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<ExprId, ParseError> {
        let expression = match self.advance()? {
            Token::Number(n) => Expression::Number(n),
            Token::Cell(pos) => Expression::CellRef(pos),
            Token::Pinned(pos) => Expression::ConstantRef(pos),
            Token::Range(range) => Expression::Range(range),
            Token::Name(name) => return self.parse_call(name),
            Token::End => return Err(ParseError::MissingValue),
            token => {
                return Err(ParseError::UnexpectedToken {
                    found: token.to_string(),
                    expected: "value",
                });
            }
        };
        Ok(self.arena.alloc(expression))
    }

    fn parse_call(&mut self, name: String) -> Result<ExprId, ParseError> {
        match self.advance()? {
            Token::LParen => {}
            token => {
                return Err(ParseError::UnexpectedToken {
                    found: token.to_string(),
                    expected: "'(' after function name",
                });
            }
        }

        if self.nesting >= MAX_CALL_NESTING {
            return Err(ParseError::NestedTooDeep(MAX_CALL_NESTING));
        }
        self.nesting += 1;
        let args = self.parse_arguments(&name)?;
        self.nesting -= 1;

        Ok(self.arena.alloc(Expression::Function {
            name: name.to_ascii_lowercase(),
            args,
        }))
    }

    fn parse_arguments(&mut self, name: &str) -> Result<Vec<ExprId>, ParseError> {
        let mut args = vec![self.parse_argument()?];
        loop {
            match self.advance()? {
                Token::Comma => args.push(self.parse_argument()?),
                Token::RParen => return Ok(args),
                token => {
                    return Err(ParseError::MissingComma {
                        name: name.to_string(),
                        found: token.to_string(),
                    });
                }
            }
        }
    }

    fn is_range(&self, id: ExprId) -> bool {
        matches!(self.arena.get(id), Expression::Range(_))
    }

    fn reject_range(&self, id: ExprId) -> Result<(), ParseError> {
        if self.is_range(id) {
            return Err(ParseError::RangeOutsideFunction);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (ExprArena, Result<ExprId, ParseError>) {
        parse_at(text, CellPosition::new(4, 2))
    }

    fn parse_at(text: &str, origin: CellPosition) -> (ExprArena, Result<ExprId, ParseError>) {
        let mut arena = ExprArena::new();
        let result = parse_formula(text, origin, &mut arena);
        (arena, result)
    }

    fn pos(text: &str) -> CellPosition {
        CellPosition::parse_a1(text).unwrap()
    }

    #[test]
    fn test_parse_number() {
        let (arena, root) = parse("  42.5 ");
        assert_eq!(arena.get(root.unwrap()), &Expression::Number(42.5));
    }

    #[test]
    fn test_parse_cell_reference() {
        let (arena, root) = parse("B3");
        assert_eq!(arena.get(root.unwrap()), &Expression::CellRef(pos("B3")));
    }

    #[test]
    fn test_parse_pinned_reference() {
        let (arena, root) = parse("$A1");
        assert_eq!(arena.get(root.unwrap()), &Expression::ConstantRef(pos("A1")));
    }

    #[test]
    fn test_addition_is_left_associative() {
        let (arena, root) = parse("A1 + 2 + B1");
        let Expression::Add(lhs, rhs) = arena.get(root.unwrap()).clone() else {
            panic!("expected add");
        };
        assert_eq!(arena.get(rhs), &Expression::CellRef(pos("B1")));
        let Expression::Add(inner_lhs, inner_rhs) = arena.get(lhs).clone() else {
            panic!("expected nested add");
        };
        assert_eq!(arena.get(inner_lhs), &Expression::CellRef(pos("A1")));
        assert_eq!(arena.get(inner_rhs), &Expression::Number(2.0));
    }

    #[test]
    fn test_relative_references_resolve_against_origin() {
        let origin = pos("C5");
        for (text, expected) in [
            ("^", "C4"),
            ("^3", "C2"),
            (">", "D5"),
            ("v2", "C7"),
            ("<", "B5"),
        ] {
            let (arena, root) = parse_at(text, origin);
            assert_eq!(
                arena.get(root.unwrap()),
                &Expression::CellRef(pos(expected)),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_relative_reference_may_leave_the_grid() {
        let (arena, root) = parse_at("^", CellPosition::ORIGIN);
        assert_eq!(
            arena.get(root.unwrap()),
            &Expression::CellRef(CellPosition::new(-1, 0))
        );
    }

    #[test]
    fn test_parse_function_with_range() {
        let (arena, root) = parse("SUM(A1:A3)");
        let Expression::Function { name, args } = arena.get(root.unwrap()).clone() else {
            panic!("expected function");
        };
        assert_eq!(name, "sum");
        assert_eq!(args.len(), 1);
        assert_eq!(
            arena.get(args[0]),
            &Expression::Range(Range::new(pos("A1"), pos("A3")))
        );
    }

    #[test]
    fn test_parse_function_with_several_arguments() {
        let (arena, root) = parse("max(A1:A3, 1 + 2, sqrt(4))");
        let Expression::Function { args, .. } = arena.get(root.unwrap()).clone() else {
            panic!("expected function");
        };
        assert_eq!(args.len(), 3);
        assert!(matches!(arena.get(args[1]), Expression::Add(_, _)));
        assert!(matches!(arena.get(args[2]), Expression::Function { .. }));
    }

    #[test]
    fn test_relative_range() {
        let (arena, root) = parse_at("sum(^3:^)", pos("A4"));
        let Expression::Function { args, .. } = arena.get(root.unwrap()).clone() else {
            panic!("expected function");
        };
        assert_eq!(
            arena.get(args[0]),
            &Expression::Range(Range::new(pos("A1"), pos("A3")))
        );
    }

    #[test]
    fn test_names_starting_with_v_are_not_references() {
        let (arena, root) = parse("value(1)");
        assert!(matches!(
            arena.get(root.unwrap()),
            Expression::Function { name, .. } if name == "value"
        ));
    }

    #[test]
    fn test_range_outside_function_is_rejected() {
        assert_eq!(parse("A1:A3").1, Err(ParseError::RangeOutsideFunction));
        assert_eq!(parse("1 + A1:A3").1, Err(ParseError::RangeOutsideFunction));
        assert_eq!(
            parse("sum(A1:A3 + 1)").1,
            Err(ParseError::RangeOutsideFunction)
        );
    }

    #[test]
    fn test_pinned_range_is_rejected() {
        assert_eq!(parse("sum($A1:A3)").1, Err(ParseError::PinnedRange));
    }

    #[test]
    fn test_scanner_errors() {
        assert_eq!(parse("A1 # 2").1, Err(ParseError::UnexpectedChar('#')));
        assert_eq!(
            parse("1.2.3").1,
            Err(ParseError::MalformedNumber("1.2.3".to_string()))
        );
        assert_eq!(
            parse("12abc").1,
            Err(ParseError::MalformedNumber("12abc".to_string()))
        );
        assert_eq!(
            parse("A0").1,
            Err(ParseError::MalformedReference("A0".to_string()))
        );
        assert_eq!(
            parse("B2x").1,
            Err(ParseError::MalformedReference("B2x".to_string()))
        );
    }

    #[test]
    fn test_grammar_errors() {
        assert_eq!(parse("").1, Err(ParseError::MissingValue));
        assert_eq!(parse("1 +").1, Err(ParseError::MissingValue));
        assert_eq!(
            parse("+ 1").1.unwrap_err().to_string(),
            "Unexpected '+', expected value"
        );
        assert_eq!(
            parse("1 2").1.unwrap_err().to_string(),
            "Unexpected '2', expected operator"
        );
        assert_eq!(
            parse("sum A1").1.unwrap_err().to_string(),
            "Unexpected 'A1', expected '(' after function name"
        );
    }

    #[test]
    fn test_call_requires_comma_or_close() {
        assert_eq!(
            parse("sqrt(4 5)").1,
            Err(ParseError::MissingComma {
                name: "sqrt".to_string(),
                found: "'5'".to_string(),
            })
        );
        assert_eq!(
            parse("sqrt(4").1,
            Err(ParseError::MissingComma {
                name: "sqrt".to_string(),
                found: "end of formula".to_string(),
            })
        );
    }

    #[test]
    fn test_call_without_arguments_is_rejected() {
        assert_eq!(
            parse("sum()").1.unwrap_err().to_string(),
            "Unexpected ')', expected value"
        );
    }

    #[test]
    fn test_call_nesting_is_bounded() {
        let nested = |depth: usize| format!("{}1{}", "abs(".repeat(depth), ")".repeat(depth));
        assert!(parse(&nested(MAX_CALL_NESTING)).1.is_ok());
        assert_eq!(
            parse(&nested(MAX_CALL_NESTING + 1)).1,
            Err(ParseError::NestedTooDeep(MAX_CALL_NESTING))
        );
        assert_eq!(
            parse(&nested(20_000)).1,
            Err(ParseError::NestedTooDeep(MAX_CALL_NESTING))
        );
    }

    #[test]
    fn test_huge_relative_step() {
        let (arena, root) = parse_at("v9223372036854775807", CellPosition::new(1, 0));
        assert_eq!(
            arena.get(root.unwrap()),
            &Expression::CellRef(CellPosition::new(isize::MAX, 0))
        );
        assert_eq!(
            parse("^99999999999999999999").1,
            Err(ParseError::MalformedOffset("99999999999999999999".to_string()))
        );
    }

    #[test]
    fn test_parse_clone() {
        assert_eq!(parse_clone("^"), Ok((Direction::Up, 1)));
        assert_eq!(parse_clone("v3"), Ok((Direction::Down, 3)));
        assert_eq!(parse_clone("> 2"), Ok((Direction::Right, 2)));
        assert_eq!(parse_clone(""), Err(ParseError::NoCloneDirection));
        assert_eq!(
            parse_clone("x"),
            Err(ParseError::InvalidCloneDirection("x".to_string()))
        );
        assert_eq!(
            parse_clone("<0"),
            Err(ParseError::InvalidCloneOffset("0".to_string()))
        );
        assert_eq!(
            parse_clone("^a"),
            Err(ParseError::InvalidCloneOffset("a".to_string()))
        );
    }
}
