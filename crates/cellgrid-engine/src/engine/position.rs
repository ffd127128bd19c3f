//! Grid positions, directions and ranges.
//!
//! Provides the offset arithmetic shared by the parser (relative references),
//! the evaluator (range iteration, clone targets) and cell cloning (shift
//! composition), plus conversion between `A1` notation and zero-indexed
//! coordinates.
//!
//! Coordinates are signed. Offsetting never checks bounds; the table decides
//! what is addressable and turns anything else into an error value. The
//! arithmetic saturates, so a huge step count lands far outside the table
//! instead of wrapping back into it.
//!
//! # Examples
//!
//! ```ignore
//! let b3 = CellPosition::parse_a1("B3").unwrap();
//! assert_eq!(b3, CellPosition::new(2, 1));
//! assert_eq!(b3.offset(Direction::Up, 2).to_string(), "B1");
//! ```

use regex::Regex;
use std::fmt;
use std::ops::Add;
use std::sync::OnceLock;

/// One of the four grid directions, or no movement at all.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
    None,
}

impl Direction {
    /// Map a direction character (`^ > v <`) to a direction.
    pub fn from_char(c: char) -> Option<Direction> {
        match c {
            '^' => Some(Direction::Up),
            '>' => Some(Direction::Right),
            'v' => Some(Direction::Down),
            '<' => Some(Direction::Left),
            _ => None,
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::None => Direction::None,
        }
    }

    /// Unit step as `(row, col)`.
    fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::None => (0, 0),
        }
    }

    /// Return the coordinates `count` steps away in this direction.
    pub fn offset(self, row: isize, col: isize, count: usize) -> (isize, isize) {
        let (dr, dc) = self.delta();
        let count = isize::try_from(count).unwrap_or(isize::MAX);
        (
            row.saturating_add(dr.saturating_mul(count)),
            col.saturating_add(dc.saturating_mul(count)),
        )
    }
}

/// A zero-indexed grid coordinate, also used as a translation (shift offset).
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct CellPosition {
    pub row: isize,
    pub col: isize,
}

impl CellPosition {
    pub const ORIGIN: CellPosition = CellPosition { row: 0, col: 0 };

    pub fn new(row: isize, col: isize) -> CellPosition {
        CellPosition { row, col }
    }

    pub fn offset(self, direction: Direction, count: usize) -> CellPosition {
        let (row, col) = direction.offset(self.row, self.col, count);
        CellPosition { row, col }
    }

    /// Parse single-letter `A1` notation (`A`..`Z`, 1-based row).
    /// Returns None if the text is not of that shape or the row is zero.
    pub fn parse_a1(text: &str) -> Option<CellPosition> {
        let caps = a1_re().captures(text)?;
        let col = (caps["column"].as_bytes()[0] - b'A') as isize;
        let row = caps["row"].parse::<isize>().ok()?.checked_sub(1)?;
        if row < 0 {
            return None;
        }
        Some(CellPosition::new(row, col))
    }

    /// Convert a column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn column_name(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

fn a1_re() -> &'static Regex {
    static A1_RE: OnceLock<Regex> = OnceLock::new();
    A1_RE.get_or_init(|| {
        Regex::new(r"^(?<column>[A-Z])(?<row>[0-9]+)$").expect("A1 reference regex must compile")
    })
}

impl Add for CellPosition {
    type Output = CellPosition;

    fn add(self, other: CellPosition) -> CellPosition {
        CellPosition::new(
            self.row.saturating_add(other.row),
            self.col.saturating_add(other.col),
        )
    }
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.row < 0 || self.col < 0 {
            return write!(f, "R{}C{}", self.row, self.col);
        }
        write!(f, "{}{}", CellPosition::column_name(self.col as usize), self.row + 1)
    }
}

/// An inclusive rectangle of positions. Only meaningful as a function argument.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Range {
    pub start: CellPosition,
    pub end: CellPosition,
}

impl Range {
    pub fn new(start: CellPosition, end: CellPosition) -> Range {
        Range { start, end }
    }

    /// Translate both corners.
    pub fn shift(self, offset: CellPosition) -> Range {
        Range::new(self.start + offset, self.end + offset)
    }

    /// Every position in the rectangle, row-major, corners normalized.
    pub fn positions(self) -> impl Iterator<Item = CellPosition> {
        let (min_row, max_row) = ordered(self.start.row, self.end.row);
        let (min_col, max_col) = ordered(self.start.col, self.end.col);
        (min_row..=max_row)
            .flat_map(move |row| (min_col..=max_col).map(move |col| CellPosition::new(row, col)))
    }
}

fn ordered(a: isize, b: isize) -> (isize, isize) {
    if a <= b { (a, b) } else { (b, a) }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRECTIONS: [Direction; 5] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::None,
    ];

    #[test]
    fn test_reverse_undoes_offset() {
        let start = CellPosition::new(4, 7);
        for direction in DIRECTIONS {
            for count in [0, 1, 3] {
                let moved = start.offset(direction, count);
                assert_eq!(moved.offset(direction.reverse(), count), start);
            }
        }
    }

    #[test]
    fn test_reverse_is_involution() {
        for direction in DIRECTIONS {
            assert_eq!(direction.reverse().reverse(), direction);
        }
    }

    #[test]
    fn test_offset_has_no_bounds_check() {
        let moved = CellPosition::ORIGIN.offset(Direction::Up, 2);
        assert_eq!(moved, CellPosition::new(-2, 0));
        assert_eq!(moved.to_string(), "R-2C0");
    }

    #[test]
    fn test_huge_offsets_saturate() {
        let start = CellPosition::new(1, 0);
        assert_eq!(
            start.offset(Direction::Down, usize::MAX),
            CellPosition::new(isize::MAX, 0)
        );
        assert_eq!(
            start.offset(Direction::Up, usize::MAX),
            CellPosition::new(isize::MIN, 0)
        );
        assert_eq!(
            start.offset(Direction::Right, isize::MAX as usize).col,
            isize::MAX
        );

        let far = CellPosition::new(isize::MAX, isize::MIN);
        assert_eq!(far + CellPosition::new(5, -5), far);
        let range = Range::new(far, far).shift(CellPosition::new(1, -1));
        assert_eq!(range.start, far);
    }

    #[test]
    fn test_direction_chars() {
        assert_eq!(Direction::from_char('^'), Some(Direction::Up));
        assert_eq!(Direction::from_char('>'), Some(Direction::Right));
        assert_eq!(Direction::from_char('v'), Some(Direction::Down));
        assert_eq!(Direction::from_char('<'), Some(Direction::Left));
        assert_eq!(Direction::from_char('x'), None);
    }

    #[test]
    fn test_parse_a1() {
        assert_eq!(CellPosition::parse_a1("A1"), Some(CellPosition::new(0, 0)));
        assert_eq!(CellPosition::parse_a1("Z10"), Some(CellPosition::new(9, 25)));
        assert_eq!(CellPosition::parse_a1("A0"), None);
        assert_eq!(CellPosition::parse_a1("AA1"), None);
        assert_eq!(CellPosition::parse_a1("a1"), None);
        assert_eq!(CellPosition::parse_a1("A"), None);
    }

    #[test]
    fn test_display_round_trips_a1() {
        for text in ["A1", "C7", "Z100"] {
            let pos = CellPosition::parse_a1(text).unwrap();
            assert_eq!(pos.to_string(), text);
        }
        assert_eq!(CellPosition::new(0, 26).to_string(), "AA1");
    }

    #[test]
    fn test_range_positions_normalized() {
        let range = Range::new(CellPosition::new(2, 0), CellPosition::new(0, 1));
        let positions: Vec<_> = range.positions().collect();
        assert_eq!(positions.len(), 6);
        assert_eq!(positions[0], CellPosition::new(0, 0));
        assert_eq!(positions[1], CellPosition::new(0, 1));
        assert_eq!(positions[5], CellPosition::new(2, 1));
    }

    #[test]
    fn test_range_shift() {
        let range = Range::new(CellPosition::new(0, 0), CellPosition::new(2, 0));
        let shifted = range.shift(CellPosition::new(1, 2));
        assert_eq!(shifted.to_string(), "C2:C4");
    }
}
