//! Cell data structures for the table.
//!
//! - [`CellType`] - What a cell holds (value, formula, clone directive, error)
//! - [`EvalState`] - Where a cell is in its evaluation
//! - [`Cell`] - Contents plus state; `Display` gives its printed text

use std::fmt;

use super::expr::{ExprArena, ExprId};
use super::format::format_number;
use super::parser::{parse_clone, parse_formula};
use super::position::{CellPosition, Direction};
use crate::error::CellError;

/// Marker text for a separator cell.
pub const SEPARATOR_MARKER: &str = "__";

/// Evaluation progress. Only formula and clone cells ever start `Pending`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EvalState {
    #[default]
    Pending,
    InProgress,
    Done,
}

/// The type of content stored in a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellType {
    Empty,
    Text(String),
    Number(f64),
    /// A parsed formula. `shift` is added to every relative reference in
    /// `expr`; `value` is meaningful once the cell is `Done`.
    Expression {
        expr: ExprId,
        shift: CellPosition,
        value: f64,
    },
    /// Copy of the cell `offset` steps away in `direction`, resolved on first use.
    Clone {
        direction: Direction,
        offset: usize,
    },
    Separator,
    Error(CellError),
}

/// A cell in the table.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub contents: CellType,
    pub state: EvalState,
}

/// Stand-in returned for coordinates outside the table.
pub(crate) static OUTSIDE_TABLE: Cell = Cell {
    contents: CellType::Error(CellError::OutsideTable),
    state: EvalState::Done,
};

impl Cell {
    fn terminal(contents: CellType) -> Cell {
        Cell {
            contents,
            state: EvalState::Done,
        }
    }

    pub fn new_empty() -> Cell {
        Cell::terminal(CellType::Empty)
    }

    pub fn new_text(text: &str) -> Cell {
        Cell::terminal(CellType::Text(text.to_string()))
    }

    pub fn new_number(n: f64) -> Cell {
        Cell::terminal(CellType::Number(n))
    }

    pub fn new_separator() -> Cell {
        Cell::terminal(CellType::Separator)
    }

    pub fn new_error(error: CellError) -> Cell {
        Cell::terminal(CellType::Error(error))
    }

    pub fn new_expression(expr: ExprId) -> Cell {
        Cell {
            contents: CellType::Expression {
                expr,
                shift: CellPosition::ORIGIN,
                value: 0.0,
            },
            state: EvalState::Pending,
        }
    }

    pub fn new_clone(direction: Direction, offset: usize) -> Cell {
        Cell {
            contents: CellType::Clone { direction, offset },
            state: EvalState::Pending,
        }
    }

    /// Classify trimmed cell text written at `position`.
    /// - Empty string -> Empty
    /// - Starts with '=' -> Expression, parsed into `arena`
    /// - Starts with ':' -> Clone
    /// - `__` -> Separator
    /// - Valid finite number -> Number
    /// - Otherwise -> Text
    ///
    /// Parse failures produce an `Error` cell.
    pub fn from_input(input: &str, position: CellPosition, arena: &mut ExprArena) -> Cell {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Cell::new_empty();
        }

        if let Some(formula) = trimmed.strip_prefix('=') {
            return match parse_formula(formula, position, arena) {
                Ok(expr) => Cell::new_expression(expr),
                Err(e) => Cell::new_error(e.into()),
            };
        }

        if let Some(directive) = trimmed.strip_prefix(':') {
            return match parse_clone(directive) {
                Ok((direction, offset)) => Cell::new_clone(direction, offset),
                Err(e) => Cell::new_error(e.into()),
            };
        }

        if trimmed == SEPARATOR_MARKER {
            return Cell::new_separator();
        }

        if let Ok(n) = trimmed.parse::<f64>()
            && n.is_finite()
        {
            return Cell::new_number(n);
        }

        Cell::new_text(trimmed)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.contents, CellType::Error(_))
    }

    /// Numeric value if the cell currently holds one.
    pub fn number(&self) -> Option<f64> {
        match self.contents {
            CellType::Number(n) => Some(n),
            CellType::Expression { value, .. } if self.state == EvalState::Done => Some(value),
            _ => None,
        }
    }

    /// Printed text. `precision` fixes the decimals of non-integer numbers.
    pub fn display(&self, precision: Option<usize>) -> String {
        match &self.contents {
            CellType::Empty | CellType::Separator => String::new(),
            CellType::Text(text) => text.clone(),
            CellType::Number(n) => format_number(*n, precision),
            CellType::Expression { value, .. } => {
                if self.state == EvalState::Done {
                    format_number(*value, precision)
                } else {
                    "#ERROR#".to_string()
                }
            }
            CellType::Clone { .. } => "#ERROR#".to_string(),
            CellType::Error(e) => format!("#{}#", e),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display(None))
    }
}

/// Copy `cell` into a slot `offset` steps away from it, opposite to `direction`.
/// A formula keeps its shared tree; its shift moves with the copy and it is
/// queued for evaluation again.
pub fn clone_cell(cell: &Cell, direction: Direction, offset: usize) -> Cell {
    let mut copy = cell.clone();
    if let CellType::Expression { shift, value, .. } = &mut copy.contents {
        *shift = shift.offset(direction.reverse(), offset);
        *value = 0.0;
        copy.state = EvalState::Pending;
    }
    copy
}
