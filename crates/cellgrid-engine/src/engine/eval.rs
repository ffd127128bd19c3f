//! Lazy, memoized evaluation of a table.
//!
//! Each formula or clone cell moves `Pending -> InProgress -> Done`, or is
//! replaced by an `Error` cell. Dependencies are evaluated on demand, so the
//! dependency graph is never built explicitly: reaching a cell that is
//! already `InProgress` means the current chain loops back on itself, and
//! that cell becomes a `Loop!` error. Every cell that was waiting on it then
//! fails with the same error as the recursion unwinds.
//!
//! Formulas are never rewritten. A cell carries a shift offset that is added
//! to every relative reference of the shared expression tree when it is
//! evaluated.

use log::{debug, trace, warn};

use super::cell::{Cell, CellType, EvalState, clone_cell};
use super::expr::{ExprArena, ExprId, Expression};
use super::position::{CellPosition, Direction, Range};
use super::table::Grid;
use crate::builtins;
use crate::error::CellError;

/// Nested evaluations allowed before a chain is cut off.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// One evaluation session over a table's cells.
pub struct Evaluator<'a> {
    arena: &'a ExprArena,
    grid: &'a mut Grid,
    depth: usize,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(arena: &'a ExprArena, grid: &'a mut Grid, max_depth: usize) -> Self {
        Evaluator {
            arena,
            grid,
            depth: 0,
            max_depth,
        }
    }

    pub fn arena(&self) -> &'a ExprArena {
        self.arena
    }

    /// Evaluate every cell in row-major order.
    pub fn evaluate_all(&mut self) {
        for row in 0..self.grid.rows() {
            for col in 0..self.grid.columns() {
                self.ensure_evaluated(CellPosition::new(row as isize, col as isize));
            }
        }
    }

    /// Bring the cell at `position` to `Done` (or `Error`).
    /// Positions outside the table are left alone.
    pub fn ensure_evaluated(&mut self, position: CellPosition) {
        let max_depth = self.max_depth;
        let depth = self.depth;
        let Some(cell) = self.grid.cell_at_mut(position) else {
            return;
        };

        match cell.state {
            EvalState::Done => return,
            EvalState::InProgress => {
                debug!("cycle detected at {}", position);
                *cell = Cell::new_error(CellError::Cycle);
                return;
            }
            EvalState::Pending => {}
        }

        if depth >= max_depth {
            warn!("dependency chain deeper than {} at {}", max_depth, position);
            *cell = Cell::new_error(CellError::TooDeep);
            return;
        }

        cell.state = EvalState::InProgress;
        self.depth += 1;
        match cell.contents {
            CellType::Expression { expr, shift, .. } => self.evaluate_cell(position, expr, shift),
            CellType::Clone { direction, offset } => {
                self.resolve_clone(position, direction, offset)
            }
            _ => cell.state = EvalState::Done,
        }
        self.depth -= 1;
    }

    fn evaluate_cell(&mut self, position: CellPosition, expr: ExprId, shift: CellPosition) {
        trace!("evaluating {} (shift {:?})", position, shift);
        let result = self.evaluate_expression(expr, shift);
        let Some(cell) = self.grid.cell_at_mut(position) else {
            return;
        };

        match result {
            Ok(number) if !number.is_finite() => *cell = Cell::new_error(CellError::NotFinite),
            Ok(number) => {
                // A cycle may already have turned this cell into an error.
                if let CellType::Expression { value, .. } = &mut cell.contents {
                    *value = number;
                    cell.state = EvalState::Done;
                }
            }
            Err(e) => *cell = Cell::new_error(e),
        }
    }

    fn resolve_clone(&mut self, position: CellPosition, direction: Direction, offset: usize) {
        let source = position.offset(direction, offset);
        self.ensure_evaluated(source);
        let resolved = clone_cell(self.grid.cell_at(source), direction, offset);
        debug!("resolved clone at {} from {}", position, source);

        if let Some(cell) = self.grid.cell_at_mut(position)
            && matches!(cell.contents, CellType::Clone { .. })
        {
            *cell = resolved;
        }
        self.ensure_evaluated(position);
    }

    /// Evaluate an expression with `shift` applied to its relative references.
    pub fn evaluate_expression(&mut self, id: ExprId, shift: CellPosition) -> Result<f64, CellError> {
        let arena = self.arena;
        match arena.get(id) {
            Expression::Number(n) => Ok(*n),
            Expression::CellRef(position) => self.evaluate_reference(*position + shift),
            Expression::ConstantRef(position) => self.evaluate_reference(*position),
            Expression::Range(_) => Err(CellError::RangeOutsideFunction),
            Expression::Add(..) => {
                // Sums nest to the left; walk the spine instead of recursing.
                let mut terms = Vec::new();
                let mut current = id;
                while let Expression::Add(lhs, rhs) = arena.get(current) {
                    terms.push(*rhs);
                    current = *lhs;
                }
                let mut total = self.evaluate_expression(current, shift)?;
                for term in terms.into_iter().rev() {
                    total += self.evaluate_expression(term, shift)?;
                }
                Ok(total)
            }
            Expression::Function { name, args } => {
                // Nested calls share the dependency chain's depth budget.
                if self.depth >= self.max_depth {
                    return Err(CellError::TooDeep);
                }
                self.depth += 1;
                let result = builtins::call(self, name, args, shift);
                self.depth -= 1;
                result
            }
        }
    }

    fn evaluate_reference(&mut self, position: CellPosition) -> Result<f64, CellError> {
        self.ensure_evaluated(position);
        let cell = self.grid.cell_at(position);
        match &cell.contents {
            CellType::Text(_) => Err(CellError::Text),
            CellType::Number(n) => Ok(*n),
            CellType::Expression { value, .. } => Ok(*value),
            CellType::Error(e) => Err(e.clone()),
            CellType::Empty => Ok(0.0),
            CellType::Separator | CellType::Clone { .. } => Err(CellError::NotANumber),
        }
    }

    /// Evaluate every cell of `range` and collect the numeric ones.
    /// Text, empty and separator cells are skipped; an error cell fails the range.
    pub fn range_numbers(&mut self, range: Range) -> Result<Vec<f64>, CellError> {
        let mut numbers = Vec::new();
        for position in range.positions() {
            self.ensure_evaluated(position);
            let cell = self.grid.cell_at(position);
            if let CellType::Error(e) = &cell.contents {
                return Err(e.clone());
            }
            if let Some(n) = cell.number() {
                numbers.push(n);
            }
        }
        Ok(numbers)
    }
}
