//! Dense row-major table of cells plus the arena holding their formulas.

use log::debug;

use super::cell::{Cell, CellType, OUTSIDE_TABLE, clone_cell};
use super::eval::{DEFAULT_MAX_DEPTH, Evaluator};
use super::expr::ExprArena;
use super::position::{CellPosition, Direction};
use crate::error::CellError;

/// The cells of a table, indexed by `row * columns + col`.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    cells: Vec<Cell>,
    rows: usize,
    columns: usize,
}

impl Grid {
    fn new(rows: usize, columns: usize) -> Grid {
        Grid {
            cells: vec![Cell::new_empty(); rows * columns],
            rows,
            columns,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn index(&self, position: CellPosition) -> Option<usize> {
        let row = usize::try_from(position.row).ok()?;
        let col = usize::try_from(position.col).ok()?;
        if row >= self.rows || col >= self.columns {
            return None;
        }
        Some(row * self.columns + col)
    }

    pub fn contains(&self, position: CellPosition) -> bool {
        self.index(position).is_some()
    }

    /// The cell at `position`, or a `Cell outside table` error cell.
    pub fn cell_at(&self, position: CellPosition) -> &Cell {
        match self.index(position) {
            Some(index) => &self.cells[index],
            None => &OUTSIDE_TABLE,
        }
    }

    pub fn cell_at_mut(&mut self, position: CellPosition) -> Option<&mut Cell> {
        let index = self.index(position)?;
        self.cells.get_mut(index)
    }

    /// True only for an in-range `Empty` cell.
    pub fn is_empty(&self, position: CellPosition) -> bool {
        self.index(position)
            .is_some_and(|index| matches!(self.cells[index].contents, CellType::Empty))
    }
}

/// A table owns its cells and the arena every formula in it was parsed into.
#[derive(Debug, Default)]
pub struct Table {
    grid: Grid,
    arena: ExprArena,
}

impl Table {
    /// Create a table of empty cells.
    pub fn new(rows: usize, columns: usize) -> Table {
        Table {
            grid: Grid::new(rows, columns),
            arena: ExprArena::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    pub fn cell_at(&self, position: CellPosition) -> &Cell {
        self.grid.cell_at(position)
    }

    pub fn is_empty(&self, position: CellPosition) -> bool {
        self.grid.is_empty(position)
    }

    /// Replace the cell at `position`.
    pub fn set_cell(&mut self, position: CellPosition, cell: Cell) -> Result<(), CellError> {
        let slot = self
            .grid
            .cell_at_mut(position)
            .ok_or(CellError::OutsideTable)?;
        *slot = cell;
        Ok(())
    }

    /// Classify and store raw cell text. Formulas are parsed relative to `position`.
    pub fn set_cell_from_input(&mut self, position: CellPosition, input: &str) -> Result<(), CellError> {
        if !self.grid.contains(position) {
            return Err(CellError::OutsideTable);
        }
        let cell = Cell::from_input(input, position, &mut self.arena);
        self.set_cell(position, cell)
    }

    /// Fill `row` with a one-row-up clone of the row above it.
    /// With no row above, every cell of `row` becomes an error.
    pub fn duplicate_row(&mut self, row: usize) {
        for col in 0..self.columns() {
            let position = CellPosition::new(row as isize, col as isize);
            let cell = if row == 0 {
                Cell::new_error(CellError::DuplicateAboveTable)
            } else {
                let above = position.offset(Direction::Up, 1);
                clone_cell(self.grid.cell_at(above), Direction::Up, 1)
            };
            if let Some(slot) = self.grid.cell_at_mut(position) {
                *slot = cell;
            }
        }
        debug!("filled row {} from the row above", row);
    }

    /// Evaluate every cell in row-major order.
    pub fn evaluate(&mut self) {
        self.evaluate_with_max_depth(DEFAULT_MAX_DEPTH);
    }

    /// Evaluate every cell, turning dependency chains deeper than
    /// `max_depth` into errors.
    pub fn evaluate_with_max_depth(&mut self, max_depth: usize) {
        self.evaluator(max_depth).evaluate_all();
    }

    /// Evaluate one cell (and whatever it depends on).
    pub fn ensure_evaluated(&mut self, position: CellPosition) {
        self.evaluator(DEFAULT_MAX_DEPTH).ensure_evaluated(position);
    }

    /// An evaluation session borrowing the cells mutably and the arena shared.
    pub fn evaluator(&mut self, max_depth: usize) -> Evaluator<'_> {
        Evaluator::new(&self.arena, &mut self.grid, max_depth)
    }
}
