//! Table evaluation API.
//!
//! - [`CellPosition`], [`Direction`], [`Range`] - Grid coordinates and offsets
//! - [`Expression`], [`ExprArena`] - Formula trees, shared between cells by id
//! - [`parse_formula`], [`parse_clone`] - Formula and clone directive parsing
//! - [`Cell`], [`CellType`], [`EvalState`] - What a cell holds and how far it is evaluated
//! - [`Grid`], [`Table`] - Cell storage
//! - [`Evaluator`] - Lazy evaluation with cycle detection
//! - [`format_number`] - Format values for display

mod cell;
mod eval;
mod expr;
mod format;
mod parser;
mod position;
mod table;

pub use cell::{Cell, CellType, EvalState, SEPARATOR_MARKER, clone_cell};
pub use eval::{DEFAULT_MAX_DEPTH, Evaluator};
pub use expr::{ExprArena, ExprId, Expression};
pub use format::format_number;
pub use parser::{parse_clone, parse_formula};
pub use position::{CellPosition, Direction, Range};
pub use table::{Grid, Table};
