//! cellgrid-core - text grid loading and rendering.

pub mod error;
pub mod storage;

pub use error::{GridError, Result};
pub use storage::{parse_grid, parse_grid_content, render_table, write_table};
