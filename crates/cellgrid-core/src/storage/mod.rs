//! Grid text format: `|`-separated cells, one row per line.

mod parser;
mod writer;

pub use parser::{parse_grid, parse_grid_content};
pub use writer::{render_table, write_table};
