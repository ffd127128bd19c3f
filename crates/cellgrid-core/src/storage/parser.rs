//! Parser for the text grid format

use crate::error::{GridError, Result};
use cellgrid_engine::engine::{CellPosition, Table};
use log::debug;
use std::fs;
use std::path::Path;

/// Lines starting with this repeat the row above them.
const DUPLICATE_PREFIX: &str = "...";

/// Upper bound for a single `...N` directive.
const MAX_DUPLICATE_ROWS: usize = 1 << 20;

enum Line<'a> {
    Cells(Vec<&'a str>),
    Duplicate(usize),
}

/// Parse a grid file into an unevaluated table
pub fn parse_grid(path: &Path) -> Result<Table> {
    let content = fs::read_to_string(path)?;
    parse_grid_content(&content)
}

/// Parse grid content from a string
///
/// Every line is a row, including blank ones. A `...N` line adds `N` copies
/// of the row above it. Cells that fail to parse become error cells; only a
/// malformed directive fails the whole load.
pub fn parse_grid_content(content: &str) -> Result<Table> {
    let mut lines = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        lines.push((line_num + 1, parse_line(line.trim(), line_num + 1)?));
    }

    let rows = lines
        .iter()
        .map(|(_, line)| match line {
            Line::Cells(_) => 1,
            Line::Duplicate(count) => *count,
        })
        .sum();
    let columns = lines
        .iter()
        .filter_map(|(_, line)| match line {
            Line::Cells(cells) => Some(cells.len()),
            Line::Duplicate(_) => None,
        })
        .max()
        .unwrap_or(0);

    let mut table = Table::new(rows, columns);
    let mut row = 0;
    for (line_num, line) in lines {
        match line {
            Line::Cells(cells) => {
                for (col, text) in cells.into_iter().enumerate() {
                    let position = CellPosition::new(row as isize, col as isize);
                    table
                        .set_cell_from_input(position, text)
                        .map_err(|e| GridError::Parse {
                            line: line_num,
                            message: e.to_string(),
                        })?;
                }
                row += 1;
            }
            Line::Duplicate(count) => {
                for _ in 0..count {
                    table.duplicate_row(row);
                    row += 1;
                }
            }
        }
    }

    debug!("loaded {} x {} table", rows, columns);
    Ok(table)
}

fn parse_line(line: &str, line_num: usize) -> Result<Line<'_>> {
    let Some(count) = line.strip_prefix(DUPLICATE_PREFIX) else {
        return Ok(Line::Cells(line.split('|').map(str::trim).collect()));
    };

    let count = count.trim();
    match count.parse::<usize>() {
        Ok(n) if n <= MAX_DUPLICATE_ROWS => Ok(Line::Duplicate(n)),
        Ok(n) => Err(GridError::Parse {
            line: line_num,
            message: format!("Cannot duplicate {} rows (limit {})", n, MAX_DUPLICATE_ROWS),
        }),
        Err(_) => Err(GridError::Parse {
            line: line_num,
            message: format!("Invalid row count '{}'", count),
        }),
    }
}
