//! Renderer for evaluated tables

use crate::error::Result;
use cellgrid_engine::engine::{CellPosition, CellType, Table};
use std::fs;
use std::path::Path;

const COLUMN_SEPARATOR: &str = " | ";

/// Write the rendered table to a file
pub fn write_table(path: &Path, table: &Table, precision: Option<usize>) -> Result<()> {
    fs::write(path, render_table(table, precision))?;
    Ok(())
}

/// Render a table as right-aligned, pipe-delimited rows.
///
/// Column widths are the widest rendered cell in each column. Trailing empty
/// cells are left off each row, and separator cells are drawn as a rule of
/// `_` as wide as their column.
pub fn render_table(table: &Table, precision: Option<usize>) -> String {
    let rows = table.rows();
    let columns = table.columns();

    let texts: Vec<Vec<String>> = (0..rows)
        .map(|row| {
            (0..columns)
                .map(|col| table.cell_at(position(row, col)).display(precision))
                .collect()
        })
        .collect();

    let mut widths = vec![0; columns];
    for row in &texts {
        for (col, text) in row.iter().enumerate() {
            widths[col] = widths[col].max(text.chars().count());
        }
    }

    let mut out = String::new();
    for (row, row_texts) in texts.iter().enumerate() {
        let last = (0..columns)
            .rev()
            .find(|&col| !table.is_empty(position(row, col)))
            .unwrap_or(0);

        let line: Vec<String> = row_texts
            .iter()
            .enumerate()
            .take(last + 1)
            .map(|(col, text)| {
                let width = widths[col];
                match table.cell_at(position(row, col)).contents {
                    CellType::Separator => "_".repeat(width),
                    _ => format!("{:>width$}", text),
                }
            })
            .collect();
        out.push_str(&line.join(COLUMN_SEPARATOR));
        out.push('\n');
    }
    out
}

fn position(row: usize, col: usize) -> CellPosition {
    CellPosition::new(row as isize, col as isize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::parse_grid_content;
    use pretty_assertions::assert_eq;

    fn render(content: &str) -> String {
        let mut table = parse_grid_content(content).unwrap();
        table.evaluate();
        render_table(&table, None)
    }

    #[test]
    fn test_columns_are_right_aligned() {
        let out = render("item | cost\nwidgets | 3\ntotal | =B2 + 10");
        assert_eq!(
            out,
            "   item | cost\n\
             widgets |    3\n\
             \x20 total |   13\n"
        );
    }

    #[test]
    fn test_separator_spans_column_width() {
        let out = render("name | value\n__ | __\nx | 12345678");
        assert_eq!(
            out,
            "name |    value\n\
             ____ | ________\n\
             \x20  x | 12345678\n"
        );
    }

    #[test]
    fn test_trailing_empty_cells_are_trimmed() {
        let out = render("1 | 2 | 3\n4 |  |\n | 5");
        assert_eq!(out, "1 | 2 | 3\n4\n  | 5\n");
    }

    #[test]
    fn test_separator_is_not_trimmed() {
        let out = render("ab | cd\n1 | __");
        assert_eq!(out, "ab | cd\n 1 | __\n");
    }

    #[test]
    fn test_errors_render_in_place() {
        let out = render("=B1 | =A1\nx | =A2 + 1");
        let expected = format!(
            "#Loop!# | {:>24}\n{:>7} | #Cannot operate on text#\n",
            "#Loop!#", "x"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_precision_applies_to_fractions() {
        let mut table = parse_grid_content("2.71828 | 2").unwrap();
        table.evaluate();
        assert_eq!(render_table(&table, Some(2)), "2.72 | 2\n");
        assert_eq!(render_table(&table, None), "2.71828 | 2\n");
    }

    #[test]
    fn test_width_counts_chars() {
        let out = render("héllo\nab");
        assert_eq!(out, "héllo\n   ab\n");
    }

    #[test]
    fn test_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut table = parse_grid_content("1 | =A1 + 1").unwrap();
        table.evaluate();
        write_table(&path, &table, None).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1 | 2\n");
    }
}
