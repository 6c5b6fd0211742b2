//! # Bin Grid
//!
//! The rendered layout: a fixed `rows x 8` matrix of cell labels, ready for a
//! screen, a printed table, or a console dump. Produced by
//! [`BinLayoutModel::render_grid`](crate::layout::BinLayoutModel::render_grid).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::COLUMN_COUNT;

/// Rendered bin layout. Empty cells are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinGrid {
    cells: Vec<Vec<String>>,
}

impl BinGrid {
    /// Grid with `rows` rows of empty cells
    pub fn empty(rows: usize) -> Self {
        BinGrid {
            cells: vec![vec![String::new(); COLUMN_COUNT]; rows],
        }
    }

    /// Wrap pre-rendered rows. Each row is padded or truncated to
    /// [`COLUMN_COUNT`] cells.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let cells = rows
            .into_iter()
            .map(|mut row| {
                row.resize(COLUMN_COUNT, String::new());
                row
            })
            .collect();
        BinGrid { cells }
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn column_count(&self) -> usize {
        COLUMN_COUNT
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.cells.get(index).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.cells.get(row)?.get(column).map(String::as_str)
    }

    pub fn cells(&self) -> &[Vec<String>] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Vec<String>> {
        self.cells
    }

    /// Number of non-empty cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| !c.is_empty()).count()
    }

    /// Fixed-width text table, one line per row, columns separated by `|`.
    pub fn to_text(&self) -> String {
        let width = self
            .cells
            .iter()
            .flatten()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0)
            .max(5);

        let mut out = String::new();
        for row in &self.cells {
            let line = row
                .iter()
                .map(|cell| format!("{:<width$}", if cell.is_empty() { "." } else { cell }, width = width))
                .collect::<Vec<_>>()
                .join(" | ");
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for BinGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_shape() {
        let grid = BinGrid::empty(7);
        assert_eq!(grid.row_count(), 7);
        assert!(grid.cells().iter().all(|row| row.len() == COLUMN_COUNT));
        assert_eq!(grid.filled_count(), 0);
    }

    #[test]
    fn test_from_rows_pads_and_truncates() {
        let grid = BinGrid::from_rows(vec![
            vec!["a".to_string()],
            (0..10).map(|i| i.to_string()).collect(),
        ]);
        assert_eq!(grid.row(0).unwrap().len(), COLUMN_COUNT);
        assert_eq!(grid.cell(0, 0), Some("a"));
        assert_eq!(grid.cell(0, 1), Some(""));
        assert_eq!(grid.row(1).unwrap().len(), COLUMN_COUNT);
        assert_eq!(grid.cell(1, 7), Some("7"));
        assert_eq!(grid.cell(2, 0), None);
    }

    #[test]
    fn test_text_rendering() {
        let grid = BinGrid::from_rows(vec![vec!["1/4 x Nut".to_string()], vec![]]);
        let text = grid.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1/4 x Nut | ."));
        assert_eq!(lines[1].matches('|').count(), COLUMN_COUNT - 1);
    }
}
