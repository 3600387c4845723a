use serde::{Deserialize, Serialize};

use crate::core::types::finite_min_max;
use crate::error::{FigureError, FigureResult};

/// Row-major 2-D grid of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueGrid {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
}

impl ValueGrid {
    pub fn new(rows: usize, columns: usize, values: Vec<f64>) -> FigureResult<Self> {
        if rows == 0 || columns == 0 {
            return Err(FigureError::InvalidArgument(format!(
                "grid must have at least one row and one column, got {rows}x{columns}"
            )));
        }
        if values.len() != rows * columns {
            return Err(FigureError::InvalidArgument(format!(
                "grid of {rows}x{columns} needs {} values, got {}",
                rows * columns,
                values.len()
            )));
        }
        Ok(Self {
            rows,
            columns,
            values,
        })
    }

    /// Builds a grid from nested rows; all rows must have equal length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> FigureResult<Self> {
        let columns = rows.first().map_or(0, |row| row.as_ref().len());
        let mut values = Vec::with_capacity(rows.len() * columns);
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != columns {
                return Err(FigureError::InvalidArgument(format!(
                    "grid row {index} has {} columns, expected {columns}",
                    row.len()
                )));
            }
            values.extend_from_slice(row);
        }
        Self::new(rows.len(), columns, values)
    }

    /// Builds a grid by evaluating `f(row, column)`.
    pub fn from_fn(
        rows: usize,
        columns: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> FigureResult<Self> {
        let mut values = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                values.push(f(row, column));
            }
        }
        Self::new(rows, columns, values)
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        Some(self.values[row * self.columns + column])
    }

    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.columns;
        Some(&self.values[start..start + self.columns])
    }

    /// Same grid with row order reversed.
    #[must_use]
    pub fn flipped_rows(&self) -> Self {
        let values = self
            .values
            .chunks(self.columns)
            .rev()
            .flatten()
            .copied()
            .collect();
        Self {
            rows: self.rows,
            columns: self.columns,
            values,
        }
    }

    /// Finite min/max, or `None` when every cell is NaN/infinite.
    #[must_use]
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        finite_min_max(&self.values)
    }
}

/// Boolean mask paired with a [`ValueGrid`]; `true` suppresses the cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMask {
    rows: usize,
    columns: usize,
    hidden: Vec<bool>,
}

impl GridMask {
    pub fn new(rows: usize, columns: usize, hidden: Vec<bool>) -> FigureResult<Self> {
        if hidden.len() != rows * columns {
            return Err(FigureError::InvalidArgument(format!(
                "mask of {rows}x{columns} needs {} cells, got {}",
                rows * columns,
                hidden.len()
            )));
        }
        Ok(Self {
            rows,
            columns,
            hidden,
        })
    }

    /// Mask hiding cells for which `predicate(value)` holds.
    #[must_use]
    pub fn from_predicate(grid: &ValueGrid, predicate: impl Fn(f64) -> bool) -> Self {
        Self {
            rows: grid.rows(),
            columns: grid.columns(),
            hidden: grid.values().iter().map(|&value| predicate(value)).collect(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Fails unless the mask has exactly the shape of `grid`.
    pub fn ensure_matches(&self, grid: &ValueGrid) -> FigureResult<()> {
        if self.rows != grid.rows() || self.columns != grid.columns() {
            return Err(FigureError::InvalidArgument(format!(
                "mask has shape {}x{}, grid has shape {}x{}",
                self.rows,
                self.columns,
                grid.rows(),
                grid.columns()
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_hidden(&self, row: usize, column: usize) -> bool {
        row < self.rows && column < self.columns && self.hidden[row * self.columns + column]
    }

    #[must_use]
    pub fn flipped_rows(&self) -> Self {
        let hidden = self
            .hidden
            .chunks(self.columns.max(1))
            .rev()
            .flatten()
            .copied()
            .collect();
        Self {
            rows: self.rows,
            columns: self.columns,
            hidden,
        }
    }
}
