//! The square grid under relaxation.
//! Storage is one flat row-major buffer, cell `(row, col)` lives at
//! `row * dimension + col`.
//! Row and column `0` and `dimension - 1` are the fixed boundary,
//! everything else is the interior that the engines relax.

use crate::error::*;
use std::ops::{Index, IndexMut, Range};

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    dimension: usize,
    data: Vec<f64>,
}

impl Grid {
    /// Zero filled grid.
    pub fn new(dimension: usize) -> Self {
        Self::filled(dimension, 0.0)
    }

    pub fn filled(dimension: usize, value: f64) -> Self {
        Grid {
            dimension,
            data: vec![value; dimension * dimension],
        }
    }

    /// Wrap an existing row-major buffer, which must hold exactly
    /// `dimension * dimension` values.
    pub fn from_vec(dimension: usize, data: Vec<f64>) -> RelaxResult<Self> {
        let expected = dimension * dimension;
        if data.len() != expected {
            return Err(RelaxError::DimensionMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Grid { dimension, data })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    #[inline]
    pub fn linear_index(&self, row: usize, col: usize) -> usize {
        debug_assert!(
            row < self.dimension && col < self.dimension,
            "({}, {}) outside of {}x{} grid",
            row,
            col,
            self.dimension,
            self.dimension
        );
        row * self.dimension + col
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.dimension;
        &self.data[start..start + self.dimension]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.dimension;
        &mut self.data[start..start + self.dimension]
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[self.linear_index(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let index = self.linear_index(row, col);
        self.data[index] = value;
    }

    pub fn is_boundary(&self, row: usize, col: usize) -> bool {
        let last = self.dimension.saturating_sub(1);
        row == 0 || col == 0 || row == last || col == last
    }

    /// Rows `1..dimension - 1`, empty for grids without an interior.
    pub fn interior_rows(&self) -> Range<usize> {
        1..self.dimension.saturating_sub(1).max(1)
    }

    /// Columns `1..dimension - 1`, empty for grids without an interior.
    pub fn interior_cols(&self) -> Range<usize> {
        self.interior_rows()
    }

    /// Copy the interior cells of `rows` from `other`.
    /// Boundary columns are left alone.
    pub fn copy_interior_rows_from(&mut self, other: &Grid, rows: Range<usize>) {
        debug_assert_eq!(self.dimension, other.dimension);
        let cols = self.interior_cols();
        for row in rows {
            self.row_mut(row)[cols.clone()]
                .copy_from_slice(&other.row(row)[cols.clone()]);
        }
    }

    /// Every boundary cell as `(row, col, value)`, each cell once.
    pub fn boundary_cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let d = self.dimension;
        (0..d)
            .flat_map(move |row| (0..d).map(move |col| (row, col)))
            .filter(move |&(row, col)| self.is_boundary(row, col))
            .map(move |(row, col)| (row, col, self.get(row, col)))
    }

    /// Largest absolute cell difference, `0.0` for empty grids.
    /// NaN in either grid makes the result NaN.
    pub fn max_abs_diff(&self, other: &Grid) -> f64 {
        debug_assert_eq!(self.dimension, other.dimension);
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, |max, diff| {
                if max.is_nan() || diff.is_nan() {
                    f64::NAN
                } else {
                    max.max(diff)
                }
            })
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[self.linear_index(row, col)]
    }
}

impl IndexMut<(usize, usize)> for Grid {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        let index = self.linear_index(row, col);
        &mut self.data[index]
    }
}
