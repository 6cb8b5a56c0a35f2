/**
 * RecoFactor
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use rand::Rng;
use rand_distr::{Distribution, Normal};

use error::{Error, Result};

pub type DenseVector = Vec<f64>;

pub fn new_dense_vector(dimensions: usize) -> DenseVector {
    vec![0.0; dimensions]
}

/// Row-major matrix backed by a single contiguous buffer. Rows are latent vectors of users or
/// items, so the only access patterns we need are single elements and whole rows.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix {
    num_rows: usize,
    num_cols: usize,
    values: Vec<f64>,
}

impl DenseMatrix {

    pub fn zeros(num_rows: usize, num_cols: usize) -> Self {
        DenseMatrix { num_rows, num_cols, values: vec![0.0; num_rows * num_cols] }
    }

    /// Draws every entry independently from `N(mean, std_dev²)`.
    pub fn random<R: Rng>(
        num_rows: usize,
        num_cols: usize,
        mean: f64,
        std_dev: f64,
        rng: &mut R,
    ) -> Result<Self> {

        if !(std_dev >= 0.0 && std_dev.is_finite()) {
            return Err(Error::InvalidArgument(
                format!("init stddev must be finite and non-negative, got {}", std_dev)));
        }

        let normal = Normal::new(mean, std_dev)
            .map_err(|e| Error::InvalidArgument(
                format!("cannot sample from N({}, {}²): {}", mean, std_dev, e)))?;

        let mut values = Vec::with_capacity(num_rows * num_cols);
        for _ in 0..num_rows * num_cols {
            values.push(normal.sample(rng));
        }

        Ok(DenseMatrix { num_rows, num_cols, values })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.num_cols + col]
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.num_cols + col] = value;
    }

    #[inline(always)]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.num_cols;
        &self.values[start..start + self.num_cols]
    }

    #[inline(always)]
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.num_cols;
        &mut self.values[start..start + self.num_cols]
    }
}

#[inline(always)]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
