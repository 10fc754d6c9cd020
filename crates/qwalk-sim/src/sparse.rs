//! Complex sparse matrices in Compressed Sparse Row format.
//!
//! Walk generators are banded (CTQW) or a permutation times a block
//! diagonal (DTQW), so every operator in this crate is stored as CSR and
//! only ever touched through products with vectors or other CSR matrices.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1};
use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Complex sparse matrix in CSR layout.
///
/// Column indices within a row are strictly increasing. Equality is exact,
/// so two matrices built from the same inputs compare equal bit for bit.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<Complex64>,
}

impl CsrMatrix {
    /// Build from a coordinate list `(row, col, value)`.
    ///
    /// Duplicate coordinates are summed. Explicit zeros are kept so the
    /// sparsity pattern depends only on which coordinates were supplied.
    ///
    /// # Panics
    /// Panics if a coordinate lies outside `nrows × ncols`.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: impl IntoIterator<Item = (usize, usize, Complex64)>,
    ) -> Self {
        let mut entries: BTreeMap<(usize, usize), Complex64> = BTreeMap::new();
        for (row, col, value) in triplets {
            assert!(
                row < nrows && col < ncols,
                "triplet ({row}, {col}) outside {nrows}x{ncols} matrix"
            );
            *entries.entry((row, col)).or_insert(ZERO) += value;
        }

        let mut row_ptr = vec![0usize; nrows + 1];
        let mut col_idx = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        for ((row, col), value) in entries {
            row_ptr[row + 1] += 1;
            col_idx.push(col);
            values.push(value);
        }
        for row in 0..nrows {
            row_ptr[row + 1] += row_ptr[row];
        }

        Self {
            nrows,
            ncols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Build a square `n × n` matrix from `(offset, values)` diagonals.
    ///
    /// Offset `0` is the main diagonal, `+k` the k-th superdiagonal
    /// (entries `(i, i + k)`), `-k` the k-th subdiagonal. Each value list
    /// must have exactly `n - |k|` entries.
    ///
    /// # Panics
    /// Panics if a diagonal has the wrong length.
    pub fn from_diagonals(n: usize, diagonals: &[(isize, Vec<Complex64>)]) -> Self {
        let mut triplets = Vec::new();
        for (offset, values) in diagonals {
            let k = offset.unsigned_abs();
            assert_eq!(
                values.len(),
                n.saturating_sub(k),
                "diagonal {offset} of a {n}x{n} matrix needs {} entries",
                n.saturating_sub(k)
            );
            for (i, &value) in values.iter().enumerate() {
                let (row, col) = if *offset >= 0 { (i, i + k) } else { (i + k, i) };
                triplets.push((row, col, value));
            }
        }
        Self::from_triplets(n, n, triplets)
    }

    /// Block-diagonal matrix from 2×2 blocks, one per site.
    pub fn block_diagonal_2x2(blocks: &[[[Complex64; 2]; 2]]) -> Self {
        let n = 2 * blocks.len();
        let triplets = blocks.iter().enumerate().flat_map(|(site, block)| {
            let base = 2 * site;
            (0..2).flat_map(move |r| (0..2).map(move |c| (base + r, base + c, block[r][c])))
        });
        Self::from_triplets(n, n, triplets)
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Entry `(row, col)`, zero if not stored.
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        match self.col_idx[range.clone()].binary_search(&col) {
            Ok(pos) => self.values[range.start + pos],
            Err(_) => ZERO,
        }
    }

    /// Stored entries as `(row, col, value)` in row-major order.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, Complex64)> + '_ {
        (0..self.nrows).flat_map(move |row| {
            (self.row_ptr[row]..self.row_ptr[row + 1])
                .map(move |k| (row, self.col_idx[k], self.values[k]))
        })
    }

    /// Sparse matrix-vector product `y = A x` into a caller-owned buffer.
    pub fn mul_vec_into(&self, x: ArrayView1<'_, Complex64>, mut y: ArrayViewMut1<'_, Complex64>) {
        debug_assert_eq!(x.len(), self.ncols);
        debug_assert_eq!(y.len(), self.nrows);
        for row in 0..self.nrows {
            let mut sum = ZERO;
            for k in self.row_ptr[row]..self.row_ptr[row + 1] {
                sum += self.values[k] * x[self.col_idx[k]];
            }
            y[row] = sum;
        }
    }

    /// Sparse matrix-vector product `A x`.
    pub fn mul_vec(&self, x: &Array1<Complex64>) -> Array1<Complex64> {
        let mut y = Array1::zeros(self.nrows);
        self.mul_vec_into(x.view(), y.view_mut());
        y
    }

    /// Sparse matrix-matrix product `A B`.
    ///
    /// # Panics
    /// Panics if the inner dimensions differ.
    pub fn matmul(&self, rhs: &CsrMatrix) -> CsrMatrix {
        assert_eq!(
            self.ncols, rhs.nrows,
            "cannot multiply {}x{} by {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols
        );
        let mut triplets = Vec::new();
        let mut row_acc: BTreeMap<usize, Complex64> = BTreeMap::new();
        for row in 0..self.nrows {
            row_acc.clear();
            for k in self.row_ptr[row]..self.row_ptr[row + 1] {
                let a = self.values[k];
                let mid = self.col_idx[k];
                for j in rhs.row_ptr[mid]..rhs.row_ptr[mid + 1] {
                    *row_acc.entry(rhs.col_idx[j]).or_insert(ZERO) += a * rhs.values[j];
                }
            }
            triplets.extend(row_acc.iter().map(|(&col, &value)| (row, col, value)));
        }
        Self::from_triplets(self.nrows, rhs.ncols, triplets)
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> CsrMatrix {
        let triplets: Vec<_> = self
            .triplets()
            .map(|(row, col, value)| (col, row, value.conj()))
            .collect();
        Self::from_triplets(self.ncols, self.nrows, triplets)
    }

    /// A new matrix with `shift` added to the listed diagonal entries.
    ///
    /// `self` is left untouched.
    pub fn with_diagonal_added(&self, shifts: impl IntoIterator<Item = (usize, Complex64)>) -> CsrMatrix {
        let extra: Vec<_> = shifts.into_iter().map(|(i, v)| (i, i, v)).collect();
        Self::from_triplets(self.nrows, self.ncols, self.triplets().chain(extra))
    }

    /// Main diagonal as a dense vector.
    pub fn diagonal(&self) -> Array1<Complex64> {
        let n = self.nrows.min(self.ncols);
        Array1::from_iter((0..n).map(|i| self.get(i, i)))
    }

    /// Sum of the main diagonal.
    pub fn trace(&self) -> Complex64 {
        self.diagonal().sum()
    }

    /// Induced 1-norm (maximum absolute column sum) of `A - shift·I`.
    pub fn shifted_one_norm(&self, shift: Complex64) -> f64 {
        let mut col_sums = vec![0.0f64; self.ncols];
        let mut has_diag = vec![false; self.ncols];
        for (row, col, value) in self.triplets() {
            if row == col {
                has_diag[col] = true;
                col_sums[col] += (value - shift).norm();
            } else {
                col_sums[col] += value.norm();
            }
        }
        let shift_abs = shift.norm();
        col_sums
            .iter()
            .zip(&has_diag)
            .enumerate()
            .map(|(col, (&sum, &diag))| {
                if !diag && col < self.nrows {
                    sum + shift_abs
                } else {
                    sum
                }
            })
            .fold(0.0, f64::max)
    }

    /// Induced 1-norm (maximum absolute column sum).
    pub fn one_norm(&self) -> f64 {
        self.shifted_one_norm(ZERO)
    }

    /// True if `A = A†` entrywise within `tol`.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        self.nrows == self.ncols
            && self
                .triplets()
                .all(|(row, col, value)| (value - self.get(col, row).conj()).norm() <= tol)
    }

    /// Dense copy, for inspection and small-system checks.
    pub fn to_dense(&self) -> Array2<Complex64> {
        let mut dense = Array2::zeros((self.nrows, self.ncols));
        for (row, col, value) in self.triplets() {
            dense[[row, col]] = value;
        }
        dense
    }
}
