//! Sparse triplet storage for assembled global matrices
//!
//! Frame stiffness and mass matrices are mostly zeros: each node couples only
//! to its neighbours. The builder collects COO triplets during scatter-add and
//! converts to CSR, where duplicate entries are summed.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::assembly::MatrixAccumulator;

/// Sparse matrix builder using COO format
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a builder for a `size × size` matrix
    pub fn new(size: usize) -> Self {
        // Two-node elements touch 144 entries each; reserve for ~2 elements per node
        let estimated_nnz = size * 48;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Convert to CSR format, summing duplicate entries
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);
        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }
        CsrMatrix::from(&coo)
    }

    /// Convert to a dense matrix
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);
        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }
        mat
    }

    /// Number of stored triplets (duplicates counted separately)
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Fraction of zero entries, based on stored triplets
    pub fn sparsity(&self) -> f64 {
        if self.size == 0 {
            return 1.0;
        }
        let total = self.size * self.size;
        1.0 - (self.entries.len() as f64 / total as f64)
    }
}

impl MatrixAccumulator for SparseMatrixBuilder {
    fn dim(&self) -> usize {
        self.size
    }

    #[inline]
    fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }
}
