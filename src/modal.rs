//! Modal solver: constrained generalized eigenproblem `K x = λ M x`
//!
//! # Workflow
//! 1. Partition DOFs into free and constrained sets
//! 2. Reduce K and M to the free DOFs
//! 3. Cholesky-reduce to a standard symmetric problem `L⁻¹ K L⁻ᵀ ψ = λ ψ`
//! 4. Sort eigenpairs ascending and keep the requested index range
//! 5. Back-transform `x = L⁻ᵀ ψ`, take `ω = √λ`
//! 6. Scale each mode to max |x| = 1 and re-expand to all DOFs with zeros
//!    at constrained positions

use log::{debug, info, warn};
use nalgebra::linalg::{Cholesky, SymmetricEigen};

use crate::analysis::{AnalysisOptions, ModeRange};
use crate::elements::{global_dof, BoundaryConstraint, DOFS_PER_NODE};
use crate::error::{VibError, VibResult};
use crate::math::{max_abs, submatrix, symmetry_error, Mat};
use crate::results::ModalResult;

/// Restrict `matrix` to the rows and columns listed in `dofs`, in that order
pub fn reduce_matrix(matrix: &Mat, dofs: &[usize]) -> Mat {
    submatrix(matrix, dofs)
}

/// Split of the global DOFs into solved and eliminated sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DofPartition {
    /// No constraints: every DOF is solved
    Unconstrained { ndof: usize },
    /// Constrained DOFs are removed before solving
    Constrained {
        ndof: usize,
        /// Ascending free DOF indices
        free: Vec<usize>,
        /// Ascending, deduplicated constrained DOF indices
        constrained: Vec<usize>,
    },
}

impl DofPartition {
    /// Build the partition for a model with `node_count` nodes.
    ///
    /// Only the (node, DOF) pair of each constraint matters. A non-zero
    /// prescribed displacement is not applied.
    pub fn new(constraints: &[BoundaryConstraint], node_count: usize) -> VibResult<Self> {
        let ndof = node_count * DOFS_PER_NODE;
        if constraints.is_empty() {
            return Ok(Self::Unconstrained { ndof });
        }

        let mut is_constrained = vec![false; ndof];
        for c in constraints {
            let dof = global_dof(c.node, c.dof, node_count, "boundary constraint")?;
            if c.displacement != 0.0 {
                warn!(
                    "Prescribed displacement {} at node {} DOF {} is not applied in modal analysis",
                    c.displacement,
                    c.node,
                    c.dof.number()
                );
            }
            is_constrained[dof] = true;
        }

        let (constrained, free): (Vec<usize>, Vec<usize>) =
            (0..ndof).partition(|&i| is_constrained[i]);
        Ok(Self::Constrained {
            ndof,
            free,
            constrained,
        })
    }

    pub fn ndof(&self) -> usize {
        match self {
            Self::Unconstrained { ndof } | Self::Constrained { ndof, .. } => *ndof,
        }
    }

    pub fn free_count(&self) -> usize {
        match self {
            Self::Unconstrained { ndof } => *ndof,
            Self::Constrained { free, .. } => free.len(),
        }
    }

    /// Free DOF indices, ascending
    pub fn free_dofs(&self) -> Vec<usize> {
        match self {
            Self::Unconstrained { ndof } => (0..*ndof).collect(),
            Self::Constrained { free, .. } => free.clone(),
        }
    }

    pub fn constrained_dofs(&self) -> &[usize] {
        match self {
            Self::Unconstrained { .. } => &[],
            Self::Constrained { constrained, .. } => constrained,
        }
    }

    /// Restrict a global matrix to the free DOFs
    pub fn reduce(&self, matrix: &Mat) -> Mat {
        match self {
            Self::Unconstrained { .. } => matrix.clone(),
            Self::Constrained { free, .. } => reduce_matrix(matrix, free),
        }
    }

    /// Expand free-DOF columns to all DOFs, zero-filling constrained rows
    pub fn expand(&self, reduced: &Mat) -> Mat {
        match self {
            Self::Unconstrained { .. } => reduced.clone(),
            Self::Constrained { ndof, free, .. } => {
                let mut full = Mat::zeros(*ndof, reduced.ncols());
                for (r, &dof) in free.iter().enumerate() {
                    full.row_mut(dof).copy_from(&reduced.row(r));
                }
                full
            }
        }
    }
}

/// Scale each column by its largest absolute component.
///
/// All-zero columns are left unchanged.
pub fn normalize_modes(modes: &mut Mat) {
    for mut col in modes.column_iter_mut() {
        let max_disp = col.amax();
        if max_disp > 0.0 {
            col /= max_disp;
        }
    }
}

/// Ascending eigenvalues and M-orthonormal eigenvectors of `K x = λ M x`
struct EigenPairs {
    values: Vec<f64>,
    vectors: Mat,
}

fn check_finite(m: &Mat, name: &str) -> VibResult<()> {
    if m.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(VibError::NonFiniteValue(name.to_string()))
    }
}

/// Dense symmetric generalized eigensolve via Cholesky reduction
fn generalized_eigen(k: &Mat, m: &Mat) -> VibResult<EigenPairs> {
    let chol = Cholesky::new(m.clone()).ok_or(VibError::MassNotPositiveDefinite)?;
    let l = chol.l();

    // A = L⁻¹ K L⁻ᵀ, using K = Kᵀ: A = L⁻¹ (L⁻¹ K)ᵀ
    let l_inv_k = l
        .solve_lower_triangular(k)
        .ok_or(VibError::MassNotPositiveDefinite)?;
    let mut a = l
        .solve_lower_triangular(&l_inv_k.transpose())
        .ok_or(VibError::MassNotPositiveDefinite)?;
    a = (&a + a.transpose()) * 0.5;

    let eigen = SymmetricEigen::new(a);

    let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
    order.sort_by(|&i, &j| eigen.eigenvalues[i].total_cmp(&eigen.eigenvalues[j]));

    let values: Vec<f64> = order.iter().map(|&i| eigen.eigenvalues[i]).collect();
    let psi = Mat::from_fn(eigen.eigenvectors.nrows(), order.len(), |r, c| {
        eigen.eigenvectors[(r, order[c])]
    });

    let vectors = l
        .transpose()
        .solve_upper_triangular(&psi)
        .ok_or(VibError::MassNotPositiveDefinite)?;

    Ok(EigenPairs { values, vectors })
}

/// Dense generalized eigenvalue solver with mode selection
#[derive(Debug, Clone, Default)]
pub struct ModalSolver {
    options: AnalysisOptions,
}

impl ModalSolver {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    fn check_inputs(&self, k: &Mat, m: &Mat, partition: &DofPartition) -> VibResult<()> {
        let ndof = partition.ndof();
        for (name, mat) in [("stiffness matrix", k), ("mass matrix", m)] {
            if mat.nrows() != ndof || mat.ncols() != ndof {
                return Err(VibError::DimensionMismatch(format!(
                    "{name} is {}x{}, expected {ndof}x{ndof}",
                    mat.nrows(),
                    mat.ncols()
                )));
            }
            check_finite(mat, name)?;
            if self.options.check_symmetry {
                let scale = max_abs(mat).max(f64::MIN_POSITIVE);
                let err = symmetry_error(mat);
                if err > self.options.symmetry_tolerance * scale {
                    return Err(VibError::InvalidInput(format!(
                        "{name} is not symmetric (max |A - Aᵀ| = {err:e})"
                    )));
                }
            }
        }
        Ok(())
    }

    fn resolve_range(&self, available: usize) -> VibResult<ModeRange> {
        let range = self.options.subset.unwrap_or(ModeRange::first(available));
        if range.start >= range.end || range.end > available {
            return Err(VibError::SubsetOutOfRange {
                start: range.start,
                end: range.end,
                available,
            });
        }
        Ok(range)
    }

    /// Circular frequencies of the selected eigenvalues.
    ///
    /// `scale` is the largest |λ| of the whole spectrum.
    fn frequencies(&self, values: &[f64], first: usize, scale: f64) -> VibResult<Vec<f64>> {
        let tol = self.options.eigenvalue_tolerance * scale;
        values
            .iter()
            .enumerate()
            .map(|(i, &lambda)| {
                if !lambda.is_finite() {
                    return Err(VibError::NonFiniteValue(format!("eigenvalue {}", first + i)));
                }
                if lambda < -tol {
                    return Err(VibError::NegativeEigenvalue {
                        index: first + i,
                        value: lambda,
                    });
                }
                if lambda < 0.0 {
                    debug!("Eigenvalue {} = {lambda:e} treated as a zero frequency", first + i);
                }
                Ok(lambda.max(0.0).sqrt())
            })
            .collect()
    }

    /// Solve for natural frequencies and full-DOF mode shapes
    pub fn solve(&self, k: &Mat, m: &Mat, partition: &DofPartition) -> VibResult<ModalResult> {
        self.check_inputs(k, m, partition)?;

        let n_free = partition.free_count();
        if n_free == 0 {
            return Err(VibError::NoFreeDofs);
        }
        let range = self.resolve_range(n_free)?;

        let k_free = partition.reduce(k);
        let m_free = partition.reduce(m);
        info!(
            "Solving eigenproblem: {} free of {} DOFs, modes [{}, {})",
            n_free,
            partition.ndof(),
            range.start,
            range.end
        );

        let pairs = generalized_eigen(&k_free, &m_free)?;
        let scale = pairs.values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

        let eigenvalues = pairs.values[range.as_range()].to_vec();
        let omega = self.frequencies(&eigenvalues, range.start, scale)?;

        let mut modes = pairs.vectors.columns(range.start, range.len()).into_owned();
        normalize_modes(&mut modes);
        let mode_shapes = partition.expand(&modes);

        debug!("Lowest retained eigenvalue {:e}", eigenvalues[0]);

        Ok(ModalResult {
            eigenvalues,
            omega,
            mode_shapes,
            first_mode: range.start,
            free_dofs: n_free,
        })
    }
}
