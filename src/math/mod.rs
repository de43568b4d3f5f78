//! Mathematical building blocks for beam finite elements

pub mod beam;
pub mod frame;
pub mod interpolation;
pub mod quadrature;
pub mod sparse;

use nalgebra::{DMatrix, Matrix3, Matrix4, SMatrix, Vector3};

pub use beam::{
    element_mass, element_stiffness, local_element_mass, local_element_stiffness,
    MASS_QUADRATURE_DEGREE, STIFFNESS_QUADRATURE_DEGREE,
};
pub use frame::ElementFrame;
pub use interpolation::{shape_functions, strain_interpolation};
pub use quadrature::QuadratureRule;
pub use sparse::SparseMatrixBuilder;

pub type Mat = DMatrix<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Mat4 = Matrix4<f64>;
pub type Vec3 = Vector3<f64>;

/// 12x12 matrix for element stiffness/mass
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 4x12 interpolation matrix (axial, two bending, torsion rows)
pub type Mat4x12 = SMatrix<f64, 4, 12>;

/// Largest absolute difference between a square matrix and its transpose
pub fn symmetry_error(m: &Mat) -> f64 {
    let n = m.nrows();
    let mut max = 0.0_f64;
    for i in 0..n {
        for j in (i + 1)..n {
            max = max.max((m[(i, j)] - m[(j, i)]).abs());
        }
    }
    max
}

/// Largest absolute entry of a matrix (0 for an empty matrix)
pub fn max_abs(m: &Mat) -> f64 {
    m.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// Select rows and columns `indices` (same order on both axes)
pub fn submatrix(m: &Mat, indices: &[usize]) -> Mat {
    let n = indices.len();
    Mat::from_fn(n, n, |i, j| m[(indices[i], indices[j])])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetry_error() {
        let mut m = Mat::identity(3, 3);
        assert_eq!(symmetry_error(&m), 0.0);
        m[(0, 2)] = 0.5;
        assert_eq!(symmetry_error(&m), 0.5);
    }

    #[test]
    fn test_submatrix_keeps_order() {
        let m = Mat::from_fn(4, 4, |i, j| (10 * i + j) as f64);
        let s = submatrix(&m, &[3, 1]);
        assert_eq!(s[(0, 0)], 33.0);
        assert_eq!(s[(0, 1)], 31.0);
        assert_eq!(s[(1, 0)], 13.0);
        assert_eq!(s[(1, 1)], 11.0);
    }
}
