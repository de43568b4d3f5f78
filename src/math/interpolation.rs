//! Interpolation matrices of the 3D Hermite beam element
//!
//! Both functions take the natural coordinate `s ∈ [-1, 1]` and the element
//! length and return a 4x12 matrix. Row order is axial, bending in the local
//! xy-plane (v, θz), bending in the local xz-plane (w, θy) and torsion. Column
//! order is the 12 local DOFs `[u, v, w, θx, θy, θz]` of node i then node j.
//!
//! The xz-plane row carries the rotation terms with flipped sign, since a
//! positive θy produces a negative slope dw/dx.

use super::Mat4x12;

/// Strain interpolation `B(s)`: axial strain, two curvatures and twist rate
pub fn strain_interpolation(s: f64, length: f64) -> Mat4x12 {
    let l = length;
    let b1 = -1.0 / l;
    let b4 = 1.0 / l;
    let b2 = 6.0 * s / (l * l);
    let b3 = (3.0 * s - 1.0) / l;
    let b5 = -6.0 * s / (l * l);
    let b6 = (3.0 * s + 1.0) / l;

    layout(b1, b2, b3, b4, b5, b6)
}

/// Displacement interpolation `N(s)`: linear for axial/torsion, cubic Hermite for bending
pub fn shape_functions(s: f64, length: f64) -> Mat4x12 {
    let l = length;
    let xi = (1.0 + s) / 2.0;
    let xi2 = xi * xi;
    let xi3 = xi2 * xi;

    let n1 = (1.0 - s) / 2.0;
    let n4 = (1.0 + s) / 2.0;
    let n2 = 1.0 - 3.0 * xi2 + 2.0 * xi3;
    let n3 = l * (xi - 2.0 * xi2 + xi3);
    let n5 = 3.0 * xi2 - 2.0 * xi3;
    let n6 = l * (xi3 - xi2);

    layout(n1, n2, n3, n4, n5, n6)
}

/// Shared row/column placement of the six interpolation terms
fn layout(f1: f64, f2: f64, f3: f64, f4: f64, f5: f64, f6: f64) -> Mat4x12 {
    #[rustfmt::skip]
    let data = [
        f1,  0.0, 0.0, 0.0, 0.0, 0.0, f4,  0.0, 0.0, 0.0, 0.0, 0.0,
        0.0, f2,  0.0, 0.0, 0.0, f3,  0.0, f5,  0.0, 0.0, 0.0, f6,
        0.0, 0.0, f2,  0.0, -f3, 0.0, 0.0, 0.0, f5,  0.0, -f6, 0.0,
        0.0, 0.0, 0.0, f1,  0.0, 0.0, 0.0, 0.0, 0.0, f4,  0.0, 0.0,
    ];
    Mat4x12::from_row_slice(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shape_functions_interpolate_end_values() {
        let l = 2.5;
        let start = shape_functions(-1.0, l);
        let end = shape_functions(1.0, l);

        // u, v, w, θx take the nodal value at each end
        for (row, col) in [(0, 0), (1, 1), (2, 2), (3, 3)] {
            assert_relative_eq!(start[(row, col)], 1.0, epsilon = 1e-14);
            assert_relative_eq!(start[(row, col + 6)], 0.0, epsilon = 1e-14);
            assert_relative_eq!(end[(row, col)], 0.0, epsilon = 1e-14);
            assert_relative_eq!(end[(row, col + 6)], 1.0, epsilon = 1e-14);
        }
        // rotation terms vanish at both ends
        for col in [4, 5, 10, 11] {
            assert_relative_eq!(start[(1, col)].abs() + start[(2, col)].abs(), 0.0, epsilon = 1e-14);
            assert_relative_eq!(end[(1, col)].abs() + end[(2, col)].abs(), 0.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_rigid_translation_has_no_strain() {
        let b = strain_interpolation(0.3, 4.0);
        let mut d = nalgebra::SVector::<f64, 12>::zeros();
        for i in [0, 1, 2, 6, 7, 8] {
            d[i] = 1.0;
        }
        let strain = b * d;
        assert_relative_eq!(strain.norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_curvature_is_derivative_of_shape() {
        // d²N/dx² by central differences in s, with dx = L/2 ds
        let l = 3.0;
        let s = 0.2;
        let h = 1e-4;
        let n_minus = shape_functions(s - h, l);
        let n_mid = shape_functions(s, l);
        let n_plus = shape_functions(s + h, l);
        let b = strain_interpolation(s, l);
        let scale = 4.0 / (l * l);
        for col in [1, 5, 7, 11] {
            let second = (n_plus[(1, col)] - 2.0 * n_mid[(1, col)] + n_minus[(1, col)]) / (h * h);
            assert_relative_eq!(second * scale, b[(1, col)], epsilon = 1e-5);
        }
    }
}
