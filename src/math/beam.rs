//! Stiffness and consistent mass matrices of the 3D beam element
//!
//! Both matrices are integrated numerically over the natural coordinate with
//! Jacobian `L/2` and rotated to global axes as `Aᵀ k_l A`.

use super::{ElementFrame, Mat12, Mat4, Mat4x12, QuadratureRule};
use super::interpolation::{shape_functions, strain_interpolation};
use crate::elements::MaterialSection;
use crate::error::VibResult;

/// Polynomial degree integrated for stiffness (BᵀDB is quadratic)
pub const STIFFNESS_QUADRATURE_DEGREE: usize = 3;

/// Polynomial degree integrated for mass (NᵀDN is up to degree 6)
pub const MASS_QUADRATURE_DEGREE: usize = 6;

/// Local material matrix `diag(EA, EIz, EIy, GJ)`
pub fn stiffness_material_matrix(section: &MaterialSection) -> Mat4 {
    let [e, a, iz, iy, g, j] = section.stiffness_properties();
    Mat4::from_diagonal(&nalgebra::Vector4::new(e * a, e * iz, e * iy, g * j))
}

/// Local inertia matrix `diag(ρA, ρA, ρA, ρJ)`.
///
/// Torsional inertia uses the torsional constant J in place of the polar
/// moment of area. Rotary inertia of the bending rotations is neglected.
pub fn mass_material_matrix(section: &MaterialSection) -> Mat4 {
    let rho_a = section.mass_per_length();
    Mat4::from_diagonal(&nalgebra::Vector4::new(
        rho_a,
        rho_a,
        rho_a,
        section.rho * section.j,
    ))
}

fn integrate<F>(length: f64, degree: usize, d: &Mat4, interpolation: F) -> VibResult<Mat12>
where
    F: Fn(f64, f64) -> Mat4x12,
{
    let rule = QuadratureRule::for_degree(degree)?;
    let jacobian = length / 2.0;

    let mut k = Mat12::zeros();
    for (s, w) in rule.iter() {
        let b = interpolation(s, length);
        k += b.transpose() * d * b * (w * jacobian);
    }
    Ok(k)
}

/// Local-axis stiffness of an element of the given length
pub fn local_element_stiffness(length: f64, section: &MaterialSection, degree: usize) -> VibResult<Mat12> {
    let d = stiffness_material_matrix(section);
    integrate(length, degree, &d, strain_interpolation)
}

/// Local-axis consistent mass of an element of the given length
pub fn local_element_mass(length: f64, section: &MaterialSection, degree: usize) -> VibResult<Mat12> {
    let d = mass_material_matrix(section);
    integrate(length, degree, &d, shape_functions)
}

/// Element stiffness in global axes
pub fn element_stiffness(
    n1: &[f64; 3],
    n2: &[f64; 3],
    section: &MaterialSection,
    degree: usize,
) -> VibResult<Mat12> {
    let frame = ElementFrame::new(n1, n2)?;
    let k_l = local_element_stiffness(frame.length(), section, degree)?;
    let a = frame.transformation();
    Ok(a.transpose() * k_l * a)
}

/// Element consistent mass in global axes
pub fn element_mass(
    n1: &[f64; 3],
    n2: &[f64; 3],
    section: &MaterialSection,
    degree: usize,
) -> VibResult<Mat12> {
    let frame = ElementFrame::new(n1, n2)?;
    let m_l = local_element_mass(frame.length(), section, degree)?;
    let a = frame.transformation();
    Ok(a.transpose() * m_l * a)
}
