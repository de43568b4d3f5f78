//! Gauss-Legendre quadrature on [-1, 1]
//!
//! Rules are selected by the polynomial degree they must integrate exactly:
//! an n-point rule is exact up to degree 2n - 1.

use crate::error::{VibError, VibResult};

/// Highest polynomial degree with a tabulated rule
pub const MAX_QUADRATURE_DEGREE: usize = 9;

const POINTS_1: [(f64, f64); 1] = [(0.0, 2.0)];

const POINTS_2: [(f64, f64); 2] = [
    (-0.577350269189626, 1.0),
    (0.577350269189626, 1.0),
];

const POINTS_3: [(f64, f64); 3] = [
    (-0.774596669241483, 0.555555555555556),
    (0.0, 0.888888888888889),
    (0.774596669241483, 0.555555555555556),
];

const POINTS_4: [(f64, f64); 4] = [
    (-0.861136311594053, 0.347854845137454),
    (-0.339981043584856, 0.652145154862546),
    (0.339981043584856, 0.652145154862546),
    (0.861136311594053, 0.347854845137454),
];

const POINTS_5: [(f64, f64); 5] = [
    (-0.906179845938664, 0.236926885056189),
    (-0.538469310105683, 0.478628670499366),
    (0.0, 0.568888888888889),
    (0.538469310105683, 0.478628670499366),
    (0.906179845938664, 0.236926885056189),
];

/// A 1D Gauss-Legendre rule as `(point, weight)` pairs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureRule {
    points: &'static [(f64, f64)],
}

impl QuadratureRule {
    /// Rule that integrates polynomials up to `degree` exactly.
    ///
    /// Degrees above [`MAX_QUADRATURE_DEGREE`] are rejected.
    pub fn for_degree(degree: usize) -> VibResult<Self> {
        let points: &'static [(f64, f64)] = match degree {
            0..=1 => &POINTS_1,
            2..=3 => &POINTS_2,
            4..=5 => &POINTS_3,
            6..=7 => &POINTS_4,
            8..=9 => &POINTS_5,
            _ => return Err(VibError::UnsupportedQuadratureDegree(degree)),
        };
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Integration points in ascending order
    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(x, _)| x)
    }

    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(_, w)| w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().copied()
    }

    /// Integrate `f` over [-1, 1]
    pub fn integrate<F: Fn(f64) -> f64>(&self, f: F) -> f64 {
        self.iter().map(|(x, w)| w * f(x)).sum()
    }
}
