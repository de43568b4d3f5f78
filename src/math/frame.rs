//! Local coordinate frame of a two-node beam element

use super::{Mat12, Mat3, Vec3};
use crate::error::{VibError, VibResult};

/// Elements shorter than this are treated as degenerate
pub const ZERO_LENGTH_TOLERANCE: f64 = 1e-10;

/// Component tolerance for treating the element axis as parallel to global Z
pub const PARALLEL_TOLERANCE: f64 = 1e-8;

/// Local axes and length of a beam element.
///
/// `xl` points from the first node to the second. For elements not parallel to
/// global Z, `yl = Z × xl` (normalized) so `yl` lies in the global XY plane.
/// Elements along ±Z use global Y as `yl` instead, since `Z × xl` vanishes.
/// In both cases `zl = xl × yl`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementFrame {
    length: f64,
    /// Rows are the local axes expressed in global coordinates
    c: Mat3,
}

impl ElementFrame {
    pub fn new(n1: &[f64; 3], n2: &[f64; 3]) -> VibResult<Self> {
        let p1 = Vec3::from(*n1);
        let p2 = Vec3::from(*n2);
        let d = p2 - p1;
        let length = d.norm();

        if !length.is_finite() {
            return Err(VibError::DegenerateElement {
                element: format!("{n1:?} -> {n2:?}"),
                reason: "non-finite node coordinates".to_string(),
            });
        }
        if length < ZERO_LENGTH_TOLERANCE {
            return Err(VibError::DegenerateElement {
                element: format!("{n1:?} -> {n2:?}"),
                reason: format!("length {length:e} is zero (coincident nodes)"),
            });
        }

        let xl = d / length;
        let z = Vec3::z();

        let yl = if is_parallel_to_z(&xl) {
            Vec3::y()
        } else {
            z.cross(&xl).normalize()
        };
        let zl = xl.cross(&yl);

        let c = Mat3::from_rows(&[xl.transpose(), yl.transpose(), zl.transpose()]);
        Ok(Self { length, c })
    }

    /// Element length
    pub fn length(&self) -> f64 {
        self.length
    }

    /// 3x3 direction cosine matrix `[xl; yl; zl]`
    pub fn direction_cosines(&self) -> &Mat3 {
        &self.c
    }

    pub fn local_x(&self) -> Vec3 {
        self.c.row(0).transpose()
    }

    pub fn local_y(&self) -> Vec3 {
        self.c.row(1).transpose()
    }

    pub fn local_z(&self) -> Vec3 {
        self.c.row(2).transpose()
    }

    /// 12x12 global-to-local transformation.
    ///
    /// Block diagonal with the direction cosine matrix repeated for the
    /// translations and rotations of both end nodes.
    pub fn transformation(&self) -> Mat12 {
        let mut t = Mat12::zeros();
        for block in 0..4 {
            let offset = block * 3;
            t.fixed_view_mut::<3, 3>(offset, offset).copy_from(&self.c);
        }
        t
    }
}

fn is_parallel_to_z(xl: &Vec3) -> bool {
    let z = Vec3::z();
    (xl.abs() - z).amax() <= PARALLEL_TOLERANCE
}
