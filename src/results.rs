//! Result types for modal analysis

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::elements::{global_dof, Dof, DOFS_PER_NODE};
use crate::error::{VibError, VibResult};
use crate::math::Mat;

/// Assembled global stiffness and mass matrices (`ndof × ndof`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSystem {
    pub stiffness: Mat,
    pub mass: Mat,
}

impl GlobalSystem {
    pub fn ndof(&self) -> usize {
        self.stiffness.nrows()
    }

    /// 6x6 block of `matrix` coupling node `a` to node `b` (1-based)
    pub fn node_block(matrix: &Mat, a: usize, b: usize) -> VibResult<Mat> {
        let node_count = matrix.nrows().min(matrix.ncols()) / DOFS_PER_NODE;
        let row = global_dof(a, Dof::DX, node_count, "node block")?;
        let col = global_dof(b, Dof::DX, node_count, "node block")?;
        Ok(matrix
            .view((row, col), (DOFS_PER_NODE, DOFS_PER_NODE))
            .into_owned())
    }
}

/// Six components of a mode shape at one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl ModeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    pub fn get(&self, dof: Dof) -> f64 {
        match dof {
            Dof::DX => self.dx,
            Dof::DY => self.dy,
            Dof::DZ => self.dz,
            Dof::RX => self.rx,
            Dof::RY => self.ry,
            Dof::RZ => self.rz,
        }
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }

    /// Get rotation magnitude
    pub fn rotation_magnitude(&self) -> f64 {
        (self.rx.powi(2) + self.ry.powi(2) + self.rz.powi(2)).sqrt()
    }
}

/// Natural frequencies and mode shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalResult {
    /// Eigenvalues λ = ω², ascending
    pub eigenvalues: Vec<f64>,
    /// Natural circular frequencies ω in rad/s, ascending
    pub omega: Vec<f64>,
    /// Mode shapes, one column per mode, one row per global DOF.
    /// Constrained DOFs are zero; each column has max |value| = 1.
    pub mode_shapes: Mat,
    /// Spectrum index of the first retained mode
    pub first_mode: usize,
    /// Number of unconstrained DOFs in the solved system
    pub free_dofs: usize,
}

impl ModalResult {
    pub fn num_modes(&self) -> usize {
        self.omega.len()
    }

    /// Natural cyclic frequencies f = ω / 2π in Hz
    pub fn frequencies_hz(&self) -> Vec<f64> {
        self.omega.iter().map(|w| w / (2.0 * PI)).collect()
    }

    /// 1-based mode numbers within the full spectrum
    pub fn mode_numbers(&self) -> Vec<usize> {
        (0..self.num_modes()).map(|i| self.first_mode + i + 1).collect()
    }

    /// Full-DOF mode shape `i` (0-based within the retained modes)
    pub fn mode_shape(&self, i: usize) -> Option<DVector<f64>> {
        if i >= self.num_modes() {
            return None;
        }
        Some(self.mode_shapes.column(i).into_owned())
    }

    /// Mode shape components of retained mode `mode` at node `node` (1-based)
    pub fn node_displacement(&self, mode: usize, node: usize) -> VibResult<ModeDisplacement> {
        if mode >= self.num_modes() {
            return Err(VibError::InvalidInput(format!(
                "mode {mode} not retained ({} modes available)",
                self.num_modes()
            )));
        }
        let node_count = self.mode_shapes.nrows() / DOFS_PER_NODE;
        if node == 0 || node > node_count {
            return Err(VibError::NodeOutOfRange {
                node,
                node_count,
                context: "mode shape lookup".to_string(),
            });
        }
        let base = DOFS_PER_NODE * (node - 1);
        let mut arr = [0.0; 6];
        for (k, v) in arr.iter_mut().enumerate() {
            *v = self.mode_shapes[(base + k, mode)];
        }
        Ok(ModeDisplacement::from_array(arr))
    }

    /// Tabulated frequencies for printing
    pub fn report(&self) -> FrequencyReport {
        FrequencyReport {
            rows: self
                .mode_numbers()
                .into_iter()
                .zip(&self.omega)
                .map(|(mode, &omega)| FrequencyRow {
                    mode,
                    omega,
                    hz: omega / (2.0 * PI),
                })
                .collect(),
        }
    }
}

/// One line of a [`FrequencyReport`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRow {
    /// 1-based mode number
    pub mode: usize,
    /// Circular frequency in rad/s
    pub omega: f64,
    /// Cyclic frequency in Hz
    pub hz: f64,
}

/// Natural frequency table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyReport {
    pub rows: Vec<FrequencyRow>,
}

fn fmt_value(v: f64) -> String {
    if v.abs() < 1.0 {
        format!("{v:12.3e}")
    } else {
        format!("{v:12.3}")
    }
}

impl fmt::Display for FrequencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Natural frequencies (SI units)")?;
        writeln!(f, "{:>6}  {:>14}  {:>14}", "Mode", "omega [rad/s]", "f [Hz]")?;
        writeln!(f, "{}", "-".repeat(38))?;
        for row in &self.rows {
            writeln!(f, "{:>6}  {:>14}  {:>14}", row.mode, fmt_value(row.omega), fmt_value(row.hz))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn result() -> ModalResult {
        let mut shapes = Mat::zeros(12, 2);
        shapes[(6, 0)] = 1.0;
        shapes[(7, 1)] = -1.0;
        shapes[(11, 1)] = 0.25;
        ModalResult {
            eigenvalues: vec![4.0 * PI * PI, 0.25],
            omega: vec![2.0 * PI, 0.5],
            mode_shapes: shapes,
            first_mode: 3,
            free_dofs: 6,
        }
    }

    #[test]
    fn test_frequencies_and_mode_numbers() {
        let r = result();
        assert_relative_eq!(r.frequencies_hz()[0], 1.0, epsilon = 1e-14);
        assert_eq!(r.mode_numbers(), vec![4, 5]);
    }

    #[test]
    fn test_node_displacement_lookup() {
        let r = result();
        let d = r.node_displacement(1, 2).unwrap();
        assert_eq!(d.dy, -1.0);
        assert_eq!(d.get(Dof::RZ), 0.25);
        assert!(r.node_displacement(2, 1).is_err());
        assert!(r.node_displacement(0, 3).is_err());
        assert_eq!(r.mode_shape(0).unwrap()[6], 1.0);
        assert!(r.mode_shape(2).is_none());
    }

    #[test]
    fn test_report_formatting() {
        let text = result().report().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].trim_start().starts_with('4'));
        assert!(lines[3].contains("6.283"));
        assert!(lines[4].contains("e-1"));
    }

    #[test]
    fn test_node_block() {
        let m = Mat::from_fn(12, 12, |i, j| (i * 12 + j) as f64);
        let block = GlobalSystem::node_block(&m, 2, 1).unwrap();
        assert_eq!(block[(0, 0)], (6 * 12) as f64);
        assert_eq!(block.nrows(), 6);

        for (a, b) in [(0, 1), (1, 3), (3, 2)] {
            assert!(matches!(
                GlobalSystem::node_block(&m, a, b),
                Err(VibError::NodeOutOfRange { node_count: 2, .. })
            ));
        }
    }
}
