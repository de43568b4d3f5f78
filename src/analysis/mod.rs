//! Modal analysis options

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Half-open ascending index range `[start, end)` over the eigenvalue spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeRange {
    pub start: usize,
    pub end: usize,
}

impl ModeRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The lowest `count` modes
    pub fn first(count: usize) -> Self {
        Self::new(0, count)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for ModeRange {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// Options for modal analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Modes to keep (None = full spectrum)
    pub subset: Option<ModeRange>,
    /// Eigenvalues below `-eigenvalue_tolerance * max|λ|` are reported as
    /// errors; smaller negative round-off is treated as a zero frequency
    pub eigenvalue_tolerance: f64,
    /// Verify K and M are symmetric before solving
    pub check_symmetry: bool,
    /// Allowed `max|K - Kᵀ|` relative to `max|K|`
    pub symmetry_tolerance: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            subset: None,
            eigenvalue_tolerance: 1e-9,
            check_symmetry: true,
            symmetry_tolerance: 1e-10,
        }
    }
}

impl AnalysisOptions {
    /// Full-spectrum modal analysis
    pub fn modal() -> Self {
        Self::default()
    }

    /// Keep only the modes in `range`
    pub fn with_subset(mut self, range: impl Into<ModeRange>) -> Self {
        self.subset = Some(range.into());
        self
    }

    /// Keep the lowest `count` modes
    pub fn with_modes(self, count: usize) -> Self {
        self.with_subset(ModeRange::first(count))
    }

    /// Set the negative eigenvalue tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.eigenvalue_tolerance = tol;
        self
    }

    pub fn without_symmetry_check(mut self) -> Self {
        self.check_symmetry = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let opts = AnalysisOptions::modal().with_subset(2..5).with_tolerance(1e-6);
        assert_eq!(opts.subset, Some(ModeRange::new(2, 5)));
        assert_eq!(opts.subset.unwrap().len(), 3);
        assert_eq!(opts.eigenvalue_tolerance, 1e-6);
        assert!(opts.check_symmetry);
    }

    #[test]
    fn test_deserialize_partial_options() {
        let opts: AnalysisOptions = serde_json::from_str(r#"{"subset":{"start":0,"end":4}}"#).unwrap();
        assert_eq!(opts.subset, Some(ModeRange::first(4)));
        assert_eq!(opts.eigenvalue_tolerance, 1e-9);
    }
}
