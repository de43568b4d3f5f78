//! Material and cross-section properties
//!
//! Frame elements reference a combined material/section record by integer id.
//! Records live in a [`MaterialTable`], which rejects unknown ids explicitly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::error::{VibError, VibResult};

/// Combined material and cross-section properties of a beam element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSection {
    /// Modulus of elasticity in Pa
    pub e: f64,
    /// Cross-sectional area in m²
    pub a: f64,
    /// Density in kg/m³
    pub rho: f64,
    /// Second moment of area about local y in m⁴
    pub iy: f64,
    /// Second moment of area about local z in m⁴
    pub iz: f64,
    /// Torsional constant in m⁴
    pub j: f64,
    /// Shear modulus in Pa
    pub g: f64,
    /// Free-form description
    #[serde(default)]
    pub label: String,
}

impl MaterialSection {
    #[allow(clippy::too_many_arguments)]
    pub fn new(e: f64, a: f64, rho: f64, iy: f64, iz: f64, j: f64, g: f64, label: &str) -> Self {
        Self {
            e,
            a,
            rho,
            iy,
            iz,
            j,
            g,
            label: label.to_string(),
        }
    }

    /// Thin or thick walled circular tube.
    ///
    /// `outer_diameter` and `thickness` in m. Iy = Iz and J is the polar moment.
    pub fn tubular(e: f64, g: f64, rho: f64, outer_diameter: f64, thickness: f64, label: &str) -> Self {
        let r_o = outer_diameter / 2.0;
        let r_i = r_o - thickness;
        let a = PI * (r_o.powi(2) - r_i.powi(2));
        let i = PI / 4.0 * (r_o.powi(4) - r_i.powi(4));
        let j = PI / 2.0 * (r_o.powi(4) - r_i.powi(4));
        Self::new(e, a, rho, i, i, j, g, label)
    }

    /// Stiffness property vector `[E, A, Iz, Iy, G, J]`
    pub fn stiffness_properties(&self) -> [f64; 6] {
        [self.e, self.a, self.iz, self.iy, self.g, self.j]
    }

    /// Mass per unit length (ρA)
    pub fn mass_per_length(&self) -> f64 {
        self.rho * self.a
    }

    pub(crate) fn validate(&self, id: u32) -> VibResult<()> {
        let values = [self.e, self.a, self.rho, self.iy, self.iz, self.j, self.g];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(VibError::NonFiniteValue(format!("material {id}")));
        }
        if values.iter().any(|&v| v < 0.0) {
            return Err(VibError::InvalidInput(format!(
                "material {id} has a negative property"
            )));
        }
        Ok(())
    }
}

/// Tube dimensions `[outer diameter, wall thickness]` in m
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TubeDimensions {
    pub outer_diameter: f64,
    pub thickness: f64,
}

impl TubeDimensions {
    pub fn new(outer_diameter: f64, thickness: f64) -> Self {
        Self {
            outer_diameter,
            thickness,
        }
    }
}

/// Per-level brace and leg tube sizes of a levelled lattice structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSpec {
    /// Declared number of levels
    pub levels: usize,
    /// Brace dimensions, one entry per level
    pub braces: Vec<TubeDimensions>,
    /// Leg dimensions, one entry per level
    pub legs: Vec<TubeDimensions>,
    pub brace_modulus: f64,
    pub leg_modulus: f64,
    pub shear_modulus: f64,
    pub density: f64,
}

/// Id-keyed lookup of material/section records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialTable {
    sections: BTreeMap<u32, MaterialSection>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the record previously stored under `id`
    pub fn insert(&mut self, id: u32, section: MaterialSection) -> Option<MaterialSection> {
        self.sections.insert(id, section)
    }

    pub fn with(mut self, id: u32, section: MaterialSection) -> Self {
        self.insert(id, section);
        self
    }

    /// Look up a record, failing for unknown ids
    pub fn get(&self, id: u32) -> VibResult<&MaterialSection> {
        self.sections.get(&id).ok_or(VibError::UnknownMaterial(id))
    }

    pub fn contains(&self, id: u32) -> bool {
        self.sections.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &MaterialSection)> {
        self.sections.iter().map(|(&id, s)| (id, s))
    }

    /// Build brace and leg sections for a levelled structure.
    ///
    /// Braces get ids `1..=levels`, legs `levels+1..=2*levels`. Fails with
    /// [`VibError::LevelCountMismatch`] unless both dimension lists have one
    /// entry per declared level.
    pub fn from_levels(layout: &LevelSpec) -> VibResult<Self> {
        if layout.braces.len() != layout.levels || layout.legs.len() != layout.levels {
            return Err(VibError::LevelCountMismatch {
                levels: layout.levels,
                braces: layout.braces.len(),
                legs: layout.legs.len(),
            });
        }

        let mut table = Self::new();
        for (i, (brace, leg)) in layout.braces.iter().zip(&layout.legs).enumerate() {
            let level = level_letter(i);
            table.insert(
                (i + 1) as u32,
                MaterialSection::tubular(
                    layout.brace_modulus,
                    layout.shear_modulus,
                    layout.density,
                    brace.outer_diameter,
                    brace.thickness,
                    &format!("Steel rod brace level {level}"),
                ),
            );
            table.insert(
                (i + 1 + layout.levels) as u32,
                MaterialSection::tubular(
                    layout.leg_modulus,
                    layout.shear_modulus,
                    layout.density,
                    leg.outer_diameter,
                    leg.thickness,
                    &format!("Steel rod leg level {level}"),
                ),
            );
        }
        Ok(table)
    }

    /// Next unused id after the largest one present
    pub fn next_id(&self) -> u32 {
        self.sections.keys().next_back().map_or(1, |id| id + 1)
    }
}

fn level_letter(index: usize) -> String {
    if index < 26 {
        char::from(b'A' + index as u8).to_string()
    } else {
        (index + 1).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn steel_levels(levels: usize, braces: usize, legs: usize) -> LevelSpec {
        LevelSpec {
            levels,
            braces: vec![TubeDimensions::new(12.7e-3, 1e-3); braces],
            legs: vec![TubeDimensions::new(50e-3, 1.5e-3); legs],
            brace_modulus: 195e9,
            leg_modulus: 215e9,
            shear_modulus: 79.3e9,
            density: 7850.0,
        }
    }

    #[test]
    fn test_tubular_section() {
        let s = MaterialSection::tubular(210e9, 80e9, 7850.0, 0.1, 0.01, "tube");
        let r_o: f64 = 0.05;
        let r_i: f64 = 0.04;
        assert_relative_eq!(s.a, PI * (r_o * r_o - r_i * r_i), epsilon = 1e-14);
        assert_relative_eq!(s.j, 2.0 * s.iy, epsilon = 1e-18);
        assert_eq!(s.iy, s.iz);
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        let table = MaterialTable::new().with(1, MaterialSection::tubular(1.0, 1.0, 1.0, 0.1, 0.01, ""));
        assert!(table.get(1).is_ok());
        assert!(matches!(table.get(2), Err(VibError::UnknownMaterial(2))));
    }

    #[test]
    fn test_level_table_ids_and_labels() {
        let table = MaterialTable::from_levels(&steel_levels(4, 4, 4)).unwrap();
        assert_eq!(table.len(), 8);
        assert_eq!(table.get(1).unwrap().label, "Steel rod brace level A");
        assert_eq!(table.get(8).unwrap().label, "Steel rod leg level D");
        assert_eq!(table.get(5).unwrap().e, 215e9);
        assert_eq!(table.next_id(), 9);
    }

    #[test]
    fn test_level_count_mismatch() {
        let err = MaterialTable::from_levels(&steel_levels(4, 3, 4)).unwrap_err();
        assert!(matches!(
            err,
            VibError::LevelCountMismatch { levels: 4, braces: 3, legs: 4 }
        ));
        assert!(MaterialTable::from_levels(&steel_levels(4, 4, 5)).is_err());
    }
}
