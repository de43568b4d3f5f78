//! Frame model - inputs, assembly and modal analysis pipeline

use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::AnalysisOptions;
use crate::assembly::{add_lumped_masses, add_springs, GlobalAssembler};
use crate::elements::{
    BoundaryConstraint, Element, LumpedMass, MaterialTable, Node, SpringSupport, DOFS_PER_NODE,
};
use crate::error::{VibError, VibResult};
use crate::mesh;
use crate::modal::{DofPartition, ModalSolver};
use crate::results::{GlobalSystem, ModalResult};

/// Serialized model input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub materials: MaterialTable,
    #[serde(default)]
    pub constraints: Vec<BoundaryConstraint>,
    #[serde(default)]
    pub springs: Vec<SpringSupport>,
    #[serde(default)]
    pub lumped_masses: Vec<LumpedMass>,
}

impl ModelDefinition {
    pub fn from_json_str(json: &str) -> VibResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> VibResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> VibResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A 3D frame with supports, springs and added masses
#[derive(Debug, Clone)]
pub struct FrameModel {
    nodes: Vec<Node>,
    elements: Vec<Element>,
    materials: MaterialTable,
    constraints: Vec<BoundaryConstraint>,
    springs: Vec<SpringSupport>,
    lumped_masses: Vec<LumpedMass>,

    system: Option<GlobalSystem>,
    modal: Option<ModalResult>,
}

impl FrameModel {
    pub fn new(nodes: Vec<Node>, elements: Vec<Element>, materials: MaterialTable) -> Self {
        Self {
            nodes,
            elements,
            materials,
            constraints: Vec::new(),
            springs: Vec::new(),
            lumped_masses: Vec::new(),
            system: None,
            modal: None,
        }
    }

    pub fn from_definition(def: ModelDefinition) -> Self {
        Self::new(def.nodes, def.elements, def.materials)
            .with_constraints(def.constraints)
            .with_springs(def.springs)
            .with_lumped_masses(def.lumped_masses)
    }

    pub fn with_constraints(mut self, constraints: Vec<BoundaryConstraint>) -> Self {
        self.constraints = constraints;
        self.invalidate();
        self
    }

    pub fn with_springs(mut self, springs: Vec<SpringSupport>) -> Self {
        self.springs = springs;
        self.invalidate();
        self
    }

    pub fn with_lumped_masses(mut self, masses: Vec<LumpedMass>) -> Self {
        self.lumped_masses = masses;
        self.invalidate();
        self
    }

    /// Split every element into `divisions` equal parts.
    ///
    /// Existing node numbers are preserved, so constraints, springs and
    /// lumped masses stay attached to the same points.
    pub fn refined(self, divisions: usize) -> VibResult<Self> {
        let (nodes, elements) = mesh::subdivide(&self.nodes, &self.elements, divisions)?;
        Ok(Self {
            nodes,
            elements,
            system: None,
            modal: None,
            ..self
        })
    }

    fn invalidate(&mut self) {
        self.system = None;
        self.modal = None;
    }

    // ========================
    // Analysis Stages
    // ========================

    /// Build the global mass (with lumped masses) and stiffness (with springs)
    pub fn assemble(&self) -> VibResult<GlobalSystem> {
        let assembler = GlobalAssembler::new(&self.nodes, &self.elements, &self.materials)?;
        let node_count = self.node_count();

        let mut mass = assembler.mass()?;
        add_lumped_masses(&mut mass, &self.lumped_masses, node_count)?;

        let mut stiffness = assembler.stiffness()?;
        if !self.springs.is_empty() {
            add_springs(&mut stiffness, &self.springs, node_count)?;
        }

        info!(
            "Assembled {} elements on {} nodes ({} DOFs), {} springs, {} lumped masses",
            self.elements.len(),
            node_count,
            self.ndof(),
            self.springs.len(),
            self.lumped_masses.len()
        );
        Ok(GlobalSystem { stiffness, mass })
    }

    /// Free/constrained DOF split from the boundary constraints
    pub fn partition(&self) -> VibResult<DofPartition> {
        DofPartition::new(&self.constraints, self.node_count())
    }

    /// Assemble and solve the constrained eigenproblem
    pub fn analyze(&mut self, options: &AnalysisOptions) -> VibResult<&ModalResult> {
        self.invalidate();
        let system = self.assemble()?;
        let partition = self.partition()?;
        let result =
            ModalSolver::new(options.clone()).solve(&system.stiffness, &system.mass, &partition)?;

        info!(
            "Modal analysis complete: {} modes, lowest {:.4} rad/s",
            result.num_modes(),
            result.omega.first().copied().unwrap_or(0.0)
        );
        self.system = Some(system);
        Ok(&*self.modal.insert(result))
    }

    // ========================
    // Accessors
    // ========================

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn constraints(&self) -> &[BoundaryConstraint] {
        &self.constraints
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn ndof(&self) -> usize {
        self.node_count() * DOFS_PER_NODE
    }

    /// Matrices from the last analysis
    pub fn system(&self) -> Option<&GlobalSystem> {
        self.system.as_ref()
    }

    /// Modal results from the last analysis
    pub fn modal(&self) -> VibResult<&ModalResult> {
        self.modal.as_ref().ok_or(VibError::NotAnalyzed)
    }

    pub fn is_analyzed(&self) -> bool {
        self.modal.is_some()
    }

    pub fn to_definition(&self) -> ModelDefinition {
        ModelDefinition {
            nodes: self.nodes.clone(),
            elements: self.elements.clone(),
            materials: self.materials.clone(),
            constraints: self.constraints.clone(),
            springs: self.springs.clone(),
            lumped_masses: self.lumped_masses.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Dof, MaterialSection};
    use approx::assert_relative_eq;

    const LENGTH: f64 = 10.0;

    fn steel() -> MaterialSection {
        MaterialSection::new(200e9, 0.01, 7850.0, 1e-5, 1e-5, 2e-5, 77e9, "steel bar")
    }

    fn cantilever() -> FrameModel {
        FrameModel::new(
            vec![Node::new(0.0, 0.0, 0.0), Node::new(LENGTH, 0.0, 0.0)],
            vec![Element::new(1, 2, 1)],
            MaterialTable::new().with(1, steel()),
        )
        .with_constraints(BoundaryConstraint::fixed(1))
    }

    fn closed_form_first_bending() -> f64 {
        let s = steel();
        (1.875104 / LENGTH).powi(2) * (s.e * s.iz / (s.rho * s.a)).sqrt()
    }

    #[test]
    fn test_cantilever_first_frequency() {
        let mut model = cantilever();
        let result = model.analyze(&AnalysisOptions::modal()).unwrap();

        assert_eq!(result.num_modes(), 6);
        let expected = closed_form_first_bending();
        assert_relative_eq!(result.omega[0], expected, max_relative = 0.02);
        // Iy = Iz: both bending planes share the frequency
        assert_relative_eq!(result.omega[1], result.omega[0], max_relative = 1e-8);

        // Fixed node is zero in every mode
        for mode in 0..result.num_modes() {
            let d = result.node_displacement(mode, 1).unwrap();
            assert_eq!(d.translation_magnitude() + d.rotation_magnitude(), 0.0);
        }
    }

    #[test]
    fn test_modal_before_analysis() {
        let model = cantilever();
        assert!(matches!(model.modal(), Err(VibError::NotAnalyzed)));
        assert!(model.system().is_none());
        assert!(!model.is_analyzed());
    }

    #[test]
    fn test_repeat_analysis_is_deterministic() {
        let mut model = cantilever();
        let first = model.analyze(&AnalysisOptions::modal()).unwrap().omega.clone();
        let second = model.analyze(&AnalysisOptions::modal()).unwrap().omega.clone();
        assert_eq!(first, second);
        assert_eq!(model.system().unwrap().ndof(), 12);
    }

    #[test]
    fn test_spring_stiffens_one_plane_only() {
        let base = cantilever().analyze(&AnalysisOptions::modal()).unwrap().omega.clone();

        let mut model =
            cantilever().with_springs(vec![SpringSupport::new(2, Dof::DY, 1e6)]);
        let result = model.analyze(&AnalysisOptions::modal()).unwrap();
        assert_relative_eq!(result.omega[0], base[0], max_relative = 1e-8);
        assert!(result.omega[1] > 1.5 * base[1]);
        assert!(result.node_displacement(0, 2).unwrap().dy.abs() < 1e-8);
    }

    #[test]
    fn test_lumped_mass_lowers_frequency() {
        let base = cantilever().analyze(&AnalysisOptions::modal()).unwrap().omega.clone();

        let mut model =
            cantilever().with_lumped_masses(vec![LumpedMass::new(2, Dof::DZ, 100.0)]);
        let result = model.analyze(&AnalysisOptions::modal()).unwrap();
        assert!(result.omega[0] < 0.99 * base[0]);
        assert_relative_eq!(result.omega[1], base[0], max_relative = 1e-8);
    }

    #[test]
    fn test_refined_cantilever_converges() {
        let mut model = cantilever().refined(8).unwrap();
        assert_eq!(model.node_count(), 9);
        let result = model.analyze(&AnalysisOptions::modal().with_modes(2)).unwrap();
        assert_relative_eq!(result.omega[0], closed_form_first_bending(), max_relative = 1e-3);
    }

    #[test]
    fn test_definition_json() {
        let json = r#"{
            "nodes": [{"x": 0, "y": 0, "z": 0}, {"x": 10, "y": 0, "z": 0}],
            "elements": [{"node_i": 1, "node_j": 2, "material": 1}],
            "materials": {
                "1": {"e": 200e9, "a": 0.01, "rho": 7850, "iy": 1e-5, "iz": 1e-5,
                      "j": 2e-5, "g": 77e9}
            },
            "constraints": [
                {"node": 1, "dof": 1}, {"node": 1, "dof": 2}, {"node": 1, "dof": 3},
                {"node": 1, "dof": 4}, {"node": 1, "dof": 5}, {"node": 1, "dof": 6}
            ]
        }"#;
        let def = ModelDefinition::from_json_str(json).unwrap();
        assert!(def.springs.is_empty());
        assert_eq!(def.materials.get(1).unwrap().label, "");

        let mut model = FrameModel::from_definition(def);
        let result = model.analyze(&AnalysisOptions::modal()).unwrap();
        assert_relative_eq!(result.omega[0], closed_form_first_bending(), max_relative = 0.02);

        let roundtrip = ModelDefinition::from_json_str(&model.to_definition().to_json_string().unwrap());
        assert_eq!(roundtrip.unwrap().constraints.len(), 6);
    }

    #[test]
    fn test_invalid_inputs_are_reported() {
        let bad_node = FrameModel::new(
            vec![Node::new(0.0, 0.0, 0.0)],
            vec![Element::new(1, 2, 1)],
            MaterialTable::new().with(1, steel()),
        );
        assert!(matches!(bad_node.assemble(), Err(VibError::NodeOutOfRange { node: 2, .. })));

        let bad_material = FrameModel::new(
            vec![Node::new(0.0, 0.0, 0.0), Node::new(1.0, 0.0, 0.0)],
            vec![Element::new(1, 2, 7)],
            MaterialTable::new().with(1, steel()),
        );
        assert!(matches!(bad_material.assemble(), Err(VibError::UnknownMaterial(7))));

        let bad_constraint = cantilever().with_constraints(vec![BoundaryConstraint::new(5, Dof::DX)]);
        assert!(bad_constraint.partition().is_err());
    }
}
