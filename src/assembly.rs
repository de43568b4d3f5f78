//! Global stiffness and mass assembly
//!
//! Element matrices are scatter-added into a [`MatrixAccumulator`]: each
//! element owns six consecutive global DOFs per end node, and contributions of
//! elements sharing a node are summed, never overwritten. Springs and lumped
//! masses are added on the diagonal afterwards.

use log::debug;
use nalgebra_sparse::CsrMatrix;
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::elements::{
    global_dof, Element, LumpedMass, MaterialTable, Node, SpringSupport, DOFS_PER_NODE,
};
use crate::error::{VibError, VibResult};
use crate::math::{
    element_mass, element_stiffness, ElementFrame, Mat, Mat12, SparseMatrixBuilder,
    MASS_QUADRATURE_DEGREE, STIFFNESS_QUADRATURE_DEGREE,
};

/// Destination of scatter-add assembly
pub trait MatrixAccumulator {
    /// Number of rows (= columns)
    fn dim(&self) -> usize;

    /// Add `value` to entry `(row, col)`
    fn add(&mut self, row: usize, col: usize, value: f64);

    /// Add a 12x12 element matrix at the given global DOFs
    fn scatter(&mut self, dofs: &[usize; 12], matrix: &Mat12) {
        for (a, &row) in dofs.iter().enumerate() {
            for (b, &col) in dofs.iter().enumerate() {
                self.add(row, col, matrix[(a, b)]);
            }
        }
    }
}

impl MatrixAccumulator for Mat {
    fn dim(&self) -> usize {
        self.nrows()
    }

    #[inline]
    fn add(&mut self, row: usize, col: usize, value: f64) {
        self[(row, col)] += value;
    }
}

/// Global DOFs of an element: `[node_i dx..rz, node_j dx..rz]`, 0-based.
///
/// Node numbers must already be validated against the model.
pub fn element_dofs(element: &Element) -> [usize; 12] {
    let i = DOFS_PER_NODE * (element.node_i - 1);
    let j = DOFS_PER_NODE * (element.node_j - 1);
    let mut dofs = [0usize; 12];
    for k in 0..DOFS_PER_NODE {
        dofs[k] = i + k;
        dofs[k + DOFS_PER_NODE] = j + k;
    }
    dofs
}

#[derive(Debug, Clone, Copy)]
enum MatrixKind {
    Stiffness,
    Mass,
}

/// Assembles global matrices of a validated frame model
#[derive(Debug, Clone, Copy)]
pub struct GlobalAssembler<'a> {
    nodes: &'a [Node],
    elements: &'a [Element],
    materials: &'a MaterialTable,
}

impl<'a> GlobalAssembler<'a> {
    /// Validate the model and create an assembler.
    ///
    /// Fails on out-of-range node numbers, unknown or invalid material ids and
    /// zero-length elements.
    pub fn new(
        nodes: &'a [Node],
        elements: &'a [Element],
        materials: &'a MaterialTable,
    ) -> VibResult<Self> {
        let node_count = nodes.len();
        if let Some(idx) = nodes.iter().position(|n| !n.is_finite()) {
            return Err(VibError::NonFiniteValue(format!("coordinates of node {}", idx + 1)));
        }
        for (id, section) in materials.iter() {
            section.validate(id)?;
        }

        for (idx, element) in elements.iter().enumerate() {
            for node in element.nodes() {
                if node == 0 || node > node_count {
                    return Err(VibError::NodeOutOfRange {
                        node,
                        node_count,
                        context: format!("element {}", idx + 1),
                    });
                }
            }
            materials.get(element.material)?;

            let n1 = nodes[element.node_i - 1].coords();
            let n2 = nodes[element.node_j - 1].coords();
            if let Err(err) = ElementFrame::new(&n1, &n2) {
                return Err(match err {
                    VibError::DegenerateElement { reason, .. } => VibError::DegenerateElement {
                        element: format!("{} (nodes {}-{})", idx + 1, element.node_i, element.node_j),
                        reason,
                    },
                    other => other,
                });
            }
        }

        Ok(Self {
            nodes,
            elements,
            materials,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of DOFs (6 per node)
    pub fn ndof(&self) -> usize {
        self.nodes.len() * DOFS_PER_NODE
    }

    fn element_matrix(&self, index: usize, kind: MatrixKind) -> VibResult<Mat12> {
        let element = self.elements.get(index).ok_or_else(|| {
            VibError::InvalidInput(format!("element index {index} out of range"))
        })?;
        let section = self.materials.get(element.material)?;
        let n1 = self.nodes[element.node_i - 1].coords();
        let n2 = self.nodes[element.node_j - 1].coords();
        match kind {
            MatrixKind::Stiffness => element_stiffness(&n1, &n2, section, STIFFNESS_QUADRATURE_DEGREE),
            MatrixKind::Mass => element_mass(&n1, &n2, section, MASS_QUADRATURE_DEGREE),
        }
    }

    /// Stiffness of element `index` (0-based) in global axes
    pub fn element_stiffness(&self, index: usize) -> VibResult<Mat12> {
        self.element_matrix(index, MatrixKind::Stiffness)
    }

    /// Consistent mass of element `index` (0-based) in global axes
    pub fn element_mass(&self, index: usize) -> VibResult<Mat12> {
        self.element_matrix(index, MatrixKind::Mass)
    }

    #[cfg_attr(feature = "parallel", allow(dead_code))]
    fn element_matrices_sequential(&self, kind: MatrixKind) -> VibResult<Vec<Mat12>> {
        (0..self.elements.len())
            .map(|i| self.element_matrix(i, kind))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn element_matrices_parallel(&self, kind: MatrixKind) -> VibResult<Vec<Mat12>> {
        (0..self.elements.len())
            .into_par_iter()
            .map(|i| self.element_matrix(i, kind))
            .collect()
    }

    /// Element matrices in element order. Elements are independent, so with
    /// the `parallel` feature they are computed concurrently.
    fn element_matrices(&self, kind: MatrixKind) -> VibResult<Vec<Mat12>> {
        #[cfg(feature = "parallel")]
        {
            self.element_matrices_parallel(kind)
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.element_matrices_sequential(kind)
        }
    }

    fn assemble_into<A: MatrixAccumulator>(&self, acc: &mut A, kind: MatrixKind) -> VibResult<()> {
        if acc.dim() != self.ndof() {
            return Err(VibError::DimensionMismatch(format!(
                "accumulator has {} rows, model has {} DOFs",
                acc.dim(),
                self.ndof()
            )));
        }
        let matrices = self.element_matrices(kind)?;
        for (element, matrix) in self.elements.iter().zip(&matrices) {
            acc.scatter(&element_dofs(element), matrix);
        }
        debug!(
            "Assembled {:?} of {} elements into {} DOFs",
            kind,
            self.elements.len(),
            self.ndof()
        );
        Ok(())
    }

    /// Scatter-add all element stiffness matrices into `acc`
    pub fn assemble_stiffness_into<A: MatrixAccumulator>(&self, acc: &mut A) -> VibResult<()> {
        self.assemble_into(acc, MatrixKind::Stiffness)
    }

    /// Scatter-add all element mass matrices into `acc`
    pub fn assemble_mass_into<A: MatrixAccumulator>(&self, acc: &mut A) -> VibResult<()> {
        self.assemble_into(acc, MatrixKind::Mass)
    }

    /// Dense global stiffness (elements only)
    pub fn stiffness(&self) -> VibResult<Mat> {
        let mut k = Mat::zeros(self.ndof(), self.ndof());
        self.assemble_stiffness_into(&mut k)?;
        Ok(k)
    }

    /// Dense global consistent mass (elements only)
    pub fn mass(&self) -> VibResult<Mat> {
        let mut m = Mat::zeros(self.ndof(), self.ndof());
        self.assemble_mass_into(&mut m)?;
        Ok(m)
    }

    /// Sparse global stiffness (elements only)
    pub fn stiffness_sparse(&self) -> VibResult<CsrMatrix<f64>> {
        let mut builder = SparseMatrixBuilder::new(self.ndof());
        self.assemble_stiffness_into(&mut builder)?;
        debug!(
            "Sparse stiffness: {} triplets, sparsity {:.3}",
            builder.nnz(),
            builder.sparsity()
        );
        Ok(builder.to_csr())
    }

    /// Sparse global consistent mass (elements only)
    pub fn mass_sparse(&self) -> VibResult<CsrMatrix<f64>> {
        let mut builder = SparseMatrixBuilder::new(self.ndof());
        self.assemble_mass_into(&mut builder)?;
        Ok(builder.to_csr())
    }
}

/// Add grounded springs to the diagonal of a stiffness accumulator.
///
/// A later spring on the same (node, DOF) replaces an earlier one; the
/// resulting spring diagonal is added once.
pub fn add_springs<A: MatrixAccumulator>(
    acc: &mut A,
    springs: &[SpringSupport],
    node_count: usize,
) -> VibResult<()> {
    let mut diagonal = BTreeMap::new();
    for spring in springs {
        if !spring.stiffness.is_finite() {
            return Err(VibError::NonFiniteValue(format!("spring at node {}", spring.node)));
        }
        let dof = global_dof(spring.node, spring.dof, node_count, "spring support")?;
        if let Some(previous) = diagonal.insert(dof, spring.stiffness) {
            debug!(
                "Spring at node {} DOF {} replaces stiffness {previous:e}",
                spring.node,
                spring.dof.number()
            );
        }
    }
    for (dof, stiffness) in diagonal {
        acc.add(dof, dof, stiffness);
    }
    Ok(())
}

/// Diagonal stiffness matrix of the grounded springs (`ndof × ndof`)
pub fn spring_stiffness(springs: &[SpringSupport], node_count: usize) -> VibResult<Mat> {
    let ndof = node_count * DOFS_PER_NODE;
    let mut k = Mat::zeros(ndof, ndof);
    add_springs(&mut k, springs, node_count)?;
    Ok(k)
}

/// Add concentrated masses/inertias to the diagonal of a mass accumulator
pub fn add_lumped_masses<A: MatrixAccumulator>(
    acc: &mut A,
    masses: &[LumpedMass],
    node_count: usize,
) -> VibResult<()> {
    for mass in masses {
        if !mass.value.is_finite() {
            return Err(VibError::NonFiniteValue(format!("lumped mass at node {}", mass.node)));
        }
        let dof = global_dof(mass.node, mass.dof, node_count, "lumped mass")?;
        acc.add(dof, dof, mass.value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Dof, MaterialSection};
    use approx::assert_relative_eq;

    fn table() -> MaterialTable {
        MaterialTable::new().with(
            1,
            MaterialSection::new(210e9, 0.02, 7850.0, 8e-5, 6e-5, 1.2e-4, 80e9, "column"),
        )
    }

    #[test]
    fn test_element_dofs() {
        let dofs = element_dofs(&Element::new(3, 1, 1));
        assert_eq!(dofs, [12, 13, 14, 15, 16, 17, 0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_scatter_adds_instead_of_overwriting() {
        let mut k = Mat::zeros(12, 12);
        let block = Mat12::from_element(1.0);
        let dofs = element_dofs(&Element::new(1, 2, 1));
        k.scatter(&dofs, &block);
        k.scatter(&dofs, &block);
        assert!(k.iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_dense_and_sparse_assembly_agree() {
        let nodes = [
            Node::new(0.0, 0.0, 0.0),
            Node::new(0.0, 0.0, 3.0),
            Node::new(4.0, 0.0, 3.0),
        ];
        let elements = [Element::new(1, 2, 1), Element::new(2, 3, 1)];
        let materials = table();
        let assembler = GlobalAssembler::new(&nodes, &elements, &materials).unwrap();

        let k = assembler.stiffness().unwrap();
        let k_sparse: Mat = Mat::from(&assembler.stiffness_sparse().unwrap());
        assert_relative_eq!(k, k_sparse, epsilon = 1e-6);

        let m = assembler.mass().unwrap();
        let m_sparse: Mat = Mat::from(&assembler.mass_sparse().unwrap());
        assert_relative_eq!(m, m_sparse, epsilon = 1e-12);
    }

    #[test]
    fn test_validation_errors() {
        let nodes = [Node::new(0.0, 0.0, 0.0), Node::new(1.0, 0.0, 0.0)];
        let materials = table();

        let out_of_range = [Element::new(1, 3, 1)];
        assert!(matches!(
            GlobalAssembler::new(&nodes, &out_of_range, &materials),
            Err(VibError::NodeOutOfRange { node: 3, .. })
        ));

        let unknown = [Element::new(1, 2, 7)];
        assert!(matches!(
            GlobalAssembler::new(&nodes, &unknown, &materials),
            Err(VibError::UnknownMaterial(7))
        ));

        let degenerate = [Element::new(2, 2, 1)];
        assert!(matches!(
            GlobalAssembler::new(&nodes, &degenerate, &materials),
            Err(VibError::DegenerateElement { .. })
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let nodes = [Node::new(0.0, 0.0, 0.0), Node::new(1.0, 0.0, 0.0)];
        let elements = [Element::new(1, 2, 1)];
        let materials = table();
        let assembler = GlobalAssembler::new(&nodes, &elements, &materials).unwrap();
        let mut wrong = Mat::zeros(6, 6);
        assert!(matches!(
            assembler.assemble_stiffness_into(&mut wrong),
            Err(VibError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_spring_stiffness_on_diagonal() {
        let springs = [
            SpringSupport::new(2, Dof::DZ, 1.5e6),
            SpringSupport::new(2, Dof::DZ, 0.5e6),
            SpringSupport::new(1, Dof::RX, 3.0),
        ];
        let k = spring_stiffness(&springs, 2).unwrap();
        assert_eq!(k.nrows(), 12);
        assert_eq!(k[(8, 8)], 0.5e6);
        assert_eq!(k[(3, 3)], 3.0);
        assert_eq!(k.iter().filter(|&&v| v != 0.0).count(), 2);

        assert!(spring_stiffness(&[SpringSupport::new(3, Dof::DX, 1.0)], 2).is_err());
    }

    #[test]
    fn test_repeated_spring_replaces_but_adds_to_elements() {
        let nodes = [Node::new(0.0, 0.0, 0.0), Node::new(2.0, 0.0, 0.0)];
        let elements = [Element::new(1, 2, 1)];
        let materials = table();
        let assembler = GlobalAssembler::new(&nodes, &elements, &materials).unwrap();
        let base = assembler.stiffness().unwrap();

        let mut k = base.clone();
        let springs = [
            SpringSupport::new(2, Dof::DY, 4.0e6),
            SpringSupport::new(1, Dof::DX, 1.0e6),
            SpringSupport::new(2, Dof::DY, 2.5e6),
        ];
        add_springs(&mut k, &springs, 2).unwrap();
        assert_relative_eq!(k[(7, 7)], base[(7, 7)] + 2.5e6, max_relative = 1e-14);
        assert_relative_eq!(k[(0, 0)], base[(0, 0)] + 1.0e6, max_relative = 1e-14);
        assert_eq!(k[(7, 8)], base[(7, 8)]);

        let mut sparse = SparseMatrixBuilder::new(12);
        add_springs(&mut sparse, &springs, 2).unwrap();
        assert_eq!(sparse.to_dense()[(7, 7)], 2.5e6);
    }

    #[test]
    fn test_lumped_masses_accumulate() {
        let mut m = Mat::zeros(12, 12);
        add_lumped_masses(&mut m, &LumpedMass::point_mass(2, 0.787), 2).unwrap();
        add_lumped_masses(&mut m, &[LumpedMass::new(2, Dof::DX, 0.013)], 2).unwrap();
        assert_relative_eq!(m[(6, 6)], 0.8, epsilon = 1e-15);
        assert_eq!(m[(7, 7)], 0.787);
        assert_eq!(m[(8, 8)], 0.787);
        assert_eq!(m[(9, 9)], 0.0);
    }
}
