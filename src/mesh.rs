//! Element subdivision

use log::debug;

use crate::elements::{Element, Node};
use crate::error::{VibError, VibResult};

/// Split every element into `divisions` equal elements.
///
/// Interior nodes are appended after the existing nodes, element by element,
/// from the i-end to the j-end. Sub-elements keep the parent's material.
pub fn subdivide(
    nodes: &[Node],
    elements: &[Element],
    divisions: usize,
) -> VibResult<(Vec<Node>, Vec<Element>)> {
    if divisions == 0 {
        return Err(VibError::InvalidInput(
            "element subdivision count must be at least 1".to_string(),
        ));
    }
    if divisions == 1 {
        return Ok((nodes.to_vec(), elements.to_vec()));
    }

    let node_count = nodes.len();
    let mut out_nodes = nodes.to_vec();
    out_nodes.reserve(elements.len() * (divisions - 1));
    let mut out_elements = Vec::with_capacity(elements.len() * divisions);

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
        let start = nodes[element.node_i - 1];
        let end = nodes[element.node_j - 1];

        let mut prev = element.node_i;
        for k in 1..divisions {
            out_nodes.push(start.lerp(&end, k as f64 / divisions as f64));
            let current = out_nodes.len();
            out_elements.push(Element::new(prev, current, element.material));
            prev = current;
        }
        out_elements.push(Element::new(prev, element.node_j, element.material));
    }

    debug!(
        "Subdivided {} elements into {} ({} nodes)",
        elements.len(),
        out_elements.len(),
        out_nodes.len()
    );
    Ok((out_nodes, out_elements))
}
