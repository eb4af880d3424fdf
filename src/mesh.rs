//! Node geometry and member connectivity.

use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;

use crate::errors::MeshError;
use crate::geometry::Point;

/// A joint of the truss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    /// One-based identifier.
    pub id: usize,
    /// Position of the node.
    pub position: Point,
}

impl Node {
    /// Create a node.
    #[must_use]
    pub const fn new(id: usize, position: Point) -> Self {
        Self { id, position }
    }
}

/// A two-node axial member (rod).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Element {
    /// One-based identifier.
    pub id: usize,
    /// Node identifier at the start of the member.
    pub start: usize,
    /// Node identifier at the end of the member.
    pub end: usize,
    /// Cross-sectional area.
    pub area: f64,
    /// Elastic modulus.
    pub elastic_modulus: f64,
}

impl Element {
    /// Create an element joining `start` to `end`.
    #[must_use]
    pub const fn new(id: usize, start: usize, end: usize, area: f64, elastic_modulus: f64) -> Self {
        Self {
            id,
            start,
            end,
            area,
            elastic_modulus,
        }
    }

    /// Axial rigidity `E * A`.
    #[must_use]
    pub fn axial_rigidity(&self) -> f64 {
        self.elastic_modulus * self.area
    }
}

/// Length and orientation of an element in its current position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementGeometry {
    /// Distance between the end nodes.
    pub length: f64,
    /// Cosine of the angle from the global X axis.
    pub cos: f64,
    /// Sine of the angle from the global X axis.
    pub sin: f64,
}

/// Nodes and elements of a planar truss.
///
/// Identifiers are one-based and sequential, so node `i` is stored at index
/// `i - 1`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Nodes, node `i` at index `i - 1`.
    nodes: Vec<Node>,
    /// Elements, element `i` at index `i - 1`.
    elements: Vec<Element>,
}

impl Mesh {
    /// Build a mesh, checking identifiers and connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError`] when ids are not sequential, an element references a
    /// missing node, or an element starts and ends on the same node.
    ///
    /// # Examples
    /// ```
    /// use trussx2d::{point, Element, Mesh, Node};
    ///
    /// let mesh = Mesh::new(
    ///     vec![Node::new(1, point(0.0, 0.0)), Node::new(2, point(1.0, 0.0))],
    ///     vec![Element::new(1, 1, 2, 0.01, 200.0e9)],
    /// )
    /// .expect("valid mesh");
    /// assert_eq!(mesh.number_nodes(), 2);
    /// ```
    pub fn new(nodes: Vec<Node>, elements: Vec<Element>) -> Result<Self, MeshError> {
        for (position, node) in nodes.iter().enumerate() {
            if node.id != position + 1 {
                return Err(MeshError::NonSequentialNode {
                    position,
                    id: node.id,
                });
            }
        }
        for (position, element) in elements.iter().enumerate() {
            if element.id != position + 1 {
                return Err(MeshError::NonSequentialElement {
                    position,
                    id: element.id,
                });
            }
            for node in [element.start, element.end] {
                if node == 0 || node > nodes.len() {
                    return Err(MeshError::UnknownNode {
                        element: element.id,
                        node,
                    });
                }
            }
            if element.start == element.end {
                return Err(MeshError::SelfConnected {
                    element: element.id,
                    node: element.start,
                });
            }
        }
        Ok(Self { nodes, elements })
    }

    /// Number of nodes.
    #[must_use]
    pub fn number_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements.
    #[must_use]
    pub fn number_elements(&self) -> usize {
        self.elements.len()
    }

    /// Nodes in identifier order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Elements in identifier order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Look up a node by its one-based identifier.
    #[must_use]
    pub fn node(&self, id: usize) -> Option<&Node> {
        id.checked_sub(1).and_then(|index| self.nodes.get(index))
    }

    /// Look up an element by its one-based identifier.
    #[must_use]
    pub fn element(&self, id: usize) -> Option<&Element> {
        id.checked_sub(1).and_then(|index| self.elements.get(index))
    }

    /// Length and direction cosines of `element`.
    ///
    /// A zero-length element yields non-finite cosines; callers validate the
    /// length first.
    #[must_use]
    pub fn element_geometry(&self, element: &Element) -> ElementGeometry {
        let start = self.nodes[element.start - 1].position.to_vector();
        let end = self.nodes[element.end - 1].position.to_vector();
        let delta = end - start;
        let length = delta.norm();
        ElementGeometry {
            length,
            cos: delta.x / length,
            sin: delta.y / length,
        }
    }

    /// Number of connected pieces formed by the nodes and members.
    ///
    /// Nodes that no member touches count as pieces of their own.
    #[must_use]
    pub fn connected_components(&self) -> usize {
        let mut graph = UnGraph::<usize, usize>::with_capacity(self.nodes.len(), self.elements.len());
        let indices: Vec<_> = self.nodes.iter().map(|node| graph.add_node(node.id)).collect();
        for element in &self.elements {
            graph.add_edge(
                indices[element.start - 1],
                indices[element.end - 1],
                element.id,
            );
        }
        connected_components(&graph)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::point;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![
                Node::new(1, point(0.0, 0.0)),
                Node::new(2, point(4.0, 0.0)),
                Node::new(3, point(0.0, 3.0)),
            ],
            vec![
                Element::new(1, 1, 2, 0.01, 200.0e9),
                Element::new(2, 2, 3, 0.01, 200.0e9),
                Element::new(3, 1, 3, 0.01, 200.0e9),
            ],
        )
        .expect("valid triangle")
    }

    #[test]
    fn element_geometry_from_node_positions() {
        let mesh = triangle();
        let geometry = mesh.element_geometry(&mesh.elements()[1]);
        assert_relative_eq!(geometry.length, 5.0);
        assert_relative_eq!(geometry.cos, -0.8);
        assert_relative_eq!(geometry.sin, 0.6);
    }

    #[test]
    fn lookup_is_one_based() {
        let mesh = triangle();
        assert_eq!(mesh.node(3).map(|node| node.position), Some(point(0.0, 3.0)));
        assert!(mesh.node(0).is_none());
        assert!(mesh.node(4).is_none());
        assert_eq!(mesh.element(2).map(|element| element.start), Some(2));
    }

    #[test]
    fn unknown_node_reference_is_rejected() {
        let error = Mesh::new(
            vec![Node::new(1, point(0.0, 0.0)), Node::new(2, point(1.0, 0.0))],
            vec![Element::new(1, 1, 3, 0.01, 200.0e9)],
        )
        .expect_err("node 3 is missing");
        assert_eq!(error, MeshError::UnknownNode { element: 1, node: 3 });
    }

    #[test]
    fn self_connected_element_is_rejected() {
        let error = Mesh::new(
            vec![Node::new(1, point(0.0, 0.0))],
            vec![Element::new(1, 1, 1, 0.01, 200.0e9)],
        )
        .expect_err("element joins node 1 to itself");
        assert_eq!(error, MeshError::SelfConnected { element: 1, node: 1 });
    }

    #[test]
    fn non_sequential_ids_are_rejected() {
        let error = Mesh::new(
            vec![Node::new(1, point(0.0, 0.0)), Node::new(3, point(1.0, 0.0))],
            Vec::new(),
        )
        .expect_err("gap in node ids");
        assert_eq!(error, MeshError::NonSequentialNode { position: 1, id: 3 });
    }

    #[test]
    fn counts_disconnected_pieces() {
        assert_eq!(triangle().connected_components(), 1);

        let split = Mesh::new(
            vec![
                Node::new(1, point(0.0, 0.0)),
                Node::new(2, point(1.0, 0.0)),
                Node::new(3, point(5.0, 0.0)),
            ],
            vec![Element::new(1, 1, 2, 0.01, 200.0e9)],
        )
        .expect("valid mesh");
        assert_eq!(split.connected_components(), 2);
    }
}
