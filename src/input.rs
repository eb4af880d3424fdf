//! JSON project documents.
//!
//! ```json
//! {
//!   "nodes": [{"id": 1, "x": 0.0, "y": 0.0}, {"id": 2, "x": 4.0, "y": 0.0}],
//!   "elements": [{"id": 1, "start": 1, "end": 2, "area": 0.01, "modulus": 2.0e11}],
//!   "displacements": [
//!     {"type": "pin", "node": 1},
//!     {"type": "roller", "node": 2, "direction": "y", "prescribed": {"y": -0.001}}
//!   ],
//!   "forces": [{"node": 2, "fx": 1000.0}]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::conditions::{Displacements, Forces, Support};
use crate::errors::ProjectError;
use crate::geometry::{point, Direction, Displacement, Force};
use crate::mesh::{Element, Mesh, Node};

/// A node entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    /// One-based identifier.
    pub id: usize,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

/// An element entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementEntry {
    /// One-based identifier.
    pub id: usize,
    /// Start node.
    pub start: usize,
    /// End node.
    pub end: usize,
    /// Cross-sectional area.
    pub area: f64,
    /// Elastic modulus.
    #[serde(alias = "elastic_modulus")]
    pub modulus: f64,
}

/// Optional prescribed displacement components of a support.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescribedEntry {
    /// Imposed x displacement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Imposed y displacement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl PrescribedEntry {
    /// Components that were given, x before y.
    fn components(self) -> impl Iterator<Item = (Direction, f64)> {
        [(Direction::X, self.x), (Direction::Y, self.y)]
            .into_iter()
            .filter_map(|(direction, value)| value.map(|value| (direction, value)))
    }
}

/// A support entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SupportEntry {
    /// Both directions restrained.
    #[serde(alias = "pinned")]
    Pin {
        /// Supported node.
        node: usize,
        /// Imposed displacement.
        #[serde(default)]
        prescribed: PrescribedEntry,
    },
    /// One direction restrained.
    Roller {
        /// Supported node.
        node: usize,
        /// Restrained direction.
        direction: Direction,
        /// Imposed displacement; only the restrained direction may be given.
        #[serde(default)]
        prescribed: PrescribedEntry,
    },
}

/// A nodal load entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForceEntry {
    /// Loaded node.
    pub node: usize,
    /// X component.
    #[serde(default)]
    pub fx: f64,
    /// Y component.
    #[serde(default)]
    pub fy: f64,
}

/// A complete truss problem as stored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// Nodes in identifier order.
    pub nodes: Vec<NodeEntry>,
    /// Elements in identifier order.
    pub elements: Vec<ElementEntry>,
    /// Supports, in the order their reactions are reported within each kind.
    #[serde(default, alias = "supports")]
    pub displacements: Vec<SupportEntry>,
    /// Nodal loads; repeated nodes accumulate.
    #[serde(default)]
    pub forces: Vec<ForceEntry>,
}

impl ProjectDocument {
    /// Describe an in-memory model as a document.
    ///
    /// Prescribed displacements are only written when non-zero and loads only for
    /// nodes that carry one.
    #[must_use]
    pub fn from_model(mesh: &Mesh, displacements: &Displacements, forces: &Forces) -> Self {
        let nodes = mesh
            .nodes()
            .iter()
            .map(|node| NodeEntry {
                id: node.id,
                x: node.position.x,
                y: node.position.y,
            })
            .collect();
        let elements = mesh
            .elements()
            .iter()
            .map(|element| ElementEntry {
                id: element.id,
                start: element.start,
                end: element.end,
                area: element.area,
                modulus: element.elastic_modulus,
            })
            .collect();
        let supports = displacements
            .supports()
            .map(|entry| {
                let mut prescribed = PrescribedEntry::default();
                for (direction, value) in entry.support.restrained() {
                    if value != 0.0 {
                        match direction {
                            Direction::X => prescribed.x = Some(value),
                            Direction::Y => prescribed.y = Some(value),
                        }
                    }
                }
                match entry.support {
                    Support::Pinned { .. } => SupportEntry::Pin {
                        node: entry.node,
                        prescribed,
                    },
                    Support::Roller { direction, .. } => SupportEntry::Roller {
                        node: entry.node,
                        direction,
                        prescribed,
                    },
                }
            })
            .collect();
        let loads = (1..=forces.number_nodes())
            .filter_map(|node| forces.get(node).map(|load| (node, load)))
            .filter(|(_, load)| load.x != 0.0 || load.y != 0.0)
            .map(|(node, load)| ForceEntry {
                node,
                fx: load.x,
                fy: load.y,
            })
            .collect();
        Self {
            nodes,
            elements,
            displacements: supports,
            forces: loads,
        }
    }

    /// Write the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Io`] or [`ProjectError::Json`] when writing fails.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Json`] when the text is not a valid document.
    pub fn from_json(text: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Io`] when the file cannot be read and
    /// [`ProjectError::Json`] when its content is not a valid document.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Build the mesh described by the document.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Mesh`] for inconsistent ids or connectivity.
    pub fn mesh(&self) -> Result<Mesh, ProjectError> {
        let nodes = self
            .nodes
            .iter()
            .map(|entry| Node::new(entry.id, point(entry.x, entry.y)))
            .collect();
        let elements = self
            .elements
            .iter()
            .map(|entry| Element::new(entry.id, entry.start, entry.end, entry.area, entry.modulus))
            .collect();
        Ok(Mesh::new(nodes, elements)?)
    }

    /// Build the boundary conditions described by the document.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Condition`] for duplicate supports or a roller with a
    /// displacement prescribed across its free direction.
    pub fn displacements(&self) -> Result<Displacements, ProjectError> {
        let mut displacements = Displacements::new();
        for entry in &self.displacements {
            match *entry {
                SupportEntry::Pin { node, prescribed } => {
                    displacements.pin_with(
                        node,
                        Displacement::new(
                            prescribed.x.unwrap_or_default(),
                            prescribed.y.unwrap_or_default(),
                        ),
                    )?;
                }
                SupportEntry::Roller {
                    node,
                    direction,
                    prescribed,
                } => {
                    displacements.roller(node, direction)?;
                    for (component, value) in prescribed.components() {
                        displacements.prescribe(node, component, value)?;
                    }
                }
            }
        }
        Ok(displacements)
    }

    /// Build the load vector described by the document.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Condition`] when a load names a node that is not listed.
    pub fn forces(&self) -> Result<Forces, ProjectError> {
        let mut forces = Forces::new(self.nodes.len());
        for entry in &self.forces {
            forces.add(entry.node, Force::new(entry.fx, entry.fy))?;
        }
        Ok(forces)
    }
}
