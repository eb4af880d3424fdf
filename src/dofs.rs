//! Degree-of-freedom numbering.
//!
//! Node `i` owns global degrees of freedom `2 * (i - 1)` (x) and
//! `2 * (i - 1) + 1` (y). Each one is either active, meaning its displacement
//! is unknown, or restrained by a support.

use std::fmt;

use crate::conditions::Displacements;
use crate::errors::ConditionError;
use crate::geometry::Direction;
use crate::mesh::Mesh;

/// A single degree of freedom identified by node and direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dof {
    /// One-based node identifier.
    pub node: usize,
    /// Direction of motion.
    pub direction: Direction,
}

impl Dof {
    /// Create a degree of freedom label.
    #[must_use]
    pub const fn new(node: usize, direction: Direction) -> Self {
        Self { node, direction }
    }

    /// Position in the global vectors.
    #[must_use]
    pub const fn global_index(self) -> usize {
        2 * (self.node - 1) + self.direction.offset()
    }

    /// Label for a global index.
    #[must_use]
    pub const fn from_global_index(index: usize) -> Self {
        let direction = if index % 2 == 0 {
            Direction::X
        } else {
            Direction::Y
        };
        Self::new(index / 2 + 1, direction)
    }
}

impl fmt::Display for Dof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {} ({})", self.node, self.direction)
    }
}

/// Classification of one global degree of freedom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DofClass {
    /// Unknown displacement at this position of the reduced system.
    Active(usize),
    /// Supported, at this position of the restrained ordering.
    Restrained(usize),
}

/// Where a restrained degree of freedom lands in the reaction table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReactionSlot {
    /// Column of the support, pinned nodes first and rollers after.
    pub support: usize,
    /// Reaction component.
    pub direction: Direction,
}

/// Mapping between global, active and restrained degree-of-freedom indices.
#[derive(Clone, Debug, PartialEq)]
pub struct DofTable {
    /// Class of every global degree of freedom.
    classes: Vec<DofClass>,
    /// Global indices of active degrees of freedom, ascending.
    active: Vec<usize>,
    /// Global indices of restrained degrees of freedom in support order.
    restrained: Vec<usize>,
    /// Reaction table position of each restrained degree of freedom.
    slots: Vec<ReactionSlot>,
    /// Number of supported nodes.
    number_supports: usize,
}

impl DofTable {
    /// Number the degrees of freedom of `mesh` under `displacements`.
    ///
    /// Restrained degrees of freedom follow the pinned nodes (x then y) and then
    /// the roller nodes. Active degrees of freedom keep their global order.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::UnknownNode`] when a support names a node outside the
    /// mesh and [`ConditionError::DuplicateDof`] when a degree of freedom is restrained
    /// twice.
    pub fn new(mesh: &Mesh, displacements: &Displacements) -> Result<Self, ConditionError> {
        let number_nodes = mesh.number_nodes();
        let mut classes: Vec<Option<DofClass>> = vec![None; 2 * number_nodes];
        let mut restrained = Vec::with_capacity(displacements.restrained_count());
        let mut slots = Vec::with_capacity(displacements.restrained_count());
        let mut number_supports = 0;

        for (column, entry) in displacements.supports().enumerate() {
            if entry.node == 0 || entry.node > number_nodes {
                return Err(ConditionError::UnknownNode {
                    node: entry.node,
                    number_nodes,
                });
            }
            for (direction, _) in entry.support.restrained() {
                let dof = Dof::new(entry.node, direction);
                let global = dof.global_index();
                if classes[global].is_some() {
                    return Err(ConditionError::DuplicateDof(dof));
                }
                classes[global] = Some(DofClass::Restrained(restrained.len()));
                restrained.push(global);
                slots.push(ReactionSlot {
                    support: column,
                    direction,
                });
            }
            number_supports = column + 1;
        }

        let mut active = Vec::with_capacity(classes.len() - restrained.len());
        let classes: Vec<DofClass> = classes
            .into_iter()
            .enumerate()
            .map(|(global, class)| {
                class.unwrap_or_else(|| {
                    active.push(global);
                    DofClass::Active(active.len() - 1)
                })
            })
            .collect();

        log::debug!(
            "numbered {} degrees of freedom: {} active, {} restrained",
            2 * number_nodes,
            active.len(),
            restrained.len()
        );

        Ok(Self {
            classes,
            active,
            restrained,
            slots,
            number_supports,
        })
    }

    /// Total number of global degrees of freedom.
    #[must_use]
    pub fn number_dofs(&self) -> usize {
        self.classes.len()
    }

    /// Size of the reduced system.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of supported degrees of freedom.
    #[must_use]
    pub fn restrained_count(&self) -> usize {
        self.restrained.len()
    }

    /// Number of supported nodes, i.e. columns of the reaction table.
    #[must_use]
    pub fn number_supports(&self) -> usize {
        self.number_supports
    }

    /// Global indices of active degrees of freedom in reduced order.
    #[must_use]
    pub fn active(&self) -> &[usize] {
        &self.active
    }

    /// Global indices of restrained degrees of freedom in support order.
    #[must_use]
    pub fn restrained(&self) -> &[usize] {
        &self.restrained
    }

    /// Reaction table position of each restrained degree of freedom.
    #[must_use]
    pub fn reaction_slots(&self) -> &[ReactionSlot] {
        &self.slots
    }

    /// Classification of a global degree of freedom.
    #[must_use]
    pub fn class(&self, global: usize) -> Option<DofClass> {
        self.classes.get(global).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;
    use crate::mesh::{Element, Node};

    fn four_node_mesh() -> Mesh {
        Mesh::new(
            (1..=4)
                .map(|id| Node::new(id, point(id as f64, 0.0)))
                .collect(),
            vec![
                Element::new(1, 1, 2, 1.0, 1.0),
                Element::new(2, 2, 3, 1.0, 1.0),
                Element::new(3, 3, 4, 1.0, 1.0),
            ],
        )
        .expect("valid mesh")
    }

    #[test]
    fn restrained_order_is_pins_then_rollers() {
        let mesh = four_node_mesh();
        let mut displacements = Displacements::new();
        displacements.roller(2, Direction::Y).expect("roller");
        displacements.pin(4).expect("pin");
        displacements.roller(1, Direction::X).expect("roller");

        let dofs = DofTable::new(&mesh, &displacements).expect("valid supports");

        assert_eq!(dofs.number_dofs(), 8);
        assert_eq!(dofs.restrained_count(), 4);
        assert_eq!(dofs.active_count(), 4);
        assert_eq!(dofs.active_count() + dofs.restrained_count(), 8);
        assert_eq!(dofs.restrained(), &[6, 7, 3, 0]);
        assert_eq!(dofs.active(), &[1, 2, 4, 5]);
        assert_eq!(dofs.number_supports(), 3);
        assert_eq!(
            dofs.reaction_slots(),
            &[
                ReactionSlot {
                    support: 0,
                    direction: Direction::X
                },
                ReactionSlot {
                    support: 0,
                    direction: Direction::Y
                },
                ReactionSlot {
                    support: 1,
                    direction: Direction::Y
                },
                ReactionSlot {
                    support: 2,
                    direction: Direction::X
                },
            ]
        );
        assert_eq!(dofs.class(3), Some(DofClass::Restrained(2)));
        assert_eq!(dofs.class(4), Some(DofClass::Active(2)));
        assert_eq!(dofs.class(8), None);
    }

    #[test]
    fn reduced_size_matches_support_count() {
        let mesh = four_node_mesh();
        let mut displacements = Displacements::new();
        displacements.pin(1).expect("pin");
        displacements.roller(4, Direction::Y).expect("roller");
        let dofs = DofTable::new(&mesh, &displacements).expect("valid supports");
        let expected = 2 * mesh.number_nodes()
            - (2 * displacements.number_pin() + displacements.number_roller());
        assert_eq!(dofs.active_count(), expected);
    }

    #[test]
    fn support_outside_mesh_is_rejected() {
        let mesh = four_node_mesh();
        let mut displacements = Displacements::new();
        displacements.pin(7).expect("pin");
        let error = DofTable::new(&mesh, &displacements).expect_err("node 7 is missing");
        assert_eq!(
            error,
            ConditionError::UnknownNode {
                node: 7,
                number_nodes: 4
            }
        );
    }

    #[test]
    fn dof_labels_round_trip_through_global_index() {
        let dof = Dof::new(3, Direction::Y);
        assert_eq!(dof.global_index(), 5);
        assert_eq!(Dof::from_global_index(5), dof);
        assert_eq!(dof.to_string(), "node 3 (y)");
    }
}
