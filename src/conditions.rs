//! Supports, prescribed displacements and applied loads.

use crate::errors::ConditionError;
use crate::geometry::{Direction, Displacement, Force};

/// Restraint applied to a supported node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Support {
    /// Both directions restrained, each moved by the prescribed amount.
    Pinned {
        /// Imposed displacement of the node.
        prescribed: Displacement,
    },
    /// A single direction restrained.
    Roller {
        /// Restrained direction.
        direction: Direction,
        /// Imposed displacement along `direction`.
        prescribed: f64,
    },
}

impl Support {
    /// Restrained directions with their prescribed displacements, x before y.
    #[must_use]
    pub fn restrained(&self) -> Vec<(Direction, f64)> {
        match *self {
            Support::Pinned { prescribed } => Direction::ALL
                .iter()
                .map(|&direction| (direction, prescribed.component(direction)))
                .collect(),
            Support::Roller {
                direction,
                prescribed,
            } => vec![(direction, prescribed)],
        }
    }
}

/// A support attached to a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportedNode {
    /// Node identifier.
    pub node: usize,
    /// Restraint at the node.
    pub support: Support,
}

/// Boundary conditions of the truss.
///
/// Pinned and roller nodes are kept in the order they were added. That order
/// fixes the layout of the restrained degrees of freedom and of the reported
/// reactions: all pinned nodes first, then all rollers. Nodes that are not
/// listed are free.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Displacements {
    /// Pinned nodes in insertion order.
    pins: Vec<SupportedNode>,
    /// Roller nodes in insertion order.
    rollers: Vec<SupportedNode>,
}

impl Displacements {
    /// Create an empty set of boundary conditions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `node` in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::DuplicateSupport`] when `node` already has a support.
    pub fn pin(&mut self, node: usize) -> Result<(), ConditionError> {
        self.pin_with(node, Displacement::default())
    }

    /// Pin `node` and impose a displacement on it.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::DuplicateSupport`] when `node` already has a support.
    pub fn pin_with(&mut self, node: usize, prescribed: Displacement) -> Result<(), ConditionError> {
        self.ensure_unsupported(node)?;
        self.pins.push(SupportedNode {
            node,
            support: Support::Pinned { prescribed },
        });
        Ok(())
    }

    /// Restrain `node` along `direction` only.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::DuplicateSupport`] when `node` already has a support.
    pub fn roller(&mut self, node: usize, direction: Direction) -> Result<(), ConditionError> {
        self.roller_with(node, direction, 0.0)
    }

    /// Restrain `node` along `direction` and move it by `prescribed` in that direction.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::DuplicateSupport`] when `node` already has a support.
    pub fn roller_with(
        &mut self,
        node: usize,
        direction: Direction,
        prescribed: f64,
    ) -> Result<(), ConditionError> {
        self.ensure_unsupported(node)?;
        self.rollers.push(SupportedNode {
            node,
            support: Support::Roller {
                direction,
                prescribed,
            },
        });
        Ok(())
    }

    /// Impose a displacement on a restrained direction of an existing support.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::UnsupportedNode`] when `node` is free and
    /// [`ConditionError::PrescribedDirectionMismatch`] when `node` is a roller that
    /// does not restrain `direction`.
    pub fn prescribe(
        &mut self,
        node: usize,
        direction: Direction,
        value: f64,
    ) -> Result<(), ConditionError> {
        let entry = self
            .pins
            .iter_mut()
            .chain(self.rollers.iter_mut())
            .find(|entry| entry.node == node)
            .ok_or(ConditionError::UnsupportedNode(node))?;
        match &mut entry.support {
            Support::Pinned { prescribed } => match direction {
                Direction::X => prescribed.x = value,
                Direction::Y => prescribed.y = value,
            },
            Support::Roller {
                direction: restrained,
                prescribed,
            } => {
                if *restrained != direction {
                    return Err(ConditionError::PrescribedDirectionMismatch {
                        node,
                        restrained: *restrained,
                        prescribed: direction,
                    });
                }
                *prescribed = value;
            }
        }
        Ok(())
    }

    /// Number of pinned nodes.
    #[must_use]
    pub fn number_pin(&self) -> usize {
        self.pins.len()
    }

    /// Number of roller nodes.
    #[must_use]
    pub fn number_roller(&self) -> usize {
        self.rollers.len()
    }

    /// Identifiers of pinned nodes in insertion order.
    #[must_use]
    pub fn pin_nodes(&self) -> Vec<usize> {
        self.pins.iter().map(|entry| entry.node).collect()
    }

    /// Identifiers of roller nodes in insertion order.
    #[must_use]
    pub fn roller_nodes(&self) -> Vec<usize> {
        self.rollers.iter().map(|entry| entry.node).collect()
    }

    /// All supports, pinned nodes first and rollers after.
    pub fn supports(&self) -> impl Iterator<Item = &SupportedNode> + '_ {
        self.pins.iter().chain(self.rollers.iter())
    }

    /// Support at `node`, if any.
    #[must_use]
    pub fn support(&self, node: usize) -> Option<&Support> {
        self.supports()
            .find(|entry| entry.node == node)
            .map(|entry| &entry.support)
    }

    /// Number of restrained degrees of freedom.
    #[must_use]
    pub fn restrained_count(&self) -> usize {
        2 * self.pins.len() + self.rollers.len()
    }

    /// Reject a second support on the same node.
    fn ensure_unsupported(&self, node: usize) -> Result<(), ConditionError> {
        if self.support(node).is_some() {
            Err(ConditionError::DuplicateSupport(node))
        } else {
            Ok(())
        }
    }
}

/// Loads applied at the nodes, stored densely as `[fx1, fy1, fx2, fy2, ...]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Forces {
    /// Two entries per node.
    values: Vec<f64>,
}

impl Forces {
    /// Create an all-zero load vector for `number_nodes` nodes.
    #[must_use]
    pub fn new(number_nodes: usize) -> Self {
        Self {
            values: vec![0.0; 2 * number_nodes],
        }
    }

    /// Number of nodes covered by the vector.
    #[must_use]
    pub fn number_nodes(&self) -> usize {
        self.values.len() / 2
    }

    /// Replace the load applied at `node`.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::UnknownNode`] when `node` is outside `1..=number_nodes`.
    pub fn set(&mut self, node: usize, load: Force) -> Result<(), ConditionError> {
        let base = self.base(node)?;
        self.values[base] = load.x;
        self.values[base + 1] = load.y;
        Ok(())
    }

    /// Add `load` to whatever is already applied at `node`.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::UnknownNode`] when `node` is outside `1..=number_nodes`.
    pub fn add(&mut self, node: usize, load: Force) -> Result<(), ConditionError> {
        let base = self.base(node)?;
        self.values[base] += load.x;
        self.values[base + 1] += load.y;
        Ok(())
    }

    /// Load at `node`, if the node exists.
    #[must_use]
    pub fn get(&self, node: usize) -> Option<Force> {
        let base = self.base(node).ok()?;
        Some(Force::new(self.values[base], self.values[base + 1]))
    }

    /// Dense load vector.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Sum of all applied loads.
    #[must_use]
    pub fn total(&self) -> Force {
        self.values
            .chunks_exact(2)
            .fold(Force::default(), |sum, pair| {
                Force::new(sum.x + pair[0], sum.y + pair[1])
            })
    }

    /// Index of the x component for `node`.
    fn base(&self, node: usize) -> Result<usize, ConditionError> {
        if node == 0 || node > self.number_nodes() {
            return Err(ConditionError::UnknownNode {
                node,
                number_nodes: self.number_nodes(),
            });
        }
        Ok(2 * (node - 1))
    }
}
