//! Staged solver and post-processor.
//!
//! A [`Solution`] moves through [`SolutionState`] one step at a time:
//! displacements, then reactions, then member forces. Each step refuses to
//! run unless the previous one has completed.

use nalgebra::{DMatrix, DVector, Vector4};

use crate::analysis::{element_dofs, Analysis};
use crate::conditions::Displacements;
use crate::dofs::{Dof, DofTable};
use crate::errors::SolutionError;
use crate::geometry::Displacement;
use crate::mesh::Mesh;

/// A pivot of the reduced stiffness matrix no larger than this fraction of the
/// diagonal entry of its own column is treated as zero.
pub const SINGULAR_PIVOT_TOLERANCE: f64 = 1.0e-10;

/// Progress of a [`Solution`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SolutionState {
    /// Nothing has been computed.
    Unsolved,
    /// Nodal displacements are available.
    DisplacementsSolved,
    /// Support reactions are available.
    ReactionsSolved,
    /// Member forces and stresses are available.
    StressesSolved,
}

/// Results of one solve.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Current stage.
    state: SolutionState,
    /// Displacement of every global degree of freedom.
    displacements: DVector<f64>,
    /// Displacements of the active degrees of freedom, in reduced order.
    active_displacements: DVector<f64>,
    /// Reactions, one column per support (pinned first), rows x and y.
    global_reactions: DMatrix<f64>,
    /// Axial force per element, tension positive.
    element_force: DVector<f64>,
    /// Axial stress per element.
    element_stress: DVector<f64>,
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl Solution {
    /// Create an unsolved solution.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SolutionState::Unsolved,
            displacements: DVector::zeros(0),
            active_displacements: DVector::zeros(0),
            global_reactions: DMatrix::zeros(2, 0),
            element_force: DVector::zeros(0),
            element_stress: DVector::zeros(0),
        }
    }

    /// Current stage.
    #[must_use]
    pub fn state(&self) -> SolutionState {
        self.state
    }

    /// Solve `K_aa U_a = F_a - K_ar U_r` and assemble the full displacement vector.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::OutOfSequence`] if this solution has already been
    /// used and [`SolutionError::SingularStiffness`] when the supports leave a
    /// mechanism.
    pub fn solve_displacement(
        &mut self,
        analysis: &Analysis,
        dofs: &DofTable,
    ) -> Result<(), SolutionError> {
        self.require("solve displacements", SolutionState::Unsolved)?;
        if !analysis.is_numbered_by(dofs) {
            return Err(SolutionError::DofTableMismatch {
                step: "solve displacements",
            });
        }
        let active = solve_reduced(
            &analysis.partition().k_aa,
            analysis.reduced_force(),
            dofs,
            analysis.components(),
        )?;

        let mut displacements = DVector::zeros(dofs.number_dofs());
        for (&global, &value) in dofs.active().iter().zip(active.iter()) {
            displacements[global] = value;
        }
        for (&global, &value) in dofs.restrained().iter().zip(analysis.prescribed().iter()) {
            displacements[global] = value;
        }

        self.displacements = displacements;
        self.active_displacements = active;
        self.state = SolutionState::DisplacementsSolved;
        Ok(())
    }

    /// Recover support reactions `R_r = K_rr U_r + K_ra U_a - F_r`.
    ///
    /// Column `i` of [`global_reactions`](Self::global_reactions) belongs to the
    /// `i`-th support, pinned nodes first; the free component of a roller is zero.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::OutOfSequence`] unless displacements were just solved
    /// and [`SolutionError::SizeMismatch`] when `displacements` does not describe
    /// the supports of `dofs`.
    pub fn solve_reaction(
        &mut self,
        analysis: &Analysis,
        dofs: &DofTable,
        displacements: &Displacements,
    ) -> Result<(), SolutionError> {
        self.require("solve reactions", SolutionState::DisplacementsSolved)?;
        if !analysis.is_numbered_by(dofs) {
            return Err(SolutionError::DofTableMismatch {
                step: "solve reactions",
            });
        }
        let columns = displacements.number_pin() + displacements.number_roller();
        if columns != dofs.number_supports() {
            return Err(SolutionError::SizeMismatch {
                what: "support list",
                expected: dofs.number_supports(),
                found: columns,
            });
        }

        let partition = analysis.partition();
        let restrained_force = analysis.force().select_rows(dofs.restrained());
        let reactions = &partition.k_rr * analysis.prescribed()
            + &partition.k_ra * &self.active_displacements
            - restrained_force;

        let mut global_reactions = DMatrix::zeros(2, columns);
        for (slot, &value) in dofs.reaction_slots().iter().zip(reactions.iter()) {
            global_reactions[(slot.direction.offset(), slot.support)] = value;
        }

        self.global_reactions = global_reactions;
        self.state = SolutionState::ReactionsSolved;
        Ok(())
    }

    /// Compute the axial force `EA/L [-c, -s, c, s] . u` and stress of every element.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::OutOfSequence`] unless reactions were just solved and
    /// [`SolutionError::SizeMismatch`] when `mesh` has a different number of nodes
    /// than the solved model.
    pub fn solve_stress(&mut self, mesh: &Mesh) -> Result<(), SolutionError> {
        self.require("solve stresses", SolutionState::ReactionsSolved)?;
        if 2 * mesh.number_nodes() != self.displacements.len() {
            return Err(SolutionError::SizeMismatch {
                what: "mesh",
                expected: self.displacements.len() / 2,
                found: mesh.number_nodes(),
            });
        }

        let mut element_force = DVector::zeros(mesh.number_elements());
        let mut element_stress = DVector::zeros(mesh.number_elements());
        for (index, element) in mesh.elements().iter().enumerate() {
            let geometry = mesh.element_geometry(element);
            let [a, b, c, d] = element_dofs(element);
            let u = Vector4::new(
                self.displacements[a],
                self.displacements[b],
                self.displacements[c],
                self.displacements[d],
            );
            let t = Vector4::new(-geometry.cos, -geometry.sin, geometry.cos, geometry.sin);
            let force = element.axial_rigidity() / geometry.length * t.dot(&u);
            element_force[index] = force;
            element_stress[index] = force / element.area;
        }

        self.element_force = element_force;
        self.element_stress = element_stress;
        self.state = SolutionState::StressesSolved;
        Ok(())
    }

    /// Displacement of every global degree of freedom.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::OutOfSequence`] before displacements are solved.
    pub fn displacements(&self) -> Result<&DVector<f64>, SolutionError> {
        self.reached("read displacements", SolutionState::DisplacementsSolved)?;
        Ok(&self.displacements)
    }

    /// Displacement of one node, once displacements are solved.
    #[must_use]
    pub fn node_displacement(&self, node: usize) -> Option<Displacement> {
        if self.state < SolutionState::DisplacementsSolved || node == 0 {
            return None;
        }
        let base = 2 * (node - 1);
        if base + 1 >= self.displacements.len() {
            return None;
        }
        Some(Displacement::new(
            self.displacements[base],
            self.displacements[base + 1],
        ))
    }

    /// Reactions laid out as `2 x (number_pin + number_roller)`.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::OutOfSequence`] before reactions are solved.
    pub fn global_reactions(&self) -> Result<&DMatrix<f64>, SolutionError> {
        self.reached("read reactions", SolutionState::ReactionsSolved)?;
        Ok(&self.global_reactions)
    }

    /// Axial force per element, tension positive.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::OutOfSequence`] before stresses are solved.
    pub fn element_force(&self) -> Result<&DVector<f64>, SolutionError> {
        self.reached("read member forces", SolutionState::StressesSolved)?;
        Ok(&self.element_force)
    }

    /// Axial stress per element, tension positive.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::OutOfSequence`] before stresses are solved.
    pub fn element_stress(&self) -> Result<&DVector<f64>, SolutionError> {
        self.reached("read member stresses", SolutionState::StressesSolved)?;
        Ok(&self.element_stress)
    }

    /// Fail unless the solution is exactly at `required`.
    fn require(&self, step: &'static str, required: SolutionState) -> Result<(), SolutionError> {
        if self.state == required {
            Ok(())
        } else {
            Err(SolutionError::OutOfSequence {
                step,
                required,
                current: self.state,
            })
        }
    }

    /// Fail unless the solution has reached at least `required`.
    fn reached(&self, step: &'static str, required: SolutionState) -> Result<(), SolutionError> {
        if self.state >= required {
            Ok(())
        } else {
            Err(SolutionError::OutOfSequence {
                step,
                required,
                current: self.state,
            })
        }
    }
}

/// LU solve of the reduced system, reporting the columns with vanishing pivots.
fn solve_reduced(
    k_aa: &DMatrix<f64>,
    rhs: &DVector<f64>,
    dofs: &DofTable,
    components: usize,
) -> Result<DVector<f64>, SolutionError> {
    if k_aa.nrows() == 0 {
        return Ok(DVector::zeros(0));
    }
    let lu = k_aa.clone().lu();
    // Each pivot is compared with the diagonal stiffness of its own column, so
    // soft members next to stiff ones are not mistaken for mechanisms.
    let unconstrained: Vec<Dof> = lu
        .u()
        .diagonal()
        .iter()
        .zip(k_aa.diagonal().iter())
        .enumerate()
        .filter(|(_, (pivot, scale))| pivot.abs() <= SINGULAR_PIVOT_TOLERANCE * scale.abs())
        .map(|(column, _)| Dof::from_global_index(dofs.active()[column]))
        .collect();
    if !unconstrained.is_empty() {
        return Err(SolutionError::SingularStiffness {
            unconstrained,
            components,
        });
    }
    match lu.solve(rhs) {
        Some(solution) if solution.iter().all(|value| value.is_finite()) => Ok(solution),
        _ => Err(SolutionError::SingularStiffness {
            unconstrained,
            components,
        }),
    }
}
