//! A complete truss problem and the pipeline that solves it.

use std::path::Path;

use crate::analysis::Analysis;
use crate::conditions::{Displacements, Forces};
use crate::dofs::DofTable;
use crate::errors::{AnalysisError, ProjectError, SolutionError};
use crate::input::ProjectDocument;
use crate::mesh::Mesh;
use crate::report::{render_reactions, render_rod_forces, NumberFormat, ResultsDocument};
use crate::solution::{Solution, SolutionState};

/// Mesh, boundary conditions, loads and the most recent results.
///
/// ```
/// use trussx2d::{point, force, Direction, Displacements, Element, Forces, Mesh, Node, TrussProject};
///
/// let mesh = Mesh::new(
///     vec![Node::new(1, point(0.0, 0.0)), Node::new(2, point(2.0, 0.0))],
///     vec![Element::new(1, 1, 2, 1.0e-4, 2.0e11)],
/// )
/// .unwrap();
/// let mut supports = Displacements::new();
/// supports.pin(1).unwrap();
/// supports.roller(2, Direction::Y).unwrap();
/// let mut loads = Forces::new(2);
/// loads.set(2, force(1_000.0, 0.0)).unwrap();
///
/// let mut project = TrussProject::new(mesh, supports, loads);
/// let solution = project.solve().unwrap();
/// assert!((solution.element_force().unwrap()[0] - 1_000.0).abs() < 1e-6);
/// ```
#[derive(Clone, Debug)]
pub struct TrussProject {
    /// Nodes and members.
    mesh: Mesh,
    /// Supports and prescribed displacements.
    displacements: Displacements,
    /// Applied loads.
    forces: Forces,
    /// Numbering of the last assembly.
    dofs: Option<DofTable>,
    /// Assembled system, kept across load changes.
    analysis: Option<Analysis>,
    /// Results of the last successful solve.
    solution: Option<Solution>,
}

impl TrussProject {
    /// Create an unsolved project.
    #[must_use]
    pub fn new(mesh: Mesh, displacements: Displacements, forces: Forces) -> Self {
        Self {
            mesh,
            displacements,
            forces,
            dofs: None,
            analysis: None,
            solution: None,
        }
    }

    /// Build a project from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError`] when the document describes an invalid model.
    pub fn from_document(document: &ProjectDocument) -> Result<Self, ProjectError> {
        Ok(Self::new(
            document.mesh()?,
            document.displacements()?,
            document.forces()?,
        ))
    }

    /// Parse a project from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError`] for malformed JSON or an invalid model.
    pub fn from_json(text: &str) -> Result<Self, ProjectError> {
        Self::from_document(&ProjectDocument::from_json(text)?)
    }

    /// Read a project from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError`] when the file cannot be read or is invalid.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        log::info!("loading project from {}", path.display());
        Self::from_document(&ProjectDocument::from_json_file(path)?)
    }

    /// The mesh.
    #[must_use]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Supports and prescribed displacements.
    #[must_use]
    pub fn displacements(&self) -> &Displacements {
        &self.displacements
    }

    /// Applied loads.
    #[must_use]
    pub fn forces(&self) -> &Forces {
        &self.forces
    }

    /// Degree-of-freedom numbering, once matrices are built.
    #[must_use]
    pub fn dofs(&self) -> Option<&DofTable> {
        self.dofs.as_ref()
    }

    /// Assembled system, once matrices are built.
    #[must_use]
    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Results of the last successful solve.
    #[must_use]
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Number the degrees of freedom and assemble the system from scratch.
    ///
    /// Any previous results are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Condition`] for supports outside the mesh and
    /// [`ProjectError::Analysis`] for degenerate members or mismatched loads.
    pub fn update_matrices(&mut self) -> Result<(), ProjectError> {
        self.solution = None;
        self.analysis = None;
        self.dofs = None;

        let (dofs, analysis) = self.assemble()?;
        self.dofs = Some(dofs);
        self.analysis = Some(analysis);
        Ok(())
    }

    /// Number and assemble without touching stored state.
    fn assemble(&self) -> Result<(DofTable, Analysis), ProjectError> {
        let dofs = DofTable::new(&self.mesh, &self.displacements)?;
        let analysis = Analysis::new(&self.mesh, &self.displacements, &self.forces, &dofs)?;
        log::debug!(
            "partitioned {n} degrees of freedom into a {m}x{m} reduced system",
            n = dofs.number_dofs(),
            m = dofs.active_count()
        );
        Ok((dofs, analysis))
    }

    /// Replace the loads, keeping the assembled stiffness matrix.
    ///
    /// Previous results are discarded; call [`solve`](Self::solve) again.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ForceVectorSize`] when `forces` does not cover the
    /// nodes of the mesh.
    pub fn set_forces(&mut self, forces: Forces) -> Result<(), ProjectError> {
        if forces.number_nodes() != self.mesh.number_nodes() {
            return Err(AnalysisError::ForceVectorSize {
                expected: 2 * self.mesh.number_nodes(),
                found: 2 * forces.number_nodes(),
            }
            .into());
        }
        if let (Some(analysis), Some(dofs)) = (&self.analysis, &self.dofs) {
            self.analysis = Some(analysis.with_forces(&forces, dofs)?);
        }
        self.forces = forces;
        self.solution = None;
        Ok(())
    }

    /// Run displacements, reactions and member forces in order.
    ///
    /// Matrices are assembled first if needed. Results are kept only if every
    /// step succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError`] from assembly or from any solution step, such as
    /// [`SolutionError::SingularStiffness`] for an under-restrained structure.
    pub fn solve(&mut self) -> Result<&Solution, ProjectError> {
        self.solution = None;
        let (dofs, analysis) = match (self.dofs.take(), self.analysis.take()) {
            (Some(dofs), Some(analysis)) => (dofs, analysis),
            _ => self.assemble()?,
        };

        let mut solution = Solution::new();
        let outcome = solution
            .solve_displacement(&analysis, &dofs)
            .and_then(|()| solution.solve_reaction(&analysis, &dofs, &self.displacements))
            .and_then(|()| solution.solve_stress(&self.mesh));
        self.dofs = Some(dofs);
        self.analysis = Some(analysis);
        outcome?;

        log::info!(
            "solved {} nodes and {} members",
            self.mesh.number_nodes(),
            self.mesh.number_elements()
        );
        Ok(self.solution.insert(solution))
    }

    /// Text report of the support reactions.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::OutOfSequence`] before a successful solve.
    pub fn report_reactions(&self, format: NumberFormat) -> Result<String, SolutionError> {
        render_reactions(&self.displacements, self.solved("report reactions")?, format)
    }

    /// Text report of the member forces.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::OutOfSequence`] before a successful solve.
    pub fn report_rod_forces(&self, format: NumberFormat) -> Result<String, SolutionError> {
        render_rod_forces(&self.mesh, self.solved("report rod forces")?, format)
    }

    /// Results in their serializable form.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::OutOfSequence`] before a successful solve.
    pub fn results(&self) -> Result<ResultsDocument, SolutionError> {
        ResultsDocument::new(
            &self.mesh,
            &self.displacements,
            self.solved("collect results")?,
        )
    }

    /// Write the results as JSON. Nothing is written before a successful solve.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Solution`] when unsolved, otherwise I/O or JSON errors.
    pub fn write_results(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let results = self.results()?;
        results.write(&path)?;
        log::info!("wrote results to {}", path.as_ref().display());
        Ok(())
    }

    /// Write the model itself as a project document.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Io`] or [`ProjectError::Json`] when writing fails.
    pub fn write_input(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        ProjectDocument::from_model(&self.mesh, &self.displacements, &self.forces).write(path)
    }

    /// The solution, or the error a reader gets before solving.
    fn solved(&self, step: &'static str) -> Result<&Solution, SolutionError> {
        self.solution.as_ref().ok_or(SolutionError::OutOfSequence {
            step,
            required: SolutionState::StressesSolved,
            current: SolutionState::Unsolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{force, point, Direction};
    use crate::mesh::{Element, Node};

    fn triangle() -> TrussProject {
        let mesh = Mesh::new(
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
        .expect("valid mesh");
        let mut displacements = Displacements::new();
        displacements.pin(1).expect("pin");
        displacements.roller(2, Direction::Y).expect("roller");
        let mut forces = Forces::new(3);
        forces.set(3, force(1_000.0, -2_000.0)).expect("load");
        TrussProject::new(mesh, displacements, forces)
    }

    #[test]
    fn solve_runs_every_step() {
        let mut project = triangle();
        let solution = project.solve().expect("determinate truss");
        assert_eq!(solution.state(), SolutionState::StressesSolved);

        let reactions = solution.global_reactions().expect("reactions");
        assert_relative_eq!(reactions[(0, 0)], -1_000.0, max_relative = 1e-9);
        assert_relative_eq!(reactions[(1, 0)], 1_250.0, max_relative = 1e-9);
        assert_relative_eq!(reactions[(1, 1)], 750.0, max_relative = 1e-9);
        assert!(project.dofs().is_some());
    }

    #[test]
    fn reports_need_a_solution() {
        let mut project = triangle();
        assert!(matches!(
            project.report_reactions(NumberFormat::default()),
            Err(SolutionError::OutOfSequence { .. })
        ));
        project.solve().expect("determinate truss");
        let text = project
            .report_reactions(NumberFormat::default())
            .expect("solved");
        assert_eq!(
            text,
            "Reaction forces:\n\
             |- Pinned Nodes:\n\
             |   |- Node 1 = (-1e+03, 1.25e+03)    | mag: 1.6e+03\n\
             |- Roller Nodes:\n\
             |   |- Node 2 = (0, 750)    | mag: 750\n"
        );
        let rods = project
            .report_rod_forces(NumberFormat::default())
            .expect("solved");
        assert_eq!(
            rods,
            "Rods forces:\n|   |- Rod 1 = 1e+03\n|   |- Rod 2 = -1.25e+03\n|   |- Rod 3 = -1.25e+03\n"
        );
    }

    #[test]
    fn new_loads_reuse_stiffness() {
        let mut project = triangle();
        project.update_matrices().expect("assembles");
        let before = project.analysis().expect("assembled").clone();

        let mut doubled = Forces::new(3);
        doubled.set(3, force(2_000.0, -4_000.0)).expect("load");
        project.set_forces(doubled).expect("same size");
        assert!(project.solution().is_none());
        assert!(before.shares_stiffness(project.analysis().expect("assembled")));

        let forces = project
            .solve()
            .expect("determinate truss")
            .element_force()
            .expect("forces")
            .clone();
        assert_relative_eq!(forces[0], 2_000.0, max_relative = 1e-9);
        assert_relative_eq!(forces[1], -2_500.0, max_relative = 1e-9);
    }

    #[test]
    fn mismatched_loads_are_rejected() {
        let mut project = triangle();
        let error = project.set_forces(Forces::new(5)).expect_err("wrong size");
        assert!(matches!(
            error,
            ProjectError::Analysis(AnalysisError::ForceVectorSize {
                expected: 6,
                found: 10
            })
        ));
        assert_eq!(project.forces().number_nodes(), 3);
    }

    #[test]
    fn failed_solve_keeps_no_results() {
        let mesh = Mesh::new(
            vec![Node::new(1, point(0.0, 0.0)), Node::new(2, point(1.0, 0.0))],
            vec![Element::new(1, 1, 2, 1.0, 1.0)],
        )
        .expect("valid mesh");
        let mut displacements = Displacements::new();
        displacements.pin(1).expect("pin");
        let mut project = TrussProject::new(mesh, displacements, Forces::new(2));

        assert!(matches!(
            project.solve(),
            Err(ProjectError::Solution(SolutionError::SingularStiffness { .. }))
        ));
        assert!(project.solution().is_none());

        let dir = tempfile::tempdir().expect("scratch directory");
        let path = dir.path().join("results.json");
        assert!(matches!(
            project.write_results(&path),
            Err(ProjectError::Solution(_))
        ));
        assert!(!path.exists());
    }
}
