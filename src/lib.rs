#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod analysis;
pub mod conditions;
pub mod dofs;
pub mod errors;
pub mod geometry;
pub mod input;
pub mod mesh;
pub mod project;
pub mod report;
pub mod solution;

pub use analysis::Analysis;
pub use conditions::{Displacements, Forces, Support};
pub use dofs::{Dof, DofTable};
pub use errors::{
    AnalysisError, ConditionError, FormatSpecError, MemberPropertyError, MeshError, ProjectError,
    SolutionError,
};
pub use geometry::{displacement, force, point, Direction, Displacement, Force, Point};
pub use input::ProjectDocument;
pub use mesh::{Element, Mesh, Node};
pub use project::TrussProject;
pub use report::{NumberFormat, ResultsDocument};
pub use solution::{Solution, SolutionState, SINGULAR_PIVOT_TOLERANCE};
