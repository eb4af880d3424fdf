//! Error types produced while building or analysing a truss model.

use thiserror::Error;

use crate::dofs::Dof;
use crate::geometry::Direction;
use crate::solution::SolutionState;

/// Error returned when a mesh is constructed from inconsistent data.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MeshError {
    /// Returned when node identifiers are not `1, 2, 3, ...` in listing order.
    #[error("node at position {position} has id {id}; node ids must be sequential from 1")]
    NonSequentialNode {
        /// Zero-based position of the node in the listing.
        position: usize,
        /// Identifier found at that position.
        id: usize,
    },
    /// Returned when element identifiers are not `1, 2, 3, ...` in listing order.
    #[error("element at position {position} has id {id}; element ids must be sequential from 1")]
    NonSequentialElement {
        /// Zero-based position of the element in the listing.
        position: usize,
        /// Identifier found at that position.
        id: usize,
    },
    /// Returned when an element references a node that does not exist.
    #[error("element {element} references unknown node {node}")]
    UnknownNode {
        /// Offending element.
        element: usize,
        /// Node identifier that could not be found.
        node: usize,
    },
    /// Returned when both ends of an element are the same node.
    #[error("element {element} connects node {node} to itself")]
    SelfConnected {
        /// Offending element.
        element: usize,
        /// Node used for both ends.
        node: usize,
    },
}

/// Error returned when supports, prescribed displacements or loads are invalid.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConditionError {
    /// Returned when a support or load references a node outside the mesh.
    #[error("node {node} does not exist in the mesh ({number_nodes} nodes)")]
    UnknownNode {
        /// Node identifier that could not be found.
        node: usize,
        /// Number of nodes in the mesh.
        number_nodes: usize,
    },
    /// Returned when a node is given more than one support.
    #[error("node {0} already has a support")]
    DuplicateSupport(usize),
    /// Returned when the same degree of freedom is restrained twice.
    #[error("degree of freedom {0} is restrained more than once")]
    DuplicateDof(Dof),
    /// Returned when a roller is given a prescribed displacement across its free direction.
    #[error(
        "roller at node {node} restrains the {restrained} direction but a displacement was prescribed along {prescribed}"
    )]
    PrescribedDirectionMismatch {
        /// Roller node.
        node: usize,
        /// Direction restrained by the roller.
        restrained: Direction,
        /// Direction named by the prescription.
        prescribed: Direction,
    },
    /// Returned when a displacement is prescribed on a node without a support.
    #[error("node {0} has no support; displacements can only be prescribed on supported nodes")]
    UnsupportedNode(usize),
}

/// Error returned when supplied member properties are not physically meaningful.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum MemberPropertyError {
    /// Returned when the cross-sectional area is zero or negative.
    #[error("area must be positive (received {area})")]
    NonPositiveArea {
        /// Rejected cross-sectional area.
        area: f64,
    },
    /// Returned when the elastic modulus is zero or negative.
    #[error("elastic modulus must be positive (received {elastic_modulus})")]
    NonPositiveElasticModulus {
        /// Rejected elastic modulus.
        elastic_modulus: f64,
    },
}

/// Error returned while assembling the global system.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when a member spans zero distance.
    #[error("element {0} has zero length")]
    ZeroLengthMember(usize),
    /// Returned when the properties of a member are not physically meaningful.
    #[error("element {element} has invalid properties: {source}")]
    InvalidMemberProperties {
        /// Offending element.
        element: usize,
        /// Description of the invalid property.
        #[source]
        source: MemberPropertyError,
    },
    /// Returned when the load vector does not match the degree-of-freedom table.
    #[error("load vector has {found} entries but the model has {expected} degrees of freedom")]
    ForceVectorSize {
        /// Number of global degrees of freedom.
        expected: usize,
        /// Length of the supplied load vector.
        found: usize,
    },
    /// Returned when a degree-of-freedom table other than the one the system was
    /// partitioned with is supplied.
    #[error("degree-of-freedom table does not match the one the system was partitioned with")]
    DofTableMismatch,
}

/// Error returned by the staged solver.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SolutionError {
    /// Returned when a step is invoked before its prerequisite.
    #[error("cannot {step}: solution is {current:?}, expected {required:?}")]
    OutOfSequence {
        /// Name of the requested step.
        step: &'static str,
        /// State the step requires.
        required: SolutionState,
        /// State the solution is currently in.
        current: SolutionState,
    },
    /// Returned when the inputs of a step describe a different model than earlier steps.
    #[error("{what} has {found} entries but the solved model has {expected}")]
    SizeMismatch {
        /// Quantity that does not fit.
        what: &'static str,
        /// Size implied by the earlier steps.
        expected: usize,
        /// Size supplied to this step.
        found: usize,
    },
    /// Returned when the degree-of-freedom table differs from the one the analysis
    /// was assembled with.
    #[error("cannot {step}: degree-of-freedom table does not match the assembled system")]
    DofTableMismatch {
        /// Name of the requested step.
        step: &'static str,
    },
    /// Returned when the reduced stiffness matrix cannot be inverted.
    #[error(
        "stiffness matrix is singular; unconstrained degrees of freedom: {}{}",
        format_dofs(.unconstrained),
        format_components(.components)
    )]
    SingularStiffness {
        /// Active degrees of freedom without stiffness of their own.
        unconstrained: Vec<Dof>,
        /// Number of connected components in the mesh.
        components: usize,
    },
}

/// Join degree-of-freedom labels for an error message.
fn format_dofs(dofs: &[Dof]) -> String {
    dofs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Mention a disconnected mesh in an error message.
fn format_components(components: &usize) -> String {
    if *components > 1 {
        format!(" (mesh is split into {components} disconnected parts)")
    } else {
        String::new()
    }
}

/// Error returned when a number format specification cannot be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unsupported number format {0:?}; expected .Ng, .Nf or .Ne")]
pub struct FormatSpecError(pub String);

/// Error returned by [`TrussProject`](crate::TrussProject) operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Invalid mesh data.
    #[error(transparent)]
    Mesh(#[from] MeshError),
    /// Invalid supports or loads.
    #[error(transparent)]
    Condition(#[from] ConditionError),
    /// Assembly failure.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    /// Solve or post-processing failure.
    #[error(transparent)]
    Solution(#[from] SolutionError),
    /// File could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON document could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
