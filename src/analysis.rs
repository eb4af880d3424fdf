//! Assembly of the global system and its partition by degree-of-freedom class.
//!
//! Every function here builds a new matrix or vector from its inputs; nothing
//! is patched in place. [`Analysis`] bundles the results for the solver.

use std::rc::Rc;

use nalgebra::{DMatrix, DVector, Matrix4, Vector4};

use crate::conditions::{Displacements, Forces};
use crate::dofs::{Dof, DofTable};
use crate::errors::{AnalysisError, MemberPropertyError};
use crate::geometry::Direction;
use crate::mesh::{Element, ElementGeometry, Mesh};

/// Global degrees of freedom of an element, start node before end node.
#[must_use]
pub fn element_dofs(element: &Element) -> [usize; 4] {
    [
        Dof::new(element.start, Direction::X).global_index(),
        Dof::new(element.start, Direction::Y).global_index(),
        Dof::new(element.end, Direction::X).global_index(),
        Dof::new(element.end, Direction::Y).global_index(),
    ]
}

/// Check an element and return its geometry.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidMemberProperties`] when the area or modulus is
/// not strictly positive and [`AnalysisError::ZeroLengthMember`] when the end
/// nodes coincide.
pub fn checked_geometry(mesh: &Mesh, element: &Element) -> Result<ElementGeometry, AnalysisError> {
    if element.area <= 0.0 || element.area.is_nan() {
        return Err(AnalysisError::InvalidMemberProperties {
            element: element.id,
            source: MemberPropertyError::NonPositiveArea { area: element.area },
        });
    }
    if element.elastic_modulus <= 0.0 || element.elastic_modulus.is_nan() {
        return Err(AnalysisError::InvalidMemberProperties {
            element: element.id,
            source: MemberPropertyError::NonPositiveElasticModulus {
                elastic_modulus: element.elastic_modulus,
            },
        });
    }
    let geometry = mesh.element_geometry(element);
    if geometry.length <= 0.0 {
        return Err(AnalysisError::ZeroLengthMember(element.id));
    }
    Ok(geometry)
}

/// Stiffness of one element in global coordinates, `EA/L * T^T T` with
/// `T = [c, s, -c, -s]`.
#[must_use]
pub fn element_stiffness(element: &Element, geometry: &ElementGeometry) -> Matrix4<f64> {
    let ea_over_l = element.axial_rigidity() / geometry.length;
    let t = Vector4::new(geometry.cos, geometry.sin, -geometry.cos, -geometry.sin);
    ea_over_l * t * t.transpose()
}

/// Assemble the `2n x 2n` global stiffness matrix.
///
/// The result is singular until supports remove the rigid-body modes.
///
/// # Errors
///
/// Returns [`AnalysisError`] when an element has a non-positive area, modulus or
/// length.
pub fn build_global_stiffness(mesh: &Mesh) -> Result<DMatrix<f64>, AnalysisError> {
    let dof = 2 * mesh.number_nodes();
    let mut matrix = DMatrix::zeros(dof, dof);
    for element in mesh.elements() {
        let geometry = checked_geometry(mesh, element)?;
        let local = element_stiffness(element, &geometry);
        let dof_map = element_dofs(element);
        log::trace!(
            "element {}: L = {}, c = {}, s = {}",
            element.id,
            geometry.length,
            geometry.cos,
            geometry.sin
        );
        for (row_local, &global_row) in dof_map.iter().enumerate() {
            for (col_local, &global_col) in dof_map.iter().enumerate() {
                matrix[(global_row, global_col)] += local[(row_local, col_local)];
            }
        }
    }
    log::debug!(
        "assembled {dof}x{dof} stiffness matrix from {} elements",
        mesh.number_elements()
    );
    Ok(matrix)
}

/// Copy the applied loads into a global force vector.
///
/// # Errors
///
/// Returns [`AnalysisError::ForceVectorSize`] when `forces` was built for a
/// different number of nodes than `dofs`.
pub fn build_global_force_vector(
    forces: &Forces,
    dofs: &DofTable,
) -> Result<DVector<f64>, AnalysisError> {
    let values = forces.as_slice();
    if values.len() != dofs.number_dofs() {
        return Err(AnalysisError::ForceVectorSize {
            expected: dofs.number_dofs(),
            found: values.len(),
        });
    }
    Ok(DVector::from_vec(values.to_vec()))
}

/// Prescribed displacements of the restrained degrees of freedom, in restrained order.
#[must_use]
pub fn build_reduced_displacement_vector(
    displacements: &Displacements,
    dofs: &DofTable,
) -> DVector<f64> {
    let values: Vec<f64> = displacements
        .supports()
        .flat_map(|entry| entry.support.restrained())
        .map(|(_, value)| value)
        .collect();
    debug_assert_eq!(values.len(), dofs.restrained_count());
    DVector::from_vec(values)
}

/// Blocks of the global stiffness matrix split into active (`a`) and
/// restrained (`r`) degrees of freedom.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    /// Active rows, active columns.
    pub k_aa: DMatrix<f64>,
    /// Active rows, restrained columns.
    pub k_ar: DMatrix<f64>,
    /// Restrained rows, active columns.
    pub k_ra: DMatrix<f64>,
    /// Restrained rows, restrained columns.
    pub k_rr: DMatrix<f64>,
}

/// Select the active and restrained blocks of `stiffness`.
///
/// This is plain index selection driven by `dofs`.
#[must_use]
pub fn build_reduced_transformation(stiffness: &DMatrix<f64>, dofs: &DofTable) -> Partition {
    let active_rows = stiffness.select_rows(dofs.active());
    let restrained_rows = stiffness.select_rows(dofs.restrained());
    Partition {
        k_aa: active_rows.select_columns(dofs.active()),
        k_ar: active_rows.select_columns(dofs.restrained()),
        k_ra: restrained_rows.select_columns(dofs.active()),
        k_rr: restrained_rows.select_columns(dofs.restrained()),
    }
}

/// Assembled system ready to be solved.
///
/// The stiffness matrix and its partition are shared between analyses created
/// with [`Analysis::with_forces`], so changing the loads never reassembles them.
#[derive(Clone, Debug)]
pub struct Analysis {
    /// Global stiffness matrix.
    stiffness: Rc<DMatrix<f64>>,
    /// Partitioned stiffness blocks.
    partition: Rc<Partition>,
    /// Global force vector.
    force: DVector<f64>,
    /// Prescribed displacements `U_r`.
    prescribed: DVector<f64>,
    /// Right-hand side of the reduced system, `F_a - K_ar U_r`.
    reduced_force: DVector<f64>,
    /// Connected pieces of the mesh.
    components: usize,
    /// Numbering the partition was built with.
    dofs: Rc<DofTable>,
}

impl Analysis {
    /// Assemble the full and partitioned system.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] for degenerate elements or a load vector of the
    /// wrong size.
    pub fn new(
        mesh: &Mesh,
        displacements: &Displacements,
        forces: &Forces,
        dofs: &DofTable,
    ) -> Result<Self, AnalysisError> {
        let stiffness = build_global_stiffness(mesh)?;
        let partition = build_reduced_transformation(&stiffness, dofs);
        let prescribed = build_reduced_displacement_vector(displacements, dofs);
        let force = build_global_force_vector(forces, dofs)?;
        let reduced_force = Self::reduce_force(&force, &partition, &prescribed, dofs);
        Ok(Self {
            stiffness: Rc::new(stiffness),
            partition: Rc::new(partition),
            force,
            prescribed,
            reduced_force,
            components: mesh.connected_components(),
            dofs: Rc::new(dofs.clone()),
        })
    }

    /// Reuse the assembled stiffness with a different set of loads.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DofTableMismatch`] when `dofs` is not the table this
    /// analysis was built with and [`AnalysisError::ForceVectorSize`] when `forces`
    /// does not match it.
    pub fn with_forces(&self, forces: &Forces, dofs: &DofTable) -> Result<Self, AnalysisError> {
        if !self.is_numbered_by(dofs) {
            return Err(AnalysisError::DofTableMismatch);
        }
        let force = build_global_force_vector(forces, dofs)?;
        let reduced_force = Self::reduce_force(&force, &self.partition, &self.prescribed, dofs);
        Ok(Self {
            stiffness: Rc::clone(&self.stiffness),
            partition: Rc::clone(&self.partition),
            force,
            prescribed: self.prescribed.clone(),
            reduced_force,
            components: self.components,
            dofs: Rc::clone(&self.dofs),
        })
    }

    /// `F_a - K_ar U_r`.
    fn reduce_force(
        force: &DVector<f64>,
        partition: &Partition,
        prescribed: &DVector<f64>,
        dofs: &DofTable,
    ) -> DVector<f64> {
        force.select_rows(dofs.active()) - &partition.k_ar * prescribed
    }

    /// Global stiffness matrix.
    #[must_use]
    pub fn stiffness(&self) -> &DMatrix<f64> {
        &self.stiffness
    }

    /// Partitioned stiffness blocks.
    #[must_use]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Global force vector.
    #[must_use]
    pub fn force(&self) -> &DVector<f64> {
        &self.force
    }

    /// Prescribed displacements of the restrained degrees of freedom.
    #[must_use]
    pub fn prescribed(&self) -> &DVector<f64> {
        &self.prescribed
    }

    /// Right-hand side of the reduced system.
    #[must_use]
    pub fn reduced_force(&self) -> &DVector<f64> {
        &self.reduced_force
    }

    /// Number of connected pieces in the analysed mesh.
    #[must_use]
    pub fn components(&self) -> usize {
        self.components
    }

    /// Whether `dofs` is the numbering this analysis was partitioned with.
    #[must_use]
    pub fn is_numbered_by(&self, dofs: &DofTable) -> bool {
        *self.dofs == *dofs
    }

    /// Whether two analyses share the same assembled stiffness matrix.
    #[must_use]
    pub fn shares_stiffness(&self, other: &Analysis) -> bool {
        Rc::ptr_eq(&self.stiffness, &other.stiffness)
    }
}
