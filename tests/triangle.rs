use approx::assert_relative_eq;
use trussx2d::{
    force, point, Direction, Displacements, Element, Forces, Mesh, Node, Solution, TrussProject,
};

const AREA: f64 = 0.01;
const MODULUS: f64 = 200.0e9;

fn triangle_mesh() -> Mesh {
    Mesh::new(
        vec![
            Node::new(1, point(0.0, 0.0)),
            Node::new(2, point(4.0, 0.0)),
            Node::new(3, point(0.0, 3.0)),
        ],
        vec![
            Element::new(1, 1, 2, AREA, MODULUS),
            Element::new(2, 2, 3, AREA, MODULUS),
            Element::new(3, 1, 3, AREA, MODULUS),
        ],
    )
    .expect("triangle mesh is valid")
}

fn supports(settlement: f64) -> Displacements {
    let mut supports = Displacements::new();
    supports.pin(1).expect("pin assignment succeeds");
    supports
        .roller_with(2, Direction::Y, settlement)
        .expect("roller assignment succeeds");
    supports
}

fn loads(fx: f64, fy: f64) -> Forces {
    let mut forces = Forces::new(3);
    forces.set(3, force(fx, fy)).expect("load assignment succeeds");
    forces
}

fn solved(settlement: f64, fx: f64, fy: f64) -> Solution {
    let mut project = TrussProject::new(triangle_mesh(), supports(settlement), loads(fx, fy));
    project.solve().expect("triangle is stable").clone()
}

#[test]
fn member_forces_match_method_of_joints() {
    let solution = solved(0.0, 1_000.0, -2_000.0);
    let forces = solution.element_force().expect("forces available");
    assert_relative_eq!(forces[0], 1_000.0, max_relative = 1.0e-9);
    assert_relative_eq!(forces[1], -1_250.0, max_relative = 1.0e-9);
    assert_relative_eq!(forces[2], -1_250.0, max_relative = 1.0e-9);

    let stresses = solution.element_stress().expect("stresses available");
    assert_relative_eq!(stresses[1], -1_250.0 / AREA, max_relative = 1.0e-9);
}

#[test]
fn reactions_balance_the_applied_load() {
    let solution = solved(0.0, 1_000.0, -2_000.0);
    let reactions = solution.global_reactions().expect("reactions available");
    assert_eq!(reactions.shape(), (2, 2));

    assert_relative_eq!(reactions[(0, 0)], -1_000.0, max_relative = 1.0e-9);
    assert_relative_eq!(reactions[(1, 0)], 1_250.0, max_relative = 1.0e-9);
    assert_eq!(reactions[(0, 1)], 0.0);
    assert_relative_eq!(reactions[(1, 1)], 750.0, max_relative = 1.0e-9);

    let sum_x = reactions[(0, 0)] + reactions[(0, 1)] + 1_000.0;
    let sum_y = reactions[(1, 0)] + reactions[(1, 1)] - 2_000.0;
    assert!(sum_x.abs() < 1.0e-6);
    assert!(sum_y.abs() < 1.0e-6);

    // Moments about node 1: roller at (4, 0), load at (0, 3).
    let moment = 4.0 * reactions[(1, 1)] - 3.0 * 1_000.0;
    assert!(moment.abs() < 1.0e-6);
}

#[test]
fn load_on_pinned_node_goes_straight_into_its_reaction() {
    let reference = solved(0.0, 1_000.0, -2_000.0);

    let mut forces = loads(1_000.0, -2_000.0);
    forces.set(1, force(500.0, 0.0)).expect("node 1 exists");
    let mut project = TrussProject::new(triangle_mesh(), supports(0.0), forces);
    let loaded = project.solve().expect("triangle is stable");

    let before = reference.global_reactions().expect("reactions available");
    let after = loaded.global_reactions().expect("reactions available");
    assert_relative_eq!(after[(0, 0)] - before[(0, 0)], -500.0, max_relative = 1.0e-9);
    assert_relative_eq!(after[(1, 0)], before[(1, 0)], max_relative = 1.0e-9);
    assert_relative_eq!(after[(1, 1)], before[(1, 1)], max_relative = 1.0e-9);

    let reference_forces = reference.element_force().expect("forces available");
    let loaded_forces = loaded.element_force().expect("forces available");
    for (a, b) in loaded_forces.iter().zip(reference_forces.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1.0e-6);
    }

    let sum_x = after[(0, 0)] + after[(0, 1)] + 500.0 + 1_000.0;
    let sum_y = after[(1, 0)] + after[(1, 1)] - 2_000.0;
    assert!(sum_x.abs() < 1.0e-6);
    assert!(sum_y.abs() < 1.0e-6);
}

#[test]
fn global_stiffness_is_symmetric() {
    let mut project = TrussProject::new(triangle_mesh(), supports(0.0), loads(1.0, 1.0));
    project.update_matrices().expect("triangle assembles");
    let stiffness = project.analysis().expect("assembled").stiffness();
    assert_eq!(stiffness.shape(), (6, 6));
    for i in 0..6 {
        for j in 0..6 {
            assert_relative_eq!(stiffness[(i, j)], stiffness[(j, i)], epsilon = 1.0e-3);
        }
    }
}

#[test]
fn zero_load_gives_zero_response() {
    let solution = solved(0.0, 0.0, 0.0);
    assert!(solution
        .displacements()
        .expect("displacements")
        .iter()
        .all(|value| value.abs() < 1.0e-15));
    assert!(solution
        .global_reactions()
        .expect("reactions")
        .iter()
        .all(|value| value.abs() < 1.0e-9));
    assert!(solution
        .element_force()
        .expect("forces")
        .iter()
        .all(|value| value.abs() < 1.0e-9));
}

#[test]
fn settlement_of_determinate_truss_is_stress_free() {
    let settled = solved(-0.001, 1_000.0, -2_000.0);
    let reference = solved(0.0, 1_000.0, -2_000.0);

    let moved = settled.node_displacement(2).expect("node 2 solved");
    assert_relative_eq!(moved.y, -0.001, max_relative = 1.0e-12);

    let settled_forces = settled.element_force().expect("forces");
    let reference_forces = reference.element_force().expect("forces");
    for (a, b) in settled_forces.iter().zip(reference_forces.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1.0e-3);
    }
}

#[test]
fn new_loads_match_a_full_rebuild() {
    let mut project = TrussProject::new(triangle_mesh(), supports(0.0), loads(1_000.0, -2_000.0));
    project.solve().expect("first load case");

    project
        .set_forces(loads(-500.0, 3_000.0))
        .expect("same mesh size");
    let reused = project.solve().expect("second load case").clone();
    let rebuilt = solved(0.0, -500.0, 3_000.0);

    let pairs = [
        (
            reused.displacements().expect("displacements"),
            rebuilt.displacements().expect("displacements"),
        ),
        (
            reused.element_force().expect("forces"),
            rebuilt.element_force().expect("forces"),
        ),
    ];
    for (left, right) in pairs {
        for (a, b) in left.iter().zip(right.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1.0e-9, max_relative = 1.0e-9);
        }
    }
}
