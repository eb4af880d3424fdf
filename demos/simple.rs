use trussx2d::{force, point, Direction, Displacements, Element, Forces, Mesh, Node, TrussProject};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mesh = Mesh::new(
        vec![Node::new(1, point(0.0, 0.0)), Node::new(2, point(1.0, 0.0))],
        vec![Element::new(1, 1, 2, 0.01, 200.0e9)],
    )?;

    let mut supports = Displacements::new();
    supports.pin(1)?;
    supports.roller(2, Direction::Y)?;

    let mut loads = Forces::new(2);
    loads.set(2, force(-1000.0, 0.0))?;

    let mut project = TrussProject::new(mesh, supports, loads);
    let solution = project.solve()?;

    if let Some(displacement) = solution.node_displacement(2) {
        println!("ux = {:.3e} m", displacement.x);
    }

    Ok(())
}
