use std::path::Path;

use trussx2d::{NumberFormat, TrussProject};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Three rods, a pin at the origin and a roller under the right corner.
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/triangle.json");
    let mut project = TrussProject::from_json_file(path)?;

    project.solve()?;
    print!("{}", project.report_reactions(NumberFormat::default())?);
    print!("{}", project.report_rod_forces(NumberFormat::default())?);

    // Same structure, twice the load: the stiffness matrix is reused
    let mut doubled = project.forces().clone();
    doubled.set(3, trussx2d::force(2_000.0, -4_000.0))?;
    project.set_forces(doubled)?;
    project.solve()?;
    print!("{}", project.report_rod_forces(NumberFormat::Fixed(1))?);

    Ok(())
}
