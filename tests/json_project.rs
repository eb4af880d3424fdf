use std::path::PathBuf;

use approx::assert_relative_eq;
use tempfile::tempdir;
use trussx2d::report::SupportKind;
use trussx2d::{NumberFormat, ProjectError, ResultsDocument, SolutionError, TrussProject};

fn demo_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/triangle.json")
}

#[test]
fn solves_project_file_and_reports() {
    let mut project = TrussProject::from_json_file(demo_path()).expect("demo project loads");
    project.solve().expect("demo project solves");

    let report = project
        .report_reactions(".3g".parse::<NumberFormat>().expect("valid format"))
        .expect("solved");
    assert!(report.contains("|   |- Node 1 = (-1e+03, 1.25e+03)    | mag: 1.6e+03"));
    assert!(report.contains("|   |- Node 2 = (0, 750)    | mag: 750"));

    let rods = project
        .report_rod_forces(NumberFormat::Fixed(1))
        .expect("solved");
    assert!(rods.contains("|   |- Rod 3 = -1250.0"));
}

#[test]
fn results_round_trip_through_json() {
    let mut project = TrussProject::from_json_file(demo_path()).expect("demo project loads");
    project.solve().expect("demo project solves");

    let dir = tempdir().expect("scratch directory");
    let path = dir.path().join("results.json");
    project.write_results(&path).expect("results are written");
    let written = ResultsDocument::from_json_file(&path).expect("results are readable");

    assert_eq!(written, project.results().expect("solved"));
    assert_eq!(written.displacements.len(), 3);
    assert_eq!(written.reactions[0].node, 1);
    assert_eq!(written.reactions[0].support, SupportKind::Pin);
    assert_eq!(written.reactions[1].support, SupportKind::Roller);
    assert_relative_eq!(written.reactions[0].magnitude, 1_600.781_059_358_212, max_relative = 1.0e-9);
    assert_relative_eq!(written.members[0].force, 1_000.0, max_relative = 1.0e-9);
}

#[test]
fn model_written_back_solves_identically() {
    let mut original = TrussProject::from_json_file(demo_path()).expect("demo project loads");
    let dir = tempdir().expect("scratch directory");
    let path = dir.path().join("input.json");
    original.write_input(&path).expect("input is written");
    let mut reloaded = TrussProject::from_json_file(&path).expect("written input loads");

    let first = original.solve().expect("solves").clone();
    let second = reloaded.solve().expect("solves").clone();
    assert_eq!(first, second);
}

#[test]
fn unsolved_project_writes_nothing() {
    let project = TrussProject::from_json_file(demo_path()).expect("demo project loads");
    let dir = tempdir().expect("scratch directory");
    let path = dir.path().join("unsolved.json");
    let error = project.write_results(&path).expect_err("nothing solved yet");
    assert!(matches!(
        error,
        ProjectError::Solution(SolutionError::OutOfSequence { .. })
    ));
    assert!(!path.exists());
}

#[test]
fn mechanism_in_project_file_is_reported() {
    let text = r#"{
        "nodes": [
            {"id": 1, "x": 0.0, "y": 0.0},
            {"id": 2, "x": 1.0, "y": 0.0},
            {"id": 3, "x": 1.0, "y": 1.0}
        ],
        "elements": [
            {"id": 1, "start": 1, "end": 2, "area": 1.0, "modulus": 1.0},
            {"id": 2, "start": 2, "end": 3, "area": 1.0, "modulus": 1.0}
        ],
        "supports": [{"type": "pin", "node": 1}],
        "forces": [{"node": 3, "fx": 1.0}]
    }"#;
    let mut project = TrussProject::from_json(text).expect("valid project");
    let error = project.solve().expect_err("hinged chain is a mechanism");
    let ProjectError::Solution(SolutionError::SingularStiffness { unconstrained, .. }) = error
    else {
        panic!("expected a singular stiffness error, got {error}");
    };
    assert!(!unconstrained.is_empty());
    assert!(project.solution().is_none());
}
