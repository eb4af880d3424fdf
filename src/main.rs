use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use trussx2d::{NumberFormat, TrussProject};

/// Solve a planar truss described in a JSON project file.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Project file with nodes, elements, supports and loads.
    input: PathBuf,

    /// Write displacements, reactions and member forces to this JSON file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number format for the printed reports, e.g. `.3g`, `.2f` or `.4e`.
    #[arg(short, long, default_value = ".3g")]
    format: NumberFormat,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut project = TrussProject::from_json_file(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    // Assemble K, partition it by support and solve the reduced system. See
    // https://en.wikipedia.org/wiki/Direct_stiffness_method.
    project.solve().context("analysis failed")?;

    print!("{}", project.report_reactions(args.format)?);
    print!("{}", project.report_rod_forces(args.format)?);

    if let Some(output) = &args.output {
        project
            .write_results(output)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    Ok(())
}
