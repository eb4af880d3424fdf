//! Human-readable reports and the JSON result document.

use std::fmt::Write;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::conditions::{Displacements, Support};
use crate::errors::{FormatSpecError, ProjectError, SolutionError};
use crate::mesh::Mesh;
use crate::solution::Solution;

/// Numeric format used in reports, written like `.3g`, `.2f` or `.4e`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    /// Significant digits, switching to scientific notation for very large or
    /// small magnitudes.
    Significant(usize),
    /// Fixed number of decimals.
    Fixed(usize),
    /// Scientific notation with a fixed number of mantissa decimals.
    Scientific(usize),
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat::Significant(3)
    }
}

impl FromStr for NumberFormat {
    type Err = FormatSpecError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let error = || FormatSpecError(spec.to_owned());
        let body = spec.strip_prefix('.').unwrap_or(spec);
        let kind = body.chars().last().ok_or_else(error)?;
        let digits = &body[..body.len() - kind.len_utf8()];
        let precision = if digits.is_empty() {
            6
        } else {
            digits.parse().map_err(|_| error())?
        };
        match kind {
            'g' => Ok(NumberFormat::Significant(precision)),
            'f' => Ok(NumberFormat::Fixed(precision)),
            'e' => Ok(NumberFormat::Scientific(precision)),
            _ => Err(error()),
        }
    }
}

impl NumberFormat {
    /// Format `value`.
    ///
    /// # Examples
    /// ```
    /// use trussx2d::NumberFormat;
    ///
    /// let format = NumberFormat::Significant(3);
    /// assert_eq!(format.format(750.0), "750");
    /// assert_eq!(format.format(-1250.0), "-1.25e+03");
    /// assert_eq!(format.format(0.0012345), "0.00123");
    /// ```
    #[must_use]
    pub fn format(self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        // Avoid printing "-0".
        let value = if value == 0.0 { 0.0 } else { value };
        match self {
            NumberFormat::Fixed(decimals) => format!("{value:.decimals$}"),
            NumberFormat::Scientific(decimals) => {
                let rounded = format!("{value:.decimals$e}");
                let (mantissa, exponent) = split_exponent(&rounded);
                format!("{mantissa}{}", exponent_suffix(exponent))
            }
            NumberFormat::Significant(digits) => {
                let digits = digits.max(1);
                let rounded = format!("{:.*e}", digits - 1, value);
                let (mantissa, exponent) = split_exponent(&rounded);
                if exponent < -4 || exponent >= digits as i32 {
                    format!(
                        "{}{}",
                        trim_fraction(mantissa),
                        exponent_suffix(exponent)
                    )
                } else {
                    let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
                    trim_fraction(&format!("{value:.decimals$}")).to_owned()
                }
            }
        }
    }
}

/// Split Rust's `1.25e3` notation into mantissa and exponent.
fn split_exponent(text: &str) -> (&str, i32) {
    match text.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse().unwrap_or(0)),
        None => (text, 0),
    }
}

/// Exponent written as `e+03` / `e-05`.
fn exponent_suffix(exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("e{sign}{:02}", exponent.abs())
}

/// Drop trailing zeros after the decimal point.
fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Render support reactions, pinned nodes first, as `(fx, fy)` with magnitude.
///
/// # Errors
///
/// Returns [`SolutionError::OutOfSequence`] when reactions have not been solved.
pub fn render_reactions(
    displacements: &Displacements,
    solution: &Solution,
    format: NumberFormat,
) -> Result<String, SolutionError> {
    let reactions = solution.global_reactions()?;
    let mut output = String::new();
    output.push_str("Reaction forces:\n");

    let groups = [
        ("Pinned Nodes", displacements.pin_nodes(), 0),
        (
            "Roller Nodes",
            displacements.roller_nodes(),
            displacements.number_pin(),
        ),
    ];
    for (title, nodes, offset) in groups {
        writeln!(&mut output, "|- {title}:").expect("writing to string cannot fail");
        for (i, node) in nodes.into_iter().enumerate() {
            let f_x = reactions[(0, offset + i)];
            let f_y = reactions[(1, offset + i)];
            writeln!(
                &mut output,
                "|   |- Node {node} = ({}, {})    | mag: {}",
                format.format(f_x),
                format.format(f_y),
                format.format(f_x.hypot(f_y))
            )
            .expect("writing to string cannot fail");
        }
    }
    Ok(output)
}

/// Render the axial force of every rod, tension positive.
///
/// # Errors
///
/// Returns [`SolutionError::OutOfSequence`] when member forces have not been solved.
pub fn render_rod_forces(
    mesh: &Mesh,
    solution: &Solution,
    format: NumberFormat,
) -> Result<String, SolutionError> {
    let forces = solution.element_force()?;
    let mut output = String::from("Rods forces:\n");
    for (element, force) in mesh.elements().iter().zip(forces.iter()) {
        writeln!(
            &mut output,
            "|   |- Rod {} = {}",
            element.id,
            format.format(*force)
        )
        .expect("writing to string cannot fail");
    }
    Ok(output)
}

/// Kind of support in the result document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportKind {
    /// Pinned node.
    Pin,
    /// Roller node.
    Roller,
}

/// Displacement of one node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    /// Node identifier.
    pub node: usize,
    /// X displacement.
    pub ux: f64,
    /// Y displacement.
    pub uy: f64,
}

/// Reaction at one support.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactionResult {
    /// Node identifier.
    pub node: usize,
    /// Support kind.
    pub support: SupportKind,
    /// X component.
    pub fx: f64,
    /// Y component.
    pub fy: f64,
    /// Magnitude of the reaction.
    pub magnitude: f64,
}

/// Axial response of one member.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberResult {
    /// Element identifier.
    pub element: usize,
    /// Axial force, tension positive.
    pub force: f64,
    /// Axial stress, tension positive.
    pub stress: f64,
}

/// Complete results of a solve in a re-loadable form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    /// Nodal displacements in node order.
    pub displacements: Vec<NodeResult>,
    /// Reactions, pinned nodes first.
    pub reactions: Vec<ReactionResult>,
    /// Member forces in element order.
    pub members: Vec<MemberResult>,
}

impl ResultsDocument {
    /// Collect the results of a fully solved model.
    ///
    /// # Errors
    ///
    /// Returns [`SolutionError::OutOfSequence`] unless member forces have been solved.
    pub fn new(
        mesh: &Mesh,
        displacements: &Displacements,
        solution: &Solution,
    ) -> Result<Self, SolutionError> {
        let forces = solution.element_force()?;
        let stresses = solution.element_stress()?;
        let reactions = solution.global_reactions()?;
        let nodal = solution.displacements()?;

        let displacements_out = mesh
            .nodes()
            .iter()
            .map(|node| NodeResult {
                node: node.id,
                ux: nodal[2 * (node.id - 1)],
                uy: nodal[2 * (node.id - 1) + 1],
            })
            .collect();
        let reactions_out = displacements
            .supports()
            .enumerate()
            .map(|(column, entry)| {
                let fx = reactions[(0, column)];
                let fy = reactions[(1, column)];
                ReactionResult {
                    node: entry.node,
                    support: match entry.support {
                        Support::Pinned { .. } => SupportKind::Pin,
                        Support::Roller { .. } => SupportKind::Roller,
                    },
                    fx,
                    fy,
                    magnitude: fx.hypot(fy),
                }
            })
            .collect();
        let members = mesh
            .elements()
            .iter()
            .zip(forces.iter().zip(stresses.iter()))
            .map(|(element, (&force, &stress))| MemberResult {
                element: element.id,
                force,
                stress,
            })
            .collect();

        Ok(Self {
            displacements: displacements_out,
            reactions: reactions_out,
            members,
        })
    }

    /// Write the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Io`] or [`ProjectError::Json`] when writing fails.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Read a document written by [`ResultsDocument::write`].
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Io`] or [`ProjectError::Json`] when reading fails.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
