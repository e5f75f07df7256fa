//! `pips face`: show the pip layout for a face value.

use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};
use clap::Args;
use pips_core::model::face::render_grid;
use pips_core::{Face, Pip, Tier};
use serde::Serialize;
use std::io::Write;

/// Arguments for `pips face`.
#[derive(Args, Debug)]
pub struct FaceArgs {
    /// Face value (1-6).
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct FaceView {
    pub value: Face,
    pub tier: Tier,
    pub pips: Vec<Pip>,
    pub grid: [String; 3],
}

impl FaceView {
    pub fn new(face: Face) -> Self {
        Self {
            value: face,
            tier: face.tier(),
            pips: face.pips().to_vec(),
            grid: render_grid(face.get()),
        }
    }
}

pub fn run_face(args: &FaceArgs, output: OutputMode) -> anyhow::Result<()> {
    let face = match args.value.parse::<Face>() {
        Ok(face) => face,
        Err(e) => {
            render_error(
                output,
                &CliError::with_details(
                    e.to_string(),
                    "pass a whole number from 1 to 6",
                    "invalid_face",
                ),
            )?;
            anyhow::bail!(e);
        }
    };

    render_mode(
        output,
        &FaceView::new(face),
        |view, w| render_face_text(view, w),
        |view, w| render_face_human(view, w),
    )
}

fn render_face_text(view: &FaceView, w: &mut dyn Write) -> std::io::Result<()> {
    let names: Vec<&str> = view.pips.iter().map(|p| p.as_str()).collect();
    writeln!(w, "{}\t{}", view.value, names.join(","))
}

fn render_face_human(view: &FaceView, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Face {}", view.value))?;
    write_boxed_grid(w, &view.grid)?;
    let names: Vec<&str> = view.pips.iter().map(|p| p.as_str()).collect();
    pretty_kv(w, "Pips", names.join(", "))
}

/// Draw a pip grid inside a box.
pub fn write_boxed_grid(w: &mut dyn Write, grid: &[String; 3]) -> std::io::Result<()> {
    writeln!(w, "┌───────┐")?;
    for row in grid {
        writeln!(w, "│ {row} │")?;
    }
    writeln!(w, "└───────┘")
}
