use std::io::Read;
use std::path::PathBuf;

use eyre::{Context, Result};
use floppy_core::{FloppyCube, Layout, align_angle, fold_half_turns};
use floppy_prefs::Preferences;
use serde::Serialize;

use crate::script::{self, PieceReport};

/// Floppy cube command-line interface
#[derive(Debug, clap::Parser)]
#[command(version)]
pub(crate) struct Args {
    #[command(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Subcommand {
    /// Print the links and positions of every piece of the solved puzzle as
    /// JSON.
    Topology,
    /// Replay a gesture script and print the resulting puzzle state as JSON.
    Replay {
        /// Gesture script in YAML, use '-' for stdin.
        #[arg(value_parser)]
        script: clio::Input,

        /// Preferences file to layer over the defaults.
        #[arg(long)]
        prefs: Option<PathBuf>,

        /// Override the snap tolerance, in degrees.
        #[arg(long)]
        snap_tolerance: Option<f64>,
    },
    /// Fold an accumulated rotation and print the angle that would align it
    /// as JSON.
    Snap {
        /// Rotation in degrees.
        #[arg(allow_negative_numbers = true)]
        angle: f64,

        /// Snap tolerance in degrees.
        #[arg(long)]
        tolerance: Option<f64>,
    },
}

#[derive(Serialize, Debug, PartialEq)]
struct SnapReport {
    rotation: f64,
    seams: i64,
    align_angle: f64,
}
impl SnapReport {
    fn new(angle: f64, tolerance: f64) -> Self {
        let (rotation, seams) = fold_half_turns(angle);
        Self {
            rotation,
            seams,
            align_angle: align_angle(rotation, tolerance),
        }
    }
}

pub(crate) fn exec(subcommand: Subcommand) -> Result<()> {
    match subcommand {
        Subcommand::Topology => {
            let pieces = PieceReport::all(&FloppyCube::new(), &Layout::default());
            write_json_output(&pieces)
        }

        Subcommand::Replay {
            mut script,
            prefs,
            snap_tolerance,
        } => {
            let prefs = Preferences::load(prefs.as_deref());
            let mut settings = prefs.to_settings();
            if let Some(tolerance) = snap_tolerance {
                settings.snap_tolerance = tolerance;
            }

            let mut buffer = String::new();
            script
                .read_to_string(&mut buffer)
                .context("error reading gesture script")?;
            let events = script::parse_script(&buffer)?;
            log::info!("replaying {} events", events.len());

            let report = script::replay(&events, settings, prefs.interaction.arcball_radius)?;
            write_json_output(&report)
        }

        Subcommand::Snap { angle, tolerance } => {
            let tolerance = tolerance
                .unwrap_or_else(|| Preferences::load(None).interaction.snap_tolerance);
            write_json_output(&SnapReport::new(angle, tolerance))
        }
    }
}

fn write_json_output<T: Serialize>(value: &T) -> Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), value)
        .context("error serializing data and writing to stdout")?;
    println!();
    Ok(())
}
