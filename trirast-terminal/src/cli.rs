/// Command-line parsing.
///
/// ```text
/// trirast [-r <angle> [file]] [--axis x|y|z] [--scene <name>]
///         [--config file.json] [--wireframe] [file]
/// ```
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use trirast_core::Primitive;

use crate::config::{AppConfig, Axis};
use crate::scene::SceneKind;

pub const USAGE: &str = "usage: trirast [-r <angle> [file]] [--axis x|y|z] \
[--scene triangle|pair|cube|scatter] [--config file.json] [--wireframe] [file]";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub angle: Option<f32>,
    pub output: Option<String>,
    pub config_path: Option<PathBuf>,
    pub axis: Option<Axis>,
    pub scene: Option<SceneKind>,
    pub wireframe: bool,
    pub help: bool,
}

impl CliArgs {
    /// `-r` or an output file means render once and exit.
    pub fn single_frame(&self) -> bool {
        self.angle.is_some() || self.output.is_some()
    }

    /// Overlay command-line values on a loaded config.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(angle) = self.angle {
            config.angle_degrees = angle;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(axis) = self.axis {
            config.axis = axis;
        }
        if let Some(scene) = self.scene {
            config.scene = scene;
        }
        if self.wireframe {
            config.primitive = Primitive::Line;
        }
    }
}

/// Parse arguments, excluding the program name.
pub fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-r" => {
                let value = iter.next().ok_or_else(|| anyhow!("-r needs an angle"))?;
                let angle: f32 = value
                    .parse()
                    .with_context(|| format!("invalid angle {value:?}"))?;
                parsed.angle = Some(angle);
                if let Some(next) = iter.peek() {
                    if !next.starts_with('-') {
                        parsed.output = iter.next().cloned();
                    }
                }
            }
            "--axis" => {
                let value = iter.next().ok_or_else(|| anyhow!("--axis needs x, y or z"))?;
                parsed.axis =
                    Some(Axis::parse(value).ok_or_else(|| anyhow!("unknown axis {value:?}"))?);
            }
            "--scene" => {
                let value = iter.next().ok_or_else(|| anyhow!("--scene needs a name"))?;
                parsed.scene =
                    Some(SceneKind::parse(value).ok_or_else(|| anyhow!("unknown scene {value:?}"))?);
            }
            "--config" => {
                let value = iter.next().ok_or_else(|| anyhow!("--config needs a path"))?;
                parsed.config_path = Some(PathBuf::from(value));
            }
            "--wireframe" => parsed.wireframe = true,
            "-h" | "--help" => parsed.help = true,
            other if other.starts_with('-') => bail!("unknown option {other:?}\n{USAGE}"),
            file => {
                if parsed.output.is_some() {
                    bail!("more than one output file given\n{USAGE}");
                }
                parsed.output = Some(file.to_string());
            }
        }
    }

    Ok(parsed)
}
