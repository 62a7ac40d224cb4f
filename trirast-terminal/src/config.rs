/// Application configuration.
///
/// Every field has a default, so a JSON file only needs the values it
/// changes.

use std::fs;
use std::path::Path;

use anyhow::Context;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use trirast_core::{Camera, Primitive, RasterizerConfig, RotationState};

use crate::scene::SceneKind;

/// Canonical rotation axis selectable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    pub fn unit(self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "x" | "X" => Some(Axis::X),
            "y" | "Y" => Some(Axis::Y),
            "z" | "Z" => Some(Axis::Z),
            _ => None,
        }
    }
}

/// Root configuration for both the single-frame and interactive modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rasterizer: RasterizerConfig,
    pub camera: Camera,
    /// Initial model rotation.
    pub angle_degrees: f32,
    pub axis: Axis,
    pub scene: SceneKind,
    pub primitive: Primitive,
    /// Seed for the `scatter` scene.
    pub seed: u64,
    /// Image written in single-frame mode.
    pub output: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let rasterizer = RasterizerConfig::default();
        Self {
            camera: Camera::new(rasterizer.width, rasterizer.height),
            rasterizer,
            angle_degrees: 0.0,
            axis: Axis::Z,
            scene: SceneKind::Triangle,
            primitive: Primitive::Triangle,
            seed: 1,
            output: "output.png".to_string(),
        }
    }
}

impl AppConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn rotation(&self) -> RotationState {
        RotationState::new(self.angle_degrees, self.axis.unit())
    }
}
