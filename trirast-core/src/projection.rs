/// Camera and viewport utilities
use nalgebra::{Matrix4, Point3, Vector4};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transform::Transform;

/// Camera configuration for 3D rendering
///
/// The camera sits at `eye` and looks down −z; it has no orientation of its
/// own. `near` and `far` are positive distances in front of the eye.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, 5.0),
            fov_degrees: 45.0,
            aspect: width as f32 / height as f32,
            near: 0.1,
            far: 50.0,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Result<Matrix4<f32>> {
        Transform::view(&self.eye)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Result<Matrix4<f32>> {
        Transform::projection(self.fov_degrees, self.aspect, self.near, self.far)
    }

    /// Project a world-space point to screen space: pixel x, pixel y and
    /// NDC depth.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        viewport: &Viewport,
    ) -> Result<Point3<f32>> {
        let mvp = Transform::mvp(model_matrix, &self.view_matrix()?, &self.projection_matrix()?);
        let clip = mvp * point.to_homogeneous();
        Ok(viewport.to_screen(&perspective_divide(&clip)))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(700, 700)
    }
}

/// Divide x, y and z by the homogeneous w component.
pub fn perspective_divide(clip: &Vector4<f32>) -> Point3<f32> {
    Point3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
}

/// Maps normalized device coordinates onto a `width × height` pixel grid.
///
/// x grows to the right and y grows downward: NDC (−1, 1) is the top-left
/// corner of pixel (0, 0). Depth passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn to_screen(&self, ndc: &Point3<f32>) -> Point3<f32> {
        let half_width = self.width as f32 / 2.0;
        let half_height = self.height as f32 / 2.0;
        Point3::new(
            (ndc.x + 1.0) * half_width,
            (1.0 - ndc.y) * half_height,
            ndc.z,
        )
    }
}
