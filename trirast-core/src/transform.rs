/// Model, view and projection matrix builders
///
/// All builders are pure. They reject inputs that would otherwise produce
/// NaN or infinite matrix entries.
///
/// Camera space looks down −z. `near` and `far` are passed as positive
/// distances and negated internally, so the near plane lands on NDC z = −1
/// and the far plane on NDC z = +1: smaller depth is nearer.
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::error::{RasterError, Result};
use crate::numerics::deg_to_rad;

const AXIS_NORM_TOLERANCE: f32 = 1e-4;

/// Angle/axis pair driving the model rotation between frames
#[derive(Debug, Clone, Copy)]
pub struct RotationState {
    pub angle_degrees: f32,
    pub axis: Vector3<f32>,
}

impl RotationState {
    pub fn new(angle_degrees: f32, axis: Vector3<f32>) -> Self {
        Self { angle_degrees, axis }
    }

    pub fn zero() -> Self {
        Self {
            angle_degrees: 0.0,
            axis: Vector3::z(),
        }
    }

    /// Rotate by a delta amount (in degrees)
    pub fn rotate(&mut self, delta_degrees: f32) {
        self.angle_degrees += delta_degrees;
    }

    pub fn set_axis(&mut self, axis: Vector3<f32>) {
        self.axis = axis;
    }

    /// Model matrix for the current angle and axis
    pub fn model_matrix(&self) -> Result<Matrix4<f32>> {
        Transform::rotation_axis(&self.axis, self.angle_degrees)
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Translate world space so that `eye` becomes the origin.
    pub fn view(eye: &Point3<f32>) -> Result<Matrix4<f32>> {
        if !eye.coords.iter().all(|c| c.is_finite()) {
            return Err(RasterError::domain("eye position", "must be finite"));
        }
        Ok(Matrix4::new_translation(&-eye.coords))
    }

    /// Rotation about the z axis.
    pub fn rotation_z(angle_degrees: f32) -> Result<Matrix4<f32>> {
        check_angle(angle_degrees)?;
        let (s, c) = deg_to_rad(angle_degrees).sin_cos();

        Ok(Matrix4::new(
            c, -s, 0.0, 0.0,
            s, c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ))
    }

    /// Rotation about an arbitrary unit axis (Rodrigues' formula):
    /// `R = cos θ·I + (1 − cos θ)·a·aᵀ + sin θ·[a]×`.
    ///
    /// The axis must already be normalized; anything further than
    /// 1e-4 from unit length is rejected rather than silently fixed up.
    pub fn rotation_axis(axis: &Vector3<f32>, angle_degrees: f32) -> Result<Matrix4<f32>> {
        check_angle(angle_degrees)?;
        if !axis.iter().all(|c| c.is_finite()) {
            return Err(RasterError::domain("rotation axis", "must be finite"));
        }
        let norm = axis.norm();
        if norm == 0.0 {
            return Err(RasterError::domain("rotation axis", "has zero length"));
        }
        if (norm - 1.0).abs() > AXIS_NORM_TOLERANCE {
            return Err(RasterError::domain("rotation axis", "is not a unit vector"));
        }

        let (s, c) = deg_to_rad(angle_degrees).sin_cos();
        let rotation = Matrix3::identity() * c
            + (axis * axis.transpose()) * (1.0 - c)
            + axis.cross_matrix() * s;

        Ok(rotation.to_homogeneous())
    }

    /// Perspective projection built as squish → center → scale.
    ///
    /// 1. The squish matrix maps the frustum onto a box, keeping z exact only
    ///    on the near and far planes.
    /// 2. The box is centered on the origin along z (it is already symmetric
    ///    in x and y).
    /// 3. The box is scaled onto `[-1, 1]³` using the half-height
    ///    `t = tan(fov/2)·|n|` and half-width `r = t·aspect`.
    pub fn projection(
        fov_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Result<Matrix4<f32>> {
        if !fov_degrees.is_finite() || fov_degrees <= 0.0 || fov_degrees >= 180.0 {
            return Err(RasterError::domain("field of view", "must lie in (0, 180) degrees"));
        }
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(RasterError::domain("aspect ratio", "must be positive"));
        }
        if !near.is_finite() || !far.is_finite() || near <= 0.0 || far <= 0.0 {
            return Err(RasterError::domain("clip planes", "near and far must be positive distances"));
        }
        if near == far {
            return Err(RasterError::domain("clip planes", "near and far coincide"));
        }
        if near > far {
            return Err(RasterError::domain("clip planes", "far must lie beyond near"));
        }

        // Camera-space positions of the planes.
        let n = -near;
        let f = -far;

        let squish = Matrix4::new(
            n, 0.0, 0.0, 0.0,
            0.0, n, 0.0, 0.0,
            0.0, 0.0, n + f, -n * f,
            0.0, 0.0, 1.0, 0.0,
        );

        let t = (deg_to_rad(fov_degrees) / 2.0).tan() * n.abs();
        let r = t * aspect_ratio;

        let center = Matrix4::new_translation(&Vector3::new(0.0, 0.0, -(n + f) / 2.0));
        // f - n is negative here, which sends the near plane to -1.
        let scale = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0 / r, 1.0 / t, 2.0 / (f - n)));

        Ok(scale * center * squish)
    }

    /// Create a model-view-projection matrix
    pub fn mvp(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

fn check_angle(angle_degrees: f32) -> Result<()> {
    if angle_degrees.is_finite() {
        Ok(())
    } else {
        Err(RasterError::domain("rotation angle", "must be finite"))
    }
}
