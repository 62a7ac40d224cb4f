/// The rasterizer: transform state, color and depth buffers, and the draw loop.
use bitflags::bitflags;
use nalgebra::{Matrix4, Point2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::buffer::{DepthBuffer, FrameBuffer};
use crate::error::{RasterError, Result};
use crate::geometry::{ColorHandle, GeometryStore, IndexHandle, PositionHandle};
use crate::projection::{perspective_divide, Viewport};
use crate::transform::Transform;
use crate::triangle::{clip_segment, line_pixels, EdgeTriangle, ScreenVertex};

bitflags! {
    /// Buffers selected by [`Rasterizer::clear`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Buffers: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
    }
}

/// How `draw` turns index triples into pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    /// Outline of each triangle's three edges.
    Line,
    #[default]
    Triangle,
}

/// How vertex colors are blended across a triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Barycentric weights taken straight from screen space.
    Linear,
    /// Screen weights divided by clip-space w, then renormalized.
    #[default]
    PerspectiveCorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Uninitialized,
    Cleared,
    /// Number of primitives drawn since the last clear.
    Drawn(usize),
}

/// Counters returned by a single `draw` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Triangles named by the index list.
    pub triangles: usize,
    /// Triangles skipped as degenerate, non-finite, crossing the eye plane
    /// or back-facing.
    pub culled: usize,
    /// Pixels covered inside the depth range.
    pub fragments: usize,
    /// Pixels that passed the depth test.
    pub written: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterizerConfig {
    pub width: u32,
    pub height: u32,
    /// Color written by `clear`, channels 0–255.
    pub background: Vector3<f32>,
    /// Color used when `draw` gets no color handle.
    pub fallback_color: Vector3<f32>,
    pub interpolation: Interpolation,
    /// Skip triangles that are clockwise in NDC.
    pub cull_back_faces: bool,
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        Self {
            width: 700,
            height: 700,
            background: Vector3::zeros(),
            fallback_color: Vector3::new(255.0, 255.0, 255.0),
            interpolation: Interpolation::default(),
            cull_back_faces: false,
        }
    }
}

impl RasterizerConfig {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

/// Software rasterizer with a per-pixel depth test.
///
/// Buffers are allocated once in [`Rasterizer::new`]. A frame is produced by
/// `clear`, setting the three matrices, and one or more `draw` calls; draws
/// within a frame share the depth buffer, so occlusion does not depend on
/// submission order.
pub struct Rasterizer {
    config: RasterizerConfig,
    model: Matrix4<f32>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    frame: FrameBuffer,
    depth: DepthBuffer,
    state: FrameState,
}

impl Rasterizer {
    pub fn new(config: RasterizerConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(RasterError::InvalidDimensions { width: config.width, height: config.height });
        }
        if !config.background.iter().chain(config.fallback_color.iter()).all(|c| c.is_finite()) {
            return Err(RasterError::domain("rasterizer colors", "must be finite"));
        }

        Ok(Self {
            frame: FrameBuffer::new(config.width, config.height, config.background),
            depth: DepthBuffer::new(config.width, config.height),
            model: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            state: FrameState::Uninitialized,
            config,
        })
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn config(&self) -> &RasterizerConfig {
        &self.config
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Reset the selected buffers to the background color and/or +∞ depth.
    /// An empty mask is a no-op and leaves the frame state alone.
    pub fn clear(&mut self, mask: Buffers) {
        if mask.is_empty() {
            return;
        }
        if mask.contains(Buffers::COLOR) {
            self.frame.fill(self.config.background);
        }
        if mask.contains(Buffers::DEPTH) {
            self.depth.reset();
        }
        self.state = FrameState::Cleared;
    }

    pub fn set_model(&mut self, model: Matrix4<f32>) -> Result<()> {
        self.model = checked(model, "model")?;
        Ok(())
    }

    pub fn set_view(&mut self, view: Matrix4<f32>) -> Result<()> {
        self.view = checked(view, "view")?;
        Ok(())
    }

    pub fn set_projection(&mut self, projection: Matrix4<f32>) -> Result<()> {
        self.projection = checked(projection, "projection")?;
        Ok(())
    }

    pub fn model(&self) -> &Matrix4<f32> {
        &self.model
    }

    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth
    }

    /// Rasterize every triangle named by `indices`.
    ///
    /// Handles, index ranges and color counts are all validated before any
    /// pixel is touched, so a failing call leaves both buffers unchanged.
    /// Degenerate or non-finite triangles are skipped and counted in
    /// [`DrawStats::culled`].
    pub fn draw(
        &mut self,
        store: &GeometryStore,
        positions: PositionHandle,
        indices: IndexHandle,
        colors: Option<ColorHandle>,
        primitive: Primitive,
    ) -> Result<DrawStats> {
        let positions = store.positions(positions)?;
        let triangles = store.indices(indices)?;
        let colors = match colors {
            Some(handle) => {
                let colors = store.colors(handle)?;
                if colors.len() != positions.len() {
                    return Err(RasterError::ColorCountMismatch {
                        colors: colors.len(),
                        positions: positions.len(),
                    });
                }
                Some(colors)
            }
            None => None,
        };
        for (triangle, indices) in triangles.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i >= positions.len()) {
                return Err(RasterError::IndexOutOfRange {
                    triangle,
                    index,
                    positions: positions.len(),
                });
            }
        }

        if self.state == FrameState::Uninitialized {
            warn!("drawing before the first clear");
        }

        let mvp = Transform::mvp(&self.model, &self.view, &self.projection);
        let viewport = Viewport::new(self.config.width, self.config.height);
        let fallback = self.config.fallback_color;

        let mut stats = DrawStats::default();
        for indices in triangles {
            stats.triangles += 1;

            let vertices = indices.map(|i| {
                let clip = mvp * positions[i].to_homogeneous();
                let screen = viewport.to_screen(&perspective_divide(&clip));
                ScreenVertex {
                    position: Point2::new(screen.x, screen.y),
                    depth: screen.z,
                    w: clip.w,
                    color: colors.map_or(fallback, |c| c[i]),
                }
            });

            let drawn = match primitive {
                Primitive::Triangle => self.fill_triangle(vertices, &mut stats),
                Primitive::Line => self.outline_triangle(vertices, &mut stats),
            };
            if !drawn {
                stats.culled += 1;
            }
        }

        let drawn = stats.triangles - stats.culled;
        self.state = match self.state {
            FrameState::Drawn(n) => FrameState::Drawn(n + drawn),
            _ => FrameState::Drawn(drawn),
        };

        debug!(
            triangles = stats.triangles,
            culled = stats.culled,
            fragments = stats.fragments,
            written = stats.written,
            ?primitive,
            "draw"
        );
        Ok(stats)
    }

    /// Returns false when the triangle is culled.
    fn fill_triangle(&mut self, vertices: [ScreenVertex; 3], stats: &mut DrawStats) -> bool {
        if !in_front_of_eye(&vertices) {
            return false;
        }
        let Some(triangle) = EdgeTriangle::setup(vertices) else {
            return false;
        };
        if self.config.cull_back_faces && triangle.is_back_facing() {
            return false;
        }
        let Some(bbox) = triangle.bounding_box(self.config.width, self.config.height) else {
            return true;
        };

        let width = self.config.width as usize;
        for y in bbox.min_y..=bbox.max_y {
            for x in bbox.min_x..=bbox.max_x {
                let Some(weights) = triangle.pixel_weights(x, y) else {
                    continue;
                };
                let depth = triangle.depth_at(&weights);
                if !in_depth_range(depth) {
                    continue;
                }
                let color = triangle.color_at(&weights, self.config.interpolation);
                if !color.iter().all(|c| c.is_finite()) {
                    continue;
                }

                stats.fragments += 1;
                let index = y as usize * width + x as usize;
                if self.depth.test_and_set(index, depth) {
                    self.frame.set(index, color);
                    stats.written += 1;
                }
            }
        }
        true
    }

    /// Draw the three edges of a triangle; returns false when culled.
    fn outline_triangle(&mut self, vertices: [ScreenVertex; 3], stats: &mut DrawStats) -> bool {
        if !in_front_of_eye(&vertices) || EdgeTriangle::setup(vertices).is_none() {
            return false;
        }
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            self.draw_segment(&vertices[a], &vertices[b], stats);
        }
        true
    }

    fn draw_segment(&mut self, a: &ScreenVertex, b: &ScreenVertex, stats: &mut DrawStats) {
        let (width, height) = (self.config.width, self.config.height);
        let Some((t0, t1)) = clip_segment(&a.position, &b.position, width, height) else {
            return;
        };
        let start = a.position + (b.position - a.position) * t0;
        let end = a.position + (b.position - a.position) * t1;
        // an endpoint clipped onto x = width or y = height belongs to the last
        // column or row, so every stepped pixel is on screen
        let last = (width as i64 - 1, height as i64 - 1);
        let pixel = |p: Point2<f32>| {
            (
                (p.x.floor() as i64).clamp(0, last.0),
                (p.y.floor() as i64).clamp(0, last.1),
            )
        };
        let (from, to) = (pixel(start), pixel(end));

        let pixels = line_pixels(from, to);
        let steps = (pixels.len() - 1).max(1) as f32;
        for (step, (x, y)) in pixels.into_iter().enumerate() {
            let t = t0 + (t1 - t0) * (step as f32 / steps);
            let depth = a.depth + (b.depth - a.depth) * t;
            if !in_depth_range(depth) {
                continue;
            }
            let color = a.color + (b.color - a.color) * t;

            stats.fragments += 1;
            let index = y as usize * width as usize + x as usize;
            if self.depth.test_and_set(index, depth) {
                self.frame.set(index, color);
                stats.written += 1;
            }
        }
    }
}

fn checked(matrix: Matrix4<f32>, which: &'static str) -> Result<Matrix4<f32>> {
    if matrix.iter().all(|v| v.is_finite()) {
        Ok(matrix)
    } else {
        Err(RasterError::NonFiniteMatrix { which })
    }
}

/// All three clip-space w values share one non-zero sign. A triangle that
/// crosses or touches the eye plane would fold over after division.
fn in_front_of_eye(vertices: &[ScreenVertex; 3]) -> bool {
    vertices.iter().all(|v| v.w > 0.0) || vertices.iter().all(|v| v.w < 0.0)
}

#[inline]
fn in_depth_range(depth: f32) -> bool {
    (-1.0..=1.0).contains(&depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use nalgebra::Point3;

    fn small() -> Rasterizer {
        Rasterizer::new(RasterizerConfig::with_size(8, 8)).unwrap()
    }

    #[test]
    fn test_rejects_zero_size() {
        let err = Rasterizer::new(RasterizerConfig::with_size(0, 10)).err().unwrap();
        assert_eq!(err, RasterError::InvalidDimensions { width: 0, height: 10 });
    }

    #[test]
    fn test_state_transitions() {
        let mut store = GeometryStore::new();
        let pos = store.register_positions(&[
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
        ]);
        let ind = store.register_indices(&[[0, 1, 2], [0, 1, 2]]);

        let mut r = small();
        assert_eq!(r.state(), FrameState::Uninitialized);
        r.clear(Buffers::all());
        assert_eq!(r.state(), FrameState::Cleared);
        r.draw(&store, pos, ind, None, Primitive::Triangle).unwrap();
        assert_eq!(r.state(), FrameState::Drawn(2));
        r.draw(&store, pos, ind, None, Primitive::Triangle).unwrap();
        assert_eq!(r.state(), FrameState::Drawn(4));
        r.clear(Buffers::COLOR);
        assert_eq!(r.state(), FrameState::Cleared);
    }

    #[test]
    fn test_empty_clear_mask_is_a_no_op() {
        let mut store = GeometryStore::new();
        let pos = store.register_positions(&[
            Point3::new(-1.0, -1.0, 0.25),
            Point3::new(1.0, -1.0, 0.25),
            Point3::new(-1.0, 1.0, 0.25),
        ]);
        let ind = store.register_indices(&[[0, 1, 2]]);

        let mut r = small();
        r.clear(Buffers::empty());
        assert_eq!(r.state(), FrameState::Uninitialized);

        r.clear(Buffers::all());
        r.draw(&store, pos, ind, None, Primitive::Triangle).unwrap();
        let frame = r.frame_buffer().clone();
        let depth = r.depth_buffer().clone();

        r.clear(Buffers::empty());
        assert_eq!(r.state(), FrameState::Drawn(1));
        assert_eq!(r.frame_buffer(), &frame);
        assert_eq!(r.depth_buffer(), &depth);
    }

    #[test]
    fn test_non_finite_matrices_are_rejected() {
        let mut r = small();
        let mut bad = Matrix4::identity();
        bad[(1, 2)] = f32::NAN;

        let err = r.set_model(bad).unwrap_err();
        assert_eq!(err, RasterError::NonFiniteMatrix { which: "model" });
        assert_eq!(err.kind(), ErrorKind::Configuration);
        bad[(1, 2)] = f32::INFINITY;
        assert!(r.set_view(bad).is_err());
        assert!(r.set_projection(bad).is_err());
        assert_eq!(r.model(), &Matrix4::identity());
    }

    #[test]
    fn test_clear_respects_mask() {
        let mut store = GeometryStore::new();
        let pos = store.register_positions(&[
            Point3::new(-1.0, -1.0, 0.5),
            Point3::new(1.0, -1.0, 0.5),
            Point3::new(-1.0, 1.0, 0.5),
        ]);
        let ind = store.register_indices(&[[0, 1, 2]]);

        let mut r = small();
        r.clear(Buffers::all());
        r.draw(&store, pos, ind, None, Primitive::Triangle).unwrap();

        r.clear(Buffers::COLOR);
        assert!(r.frame_buffer().pixels().iter().all(|p| *p == Vector3::zeros()));
        assert!(r.depth_buffer().values().iter().any(|d| (d - 0.5).abs() < 1e-6));

        r.clear(Buffers::DEPTH);
        assert!(r.depth_buffer().values().iter().all(|d| *d == f32::INFINITY));
    }

    #[test]
    fn test_outline_draws_edges_only() {
        let mut store = GeometryStore::new();
        let pos = store.register_positions(&[
            Point3::new(-0.75, 0.75, 0.0),
            Point3::new(0.75, 0.75, 0.0),
            Point3::new(-0.75, -0.75, 0.0),
        ]);
        let ind = store.register_indices(&[[0, 1, 2]]);

        let mut r = Rasterizer::new(RasterizerConfig::with_size(16, 16)).unwrap();
        r.clear(Buffers::all());
        let stats = r.draw(&store, pos, ind, None, Primitive::Line).unwrap();
        assert_eq!(stats.culled, 0);
        assert!(stats.written > 0);

        let white = Vector3::new(255.0, 255.0, 255.0);
        // screen corners at (2, 2), (14, 2), (2, 14)
        assert_eq!(r.frame_buffer().get(2, 2), Some(white));
        assert_eq!(r.frame_buffer().get(8, 2), Some(white));
        assert_eq!(r.frame_buffer().get(2, 8), Some(white));
        // interior untouched
        assert_eq!(r.frame_buffer().get(5, 5), Some(Vector3::zeros()));
    }

    #[test]
    fn test_outline_reaches_far_endpoint_on_screen_border() {
        // top edge runs from screen (0.5, 0.5) to (8, 0.5), exactly on the
        // right border; its last on-screen pixel carries the end depth
        let mut store = GeometryStore::new();
        let pos = store.register_positions(&[
            Point3::new(-0.875, 0.875, -0.5),
            Point3::new(1.0, 0.875, 0.5),
            Point3::new(-0.875, -0.875, 0.0),
        ]);
        let ind = store.register_indices(&[[0, 1, 2]]);

        let mut r = small();
        r.clear(Buffers::all());
        let stats = r.draw(&store, pos, ind, None, Primitive::Line).unwrap();
        assert_eq!(stats.culled, 0);

        let start = r.depth_buffer().get(0, 0).unwrap();
        let end = r.depth_buffer().get(7, 0).unwrap();
        assert!((start + 0.5).abs() < 1e-6, "start depth {}", start);
        assert!((end - 0.5).abs() < 1e-6, "end depth {}", end);
        // seven even steps across the depth range
        let third = r.depth_buffer().get(3, 0).unwrap();
        assert!((third - (-0.5 + 3.0 / 7.0)).abs() < 1e-5, "depth {}", third);
    }

    #[test]
    fn test_back_face_culling() {
        let mut store = GeometryStore::new();
        let pos = store.register_positions(&[
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
        ]);
        let front = store.register_indices(&[[0, 1, 2]]);
        let back = store.register_indices(&[[0, 2, 1]]);

        let mut config = RasterizerConfig::with_size(8, 8);
        config.cull_back_faces = true;
        let mut r = Rasterizer::new(config).unwrap();
        r.clear(Buffers::all());

        let stats = r.draw(&store, pos, back, None, Primitive::Triangle).unwrap();
        assert_eq!(stats.culled, 1);
        assert_eq!(stats.written, 0);
        let stats = r.draw(&store, pos, front, None, Primitive::Triangle).unwrap();
        assert_eq!(stats.culled, 0);
        assert!(stats.written > 0);
    }

    #[test]
    fn test_config_json_defaults() {
        let config: RasterizerConfig =
            serde_json::from_str(r#"{ "width": 320, "interpolation": "linear" }"#).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 700);
        assert_eq!(config.interpolation, Interpolation::Linear);
        assert_eq!(config.fallback_color, Vector3::new(255.0, 255.0, 255.0));
    }
}
