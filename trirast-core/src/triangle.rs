/// Screen-space triangle setup, coverage and interpolation.
///
/// Coverage uses edge functions evaluated at pixel centers. After setup the
/// vertices are ordered so the signed area is positive; a pixel is inside
/// when all three edge values are positive, or zero on a top or left edge.
use nalgebra::{Point2, Vector3};

use crate::rasterizer::Interpolation;

/// Below this signed area (in pixels²) a triangle is treated as degenerate.
const DEGENERATE_AREA: f32 = 1e-6;

/// Vertex after projection, perspective division and viewport mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub position: Point2<f32>,
    /// NDC depth, smaller is nearer.
    pub depth: f32,
    /// Clip-space w, kept for perspective-correct interpolation.
    pub w: f32,
    pub color: Vector3<f32>,
}

impl ScreenVertex {
    fn is_finite(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.depth.is_finite()
            && self.w.is_finite()
    }
}

/// Inclusive pixel range touched by a primitive, already clamped to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

/// Signed doubled area of (a, b, p); positive when p lies on the interior
/// side of a→b for a positively wound triangle.
#[inline]
pub fn edge_function(a: &Point2<f32>, b: &Point2<f32>, p: &Point2<f32>) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Top-left rule for an edge a→b of a positively wound triangle on a y-down
/// screen: horizontal edges with the interior below them, or edges with the
/// interior to their right.
#[inline]
fn is_top_left(a: &Point2<f32>, b: &Point2<f32>) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dy == 0.0 && dx > 0.0) || dy < 0.0
}

#[inline]
fn covers(value: f32, top_left: bool) -> bool {
    value > 0.0 || (value == 0.0 && top_left)
}

/// A triangle ready for rasterization
#[derive(Debug, Clone)]
pub struct EdgeTriangle {
    vertices: [ScreenVertex; 3],
    area: f32,
    /// Tie-break flag of the edge opposite each vertex.
    top_left: [bool; 3],
    back_facing: bool,
}

impl EdgeTriangle {
    /// Returns `None` for non-finite or zero-area input.
    pub fn setup(vertices: [ScreenVertex; 3]) -> Option<Self> {
        if !vertices.iter().all(ScreenVertex::is_finite) {
            return None;
        }

        let [a, b, c] = vertices;
        let area = edge_function(&a.position, &b.position, &c.position);
        if !area.is_finite() || area.abs() < DEGENERATE_AREA {
            return None;
        }

        // Counter-clockwise in NDC turns into negative area once y points down.
        let back_facing = area > 0.0;
        let (vertices, area) = if area < 0.0 { ([a, c, b], -area) } else { ([a, b, c], area) };
        let [p0, p1, p2] = vertices.map(|v| v.position);

        Some(Self {
            vertices,
            area,
            top_left: [
                is_top_left(&p1, &p2),
                is_top_left(&p2, &p0),
                is_top_left(&p0, &p1),
            ],
            back_facing,
        })
    }

    pub fn is_back_facing(&self) -> bool {
        self.back_facing
    }

    /// Pixel bounding box clamped to a `width × height` target, `None` when
    /// the triangle lies entirely outside it.
    pub fn bounding_box(&self, width: u32, height: u32) -> Option<BoundingBox> {
        let xs = self.vertices.map(|v| v.position.x);
        let ys = self.vertices.map(|v| v.position.y);

        let min_x = xs[0].min(xs[1]).min(xs[2]).floor().max(0.0);
        let max_x = xs[0].max(xs[1]).max(xs[2]).ceil().min(width as f32 - 1.0);
        let min_y = ys[0].min(ys[1]).min(ys[2]).floor().max(0.0);
        let max_y = ys[0].max(ys[1]).max(ys[2]).ceil().min(height as f32 - 1.0);

        if min_x > max_x || min_y > max_y {
            return None;
        }

        Some(BoundingBox {
            min_x: min_x as u32,
            min_y: min_y as u32,
            max_x: max_x as u32,
            max_y: max_y as u32,
        })
    }

    /// Barycentric weights of `p` if the triangle covers it.
    ///
    /// Weights are each in [0, 1] and sum to 1. NaN input is never covered.
    pub fn barycentric(&self, p: &Point2<f32>) -> Option<Vector3<f32>> {
        let [p0, p1, p2] = self.vertices.map(|v| v.position);
        let w0 = edge_function(&p1, &p2, p);
        let w1 = edge_function(&p2, &p0, p);
        let w2 = edge_function(&p0, &p1, p);

        if covers(w0, self.top_left[0]) && covers(w1, self.top_left[1]) && covers(w2, self.top_left[2]) {
            Some(Vector3::new(w0, w1, w2) / self.area)
        } else {
            None
        }
    }

    /// Sample-center barycentric weights for pixel (x, y).
    pub fn pixel_weights(&self, x: u32, y: u32) -> Option<Vector3<f32>> {
        self.barycentric(&Point2::new(x as f32 + 0.5, y as f32 + 0.5))
    }

    /// NDC depth is affine in screen space, so plain barycentric weights are exact.
    pub fn depth_at(&self, weights: &Vector3<f32>) -> f32 {
        weights.x * self.vertices[0].depth
            + weights.y * self.vertices[1].depth
            + weights.z * self.vertices[2].depth
    }

    pub fn color_at(&self, weights: &Vector3<f32>, interpolation: Interpolation) -> Vector3<f32> {
        let [c0, c1, c2] = self.vertices.map(|v| v.color);
        if c0 == c1 && c1 == c2 {
            // flat: skip the blend so uniform triangles stay exact
            return c0;
        }

        let weights = match interpolation {
            Interpolation::Linear => *weights,
            Interpolation::PerspectiveCorrect => {
                let scaled = Vector3::new(
                    weights.x / self.vertices[0].w,
                    weights.y / self.vertices[1].w,
                    weights.z / self.vertices[2].w,
                );
                scaled / scaled.sum()
            }
        };

        c0 * weights.x + c1 * weights.y + c2 * weights.z
    }
}

/// Clip the segment a→b against `[0, width] × [0, height]` (Liang–Barsky).
/// Returns the surviving parameter range `(t0, t1)` within [0, 1].
pub fn clip_segment(a: &Point2<f32>, b: &Point2<f32>, width: u32, height: u32) -> Option<(f32, f32)> {
    let d = b - a;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    let checks = [
        (-d.x, a.x),
        (d.x, width as f32 - a.x),
        (-d.y, a.y),
        (d.y, height as f32 - a.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    if t0.is_finite() && t1.is_finite() {
        Some((t0, t1))
    } else {
        None
    }
}

/// Pixels on the line between two pixel coordinates via Bresenham's
/// algorithm, in order from `from` to `to` inclusive.
pub fn line_pixels(from: (i64, i64), to: (i64, i64)) -> Vec<(i64, i64)> {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut error = dx + dy;

    let mut pixels = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        pixels.push((x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * error;
        if e2 >= dy {
            error += dy;
            x0 += sx;
        }
        if e2 <= dx {
            error += dx;
            y0 += sy;
        }
    }
    pixels
}
