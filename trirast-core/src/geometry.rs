/// Geometry store: vertex positions, triangle indices and vertex colors
/// registered once and referenced by opaque handles.
use nalgebra::{Point3, Vector3};

use crate::error::{HandleKind, RasterError, Result};

/// Handle to a registered list of vertex positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionHandle(usize);

/// Handle to a registered list of index triples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexHandle(usize);

/// Handle to a registered list of vertex colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorHandle(usize);

/// Owns every list registered with it. Nothing is ever removed or mutated;
/// registering the same data twice yields two independent handles.
#[derive(Debug, Default)]
pub struct GeometryStore {
    positions: Vec<Vec<Point3<f32>>>,
    indices: Vec<Vec<[usize; 3]>>,
    colors: Vec<Vec<Vector3<f32>>>,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_positions(&mut self, positions: &[Point3<f32>]) -> PositionHandle {
        self.positions.push(positions.to_vec());
        PositionHandle(self.positions.len() - 1)
    }

    /// Index triples are checked against a position list only at draw time.
    pub fn register_indices(&mut self, indices: &[[usize; 3]]) -> IndexHandle {
        self.indices.push(indices.to_vec());
        IndexHandle(self.indices.len() - 1)
    }

    /// Colors use the 0–255 range per channel.
    pub fn register_colors(&mut self, colors: &[Vector3<f32>]) -> ColorHandle {
        self.colors.push(colors.to_vec());
        ColorHandle(self.colors.len() - 1)
    }

    pub fn positions(&self, handle: PositionHandle) -> Result<&[Point3<f32>]> {
        self.positions
            .get(handle.0)
            .map(Vec::as_slice)
            .ok_or(RasterError::UnknownHandle { kind: HandleKind::Positions, id: handle.0 })
    }

    pub fn indices(&self, handle: IndexHandle) -> Result<&[[usize; 3]]> {
        self.indices
            .get(handle.0)
            .map(Vec::as_slice)
            .ok_or(RasterError::UnknownHandle { kind: HandleKind::Indices, id: handle.0 })
    }

    pub fn colors(&self, handle: ColorHandle) -> Result<&[Vector3<f32>]> {
        self.colors
            .get(handle.0)
            .map(Vec::as_slice)
            .ok_or(RasterError::UnknownHandle { kind: HandleKind::Colors, id: handle.0 })
    }
}

/// Handles produced by registering a [`Mesh`]
#[derive(Debug, Clone, Copy)]
pub struct MeshHandles {
    pub positions: PositionHandle,
    pub indices: IndexHandle,
    pub colors: Option<ColorHandle>,
}

/// Indexed triangle mesh with optional per-vertex colors
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Point3<f32>>,
    pub indices: Vec<[usize; 3]>,
    pub colors: Option<Vec<Vector3<f32>>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Append a triangle with its own three vertices.
    ///
    /// Colors are kept one-to-one with positions: once any triangle carries a
    /// color, earlier uncolored vertices get `fallback`.
    pub fn push_triangle(
        &mut self,
        vertices: [Point3<f32>; 3],
        color: Option<Vector3<f32>>,
        fallback: Vector3<f32>,
    ) {
        let base = self.positions.len();
        self.positions.extend_from_slice(&vertices);
        self.indices.push([base, base + 1, base + 2]);

        if let Some(colors) = self.colors.as_mut() {
            colors.extend(std::iter::repeat(color.unwrap_or(fallback)).take(3));
        } else if let Some(color) = color {
            let mut colors = vec![fallback; base];
            colors.extend(std::iter::repeat(color).take(3));
            self.colors = Some(colors);
        }
    }

    pub fn register(&self, store: &mut GeometryStore) -> MeshHandles {
        MeshHandles {
            positions: store.register_positions(&self.positions),
            indices: store.register_indices(&self.indices),
            colors: self.colors.as_ref().map(|c| store.register_colors(c)),
        }
    }

    /// Axis-aligned cube centered on the origin with a distinct color per corner
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut positions = Vec::with_capacity(8);
        let mut colors = Vec::with_capacity(8);
        for i in 0..8usize {
            let bit = |b: usize| if i & (1 << b) != 0 { 1.0 } else { 0.0 };
            positions.push(Point3::new(
                (bit(0) * 2.0 - 1.0) * half,
                (bit(1) * 2.0 - 1.0) * half,
                (bit(2) * 2.0 - 1.0) * half,
            ));
            colors.push(Vector3::new(
                55.0 + 200.0 * bit(0),
                55.0 + 200.0 * bit(1),
                55.0 + 200.0 * bit(2),
            ));
        }

        // Counter-clockwise when seen from outside.
        let indices = vec![
            [0, 2, 3], [0, 3, 1], // -z
            [4, 5, 7], [4, 7, 6], // +z
            [0, 1, 5], [0, 5, 4], // -y
            [2, 6, 7], [2, 7, 3], // +y
            [0, 4, 6], [0, 6, 2], // -x
            [1, 3, 7], [1, 7, 5], // +x
        ];

        Self {
            positions,
            indices,
            colors: Some(colors),
        }
    }
}
