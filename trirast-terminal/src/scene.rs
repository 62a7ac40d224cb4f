/// Demo scenes and per-frame rendering.
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use trirast_core::numerics::RandomFloat;
use trirast_core::{
    Buffers, Camera, DrawStats, GeometryStore, Mesh, MeshHandles, Primitive, RasterError,
    Rasterizer, RotationState,
};

const SCATTER_TRIANGLES: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// One uncolored triangle at z = -2.
    #[default]
    Triangle,
    /// Two colored triangles, one partly behind the other.
    Pair,
    Cube,
    /// Random triangles from a seeded generator.
    Scatter,
}

impl SceneKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "triangle" => Some(SceneKind::Triangle),
            "pair" => Some(SceneKind::Pair),
            "cube" => Some(SceneKind::Cube),
            "scatter" => Some(SceneKind::Scatter),
            _ => None,
        }
    }

    pub fn mesh(self, seed: u64, fallback: Vector3<f32>) -> Mesh {
        match self {
            SceneKind::Triangle => {
                let mut mesh = Mesh::new();
                mesh.push_triangle(
                    [
                        Point3::new(2.0, 0.0, -2.0),
                        Point3::new(0.0, 2.0, -2.0),
                        Point3::new(-2.0, 0.0, -2.0),
                    ],
                    None,
                    fallback,
                );
                mesh
            }
            SceneKind::Pair => {
                let mut mesh = Mesh::new();
                mesh.push_triangle(
                    [
                        Point3::new(2.0, 0.0, -2.0),
                        Point3::new(0.0, 2.0, -2.0),
                        Point3::new(-2.0, 0.0, -2.0),
                    ],
                    Some(Vector3::new(217.0, 238.0, 185.0)),
                    fallback,
                );
                mesh.push_triangle(
                    [
                        Point3::new(3.5, -1.0, -5.0),
                        Point3::new(2.5, 1.5, -5.0),
                        Point3::new(-1.0, 0.5, -5.0),
                    ],
                    Some(Vector3::new(185.0, 217.0, 238.0)),
                    fallback,
                );
                mesh
            }
            SceneKind::Cube => Mesh::cube(2.0),
            SceneKind::Scatter => scatter(&mut RandomFloat::from_seed(seed), fallback),
        }
    }
}

fn scatter(rng: &mut RandomFloat, fallback: Vector3<f32>) -> Mesh {
    let mut mesh = Mesh::new();
    for _ in 0..SCATTER_TRIANGLES {
        let z = rng.next_in(-6.0, -1.0);
        let mut corner = || Point3::new(rng.next_in(-3.0, 3.0), rng.next_in(-3.0, 3.0), z);
        let vertices = [corner(), corner(), corner()];
        let color = Vector3::new(
            rng.next_in(40.0, 255.0),
            rng.next_in(40.0, 255.0),
            rng.next_in(40.0, 255.0),
        );
        mesh.push_triangle(vertices, Some(color), fallback);
    }
    mesh
}

/// Geometry registered once, redrawn every frame.
pub struct Scene {
    store: GeometryStore,
    handles: MeshHandles,
    triangles: usize,
}

impl Scene {
    pub fn new(kind: SceneKind, seed: u64, fallback: Vector3<f32>) -> Self {
        let mesh = kind.mesh(seed, fallback);
        let mut store = GeometryStore::new();
        let handles = mesh.register(&mut store);
        Self {
            store,
            handles,
            triangles: mesh.triangle_count(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles
    }

    /// Clear, load the three matrices and draw the scene.
    pub fn render(
        &self,
        rasterizer: &mut Rasterizer,
        camera: &Camera,
        rotation: &RotationState,
        primitive: Primitive,
    ) -> Result<DrawStats, RasterError> {
        rasterizer.clear(Buffers::COLOR | Buffers::DEPTH);
        rasterizer.set_model(rotation.model_matrix()?)?;
        rasterizer.set_view(camera.view_matrix()?)?;
        rasterizer.set_projection(camera.projection_matrix()?)?;
        rasterizer.draw(
            &self.store,
            self.handles.positions,
            self.handles.indices,
            self.handles.colors,
            primitive,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trirast_core::RasterizerConfig;

    fn white() -> Vector3<f32> {
        Vector3::new(255.0, 255.0, 255.0)
    }

    #[test]
    fn test_single_triangle_renders_fallback_color() {
        let scene = Scene::new(SceneKind::Triangle, 0, white());
        let mut r = Rasterizer::new(RasterizerConfig::with_size(70, 70)).unwrap();
        let stats = scene
            .render(&mut r, &Camera::new(70, 70), &RotationState::zero(), Primitive::Triangle)
            .unwrap();
        assert_eq!(stats.triangles, 1);
        assert!(stats.written > 0);
        // apex projects above the center row, the base edge onto it
        assert_eq!(r.frame_buffer().get(35, 30), Some(white()));
        assert_eq!(r.frame_buffer().get(35, 40), Some(Vector3::zeros()));
    }

    #[test]
    fn test_pair_near_triangle_wins_overlap() {
        let scene = Scene::new(SceneKind::Pair, 0, white());
        let mut r = Rasterizer::new(RasterizerConfig::with_size(140, 140)).unwrap();
        let stats = scene
            .render(&mut r, &Camera::new(140, 140), &RotationState::zero(), Primitive::Triangle)
            .unwrap();
        assert_eq!(stats.triangles, 2);
        assert!(stats.fragments > stats.written);

        let pixels = r.frame_buffer().pixels();
        let green = Vector3::new(217.0, 238.0, 185.0);
        let blue = Vector3::new(185.0, 217.0, 238.0);
        assert!(pixels.iter().any(|p| *p == green));
        assert!(pixels.iter().any(|p| *p == blue));
    }

    #[test]
    fn test_scatter_is_reproducible() {
        let a = SceneKind::Scatter.mesh(9, white());
        let b = SceneKind::Scatter.mesh(9, white());
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.triangle_count(), SCATTER_TRIANGLES);
        assert_eq!(a.colors.as_ref().map(Vec::len), Some(3 * SCATTER_TRIANGLES));
    }

    #[test]
    fn test_rotation_about_axis_moves_pixels() {
        let scene = Scene::new(SceneKind::Triangle, 0, white());
        let camera = Camera::new(70, 70);
        let mut r = Rasterizer::new(RasterizerConfig::with_size(70, 70)).unwrap();

        scene.render(&mut r, &camera, &RotationState::zero(), Primitive::Triangle).unwrap();
        let still = r.frame_buffer().clone();
        let turned = RotationState::new(90.0, Vector3::z());
        scene.render(&mut r, &camera, &turned, Primitive::Triangle).unwrap();
        assert_ne!(r.frame_buffer(), &still);
    }
}
