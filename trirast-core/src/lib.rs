/// trirast core library: matrix builders, geometry store and a depth-buffered
/// triangle rasterizer.
///
/// A frame goes through `clear`, `set_model`/`set_view`/`set_projection`,
/// one or more `draw` calls and finally `frame_buffer()`.

pub mod buffer;
pub mod error;
pub mod geometry;
pub mod numerics;
pub mod projection;
pub mod rasterizer;
pub mod transform;
pub mod triangle;

// Re-export commonly used types
pub use buffer::{rgb8, DepthBuffer, FrameBuffer};
pub use error::{ErrorKind, RasterError};
pub use geometry::{ColorHandle, GeometryStore, IndexHandle, Mesh, MeshHandles, PositionHandle};
pub use projection::{Camera, Viewport};
pub use rasterizer::{
    Buffers, DrawStats, FrameState, Interpolation, Primitive, Rasterizer, RasterizerConfig,
};
pub use transform::{RotationState, Transform};
