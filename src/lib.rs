//! First-person camera, transform math and mesh loading for small GPU
//! viewers.
//!
//! The crate exposes the math and loading layers as plain testable values;
//! windowing and GPU plumbing stay at the edges (the [`render`] module and
//! the demo binary) so the core remains easy to embed in headless tools.

pub mod camera;
pub mod input;
pub mod model;
pub mod obj;
pub mod render;
pub mod transform;
pub mod vertex;

pub use camera::{Camera, CameraMovement};
pub use input::{InputState, KeyCode, NamedKey};
pub use model::{Mesh, Model, Texture, TextureImage, TextureKind};
pub use obj::{load_obj_from_str, ObjMesh};
pub use render::{CameraParams, Renderer};
pub use transform::{look_at, orthographic, perspective, reflect};
pub use vertex::{unpack_vertices, LayoutError, Vertex, VertexAttribute};
