use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::obj::ObjMesh;
use crate::vertex::{unpack_vertices, LayoutError, Vertex, VertexAttribute};

/// Semantic texture kinds, named after the sampler uniforms that consume
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureKind {
    /// Sampler name prefix used by shaders (`texture_diffuse1`, ...).
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Diffuse => "texture_diffuse",
            Self::Specular => "texture_specular",
            Self::Normal => "texture_normal",
            Self::Height => "texture_height",
        }
    }
}

/// Decoded RGBA8 bitmap, shared between every texture referencing the same
/// file so one path decodes once per model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Texture reference resolved at load time.
#[derive(Debug, Clone)]
pub struct Texture {
    pub kind: TextureKind,
    pub path: PathBuf,
    pub image: Arc<TextureImage>,
}

/// CPU-side mesh: interpreted vertices, optional indices and the textures
/// that were resolved for it.
///
/// An empty index list means the mesh is drawn non-indexed.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub textures: Vec<Texture>,
}

/// A loaded model: an ordered list of meshes plus the decode cache that
/// backs their textures.
///
/// The model owns its data for its whole lifetime; GPU-side buffers created
/// from it belong to the renderer and are released when replaced or when the
/// renderer is dropped.
#[derive(Debug, Default)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    loaded_images: HashMap<PathBuf, Arc<TextureImage>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interprets a flat scalar buffer through the declared attribute layout
    /// and registers the resulting mesh.
    ///
    /// Structural problems (row width, attribute offsets) fail the whole
    /// call before anything is registered. A texture that cannot be resolved
    /// is logged and skipped while the rest of the load proceeds.
    pub fn load_native(
        &mut self,
        cols: usize,
        attributes: &[(VertexAttribute, usize)],
        data: &[f32],
        textures: &[(TextureKind, &Path)],
        indices: &[u32],
    ) -> Result<(), LayoutError> {
        let vertices = unpack_vertices(cols, attributes, data)?;

        let mut resolved = Vec::new();
        for &(kind, path) in textures {
            match self.resolve_texture(kind, path) {
                Ok(texture) => resolved.push(texture),
                Err(err) => warn!("skipping {} texture {}: {err:#}", kind.type_name(), path.display()),
            }
        }

        self.meshes.push(Mesh {
            vertices,
            indices: indices.to_vec(),
            textures: resolved,
        });
        Ok(())
    }

    /// Parses OBJ text and registers it as one untextured mesh.
    pub fn load_obj_str(&mut self, contents: &str) -> Result<()> {
        let obj = crate::obj::load_obj_from_str(contents)?;
        self.load_native(
            ObjMesh::COLS,
            ObjMesh::layout(),
            &obj.vertices,
            &[],
            &obj.indices,
        )
        .map_err(|err| anyhow!("OBJ buffer does not match its declared layout: {err}"))
    }

    /// Reads and registers an OBJ file from disk.
    pub fn load_obj<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        self.load_obj_str(&contents)
            .with_context(|| format!("failed to parse OBJ mesh {}", path.display()))
    }

    /// Built-in unit cube used when no model file is given.
    pub fn unit_cube() -> Self {
        let mut model = Self::new();
        model
            .load_native(
                6,
                &[
                    (VertexAttribute::Position, 0),
                    (VertexAttribute::Normal, 3),
                ],
                CUBE_VERTICES,
                &[],
                CUBE_INDICES,
            )
            .expect("cube data matches its layout");
        model
    }

    /// Total vertex count across all meshes.
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.vertices.len()).sum()
    }

    /// Total index count across all meshes.
    pub fn index_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.indices.len()).sum()
    }

    fn resolve_texture(&mut self, kind: TextureKind, path: &Path) -> Result<Texture> {
        if path.is_dir() {
            return Err(anyhow!("is a directory, not a texture file"));
        }

        let image = match self.loaded_images.get(path) {
            Some(image) => Arc::clone(image),
            None => {
                let decoded = image::open(path)
                    .context("unable to decode image")?
                    .to_rgba8();
                let image = Arc::new(TextureImage {
                    width: decoded.width(),
                    height: decoded.height(),
                    pixels: decoded.into_raw(),
                });
                self.loaded_images
                    .insert(path.to_path_buf(), Arc::clone(&image));
                image
            }
        };

        Ok(Texture {
            kind,
            path: path.to_path_buf(),
            image,
        })
    }
}

// Unit cube centered on the origin, position + normal per row.
const CUBE_VERTICES: &[f32] = &[
    // positions        // normals
    -0.5, -0.5, 0.5, 0.0, 0.0, 1.0, 0.5, -0.5, 0.5, 0.0, 0.0, 1.0, 0.5, 0.5, 0.5, 0.0, 0.0, 1.0,
    -0.5, 0.5, 0.5, 0.0, 0.0, 1.0, -0.5, -0.5, -0.5, 0.0, 0.0, -1.0, 0.5, -0.5, -0.5, 0.0, 0.0,
    -1.0, 0.5, 0.5, -0.5, 0.0, 0.0, -1.0, -0.5, 0.5, -0.5, 0.0, 0.0, -1.0, -0.5, -0.5, -0.5, -1.0,
    0.0, 0.0, -0.5, -0.5, 0.5, -1.0, 0.0, 0.0, -0.5, 0.5, 0.5, -1.0, 0.0, 0.0, -0.5, 0.5, -0.5,
    -1.0, 0.0, 0.0, 0.5, -0.5, -0.5, 1.0, 0.0, 0.0, 0.5, -0.5, 0.5, 1.0, 0.0, 0.0, 0.5, 0.5, 0.5,
    1.0, 0.0, 0.0, 0.5, 0.5, -0.5, 1.0, 0.0, 0.0, -0.5, -0.5, -0.5, 0.0, -1.0, 0.0, 0.5, -0.5,
    -0.5, 0.0, -1.0, 0.0, 0.5, -0.5, 0.5, 0.0, -1.0, 0.0, -0.5, -0.5, 0.5, 0.0, -1.0, 0.0, -0.5,
    0.5, -0.5, 0.0, 1.0, 0.0, 0.5, 0.5, -0.5, 0.0, 1.0, 0.0, 0.5, 0.5, 0.5, 0.0, 1.0, 0.0, -0.5,
    0.5, 0.5, 0.0, 1.0, 0.0,
];

const CUBE_INDICES: &[u32] = &[
    0, 1, 2, 0, 2, 3, // front
    4, 6, 5, 4, 7, 6, // back
    8, 9, 10, 8, 10, 11, // left
    12, 14, 13, 12, 15, 14, // right
    16, 18, 17, 16, 19, 18, // bottom
    20, 21, 22, 20, 22, 23, // top
];

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    // Two rows: position + texcoord in a 5-wide layout.
    static SAMPLE_ROWS: Lazy<Vec<f32>> = Lazy::new(|| {
        vec![
            0.0, 0.0, 0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 1.0, 0.0,
        ]
    });

    fn sample_layout() -> [(VertexAttribute, usize); 2] {
        [
            (VertexAttribute::Position, 0),
            (VertexAttribute::TexCoord, 3),
        ]
    }

    #[test]
    fn unit_cube_has_expected_buffers() {
        let model = Model::unit_cube();
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.vertex_count(), 24);
        assert_eq!(model.index_count(), 36);
        // Normals arrived through the layout, texcoords stayed zeroed.
        let vertex = &model.meshes[0].vertices[0];
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertex.tex_coords, [0.0, 0.0]);
    }

    #[test]
    fn structural_failure_registers_nothing() {
        let mut model = Model::new();
        let err = model
            .load_native(5, &sample_layout(), &SAMPLE_ROWS[..7], &[], &[])
            .unwrap_err();
        assert!(matches!(err, LayoutError::RowWidthMismatch { .. }));
        assert!(model.meshes.is_empty());
    }

    #[test]
    fn directory_texture_is_skipped_but_mesh_loads() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = Model::new();
        model
            .load_native(
                5,
                &sample_layout(),
                &SAMPLE_ROWS,
                &[(TextureKind::Diffuse, dir.path())],
                &[],
            )
            .unwrap();
        assert_eq!(model.meshes.len(), 1);
        assert!(model.meshes[0].textures.is_empty());
    }

    #[test]
    fn duplicate_texture_paths_decode_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let mut model = Model::new();
        model
            .load_native(
                5,
                &sample_layout(),
                &SAMPLE_ROWS,
                &[
                    (TextureKind::Diffuse, path.as_path()),
                    (TextureKind::Specular, path.as_path()),
                ],
                &[],
            )
            .unwrap();

        let textures = &model.meshes[0].textures;
        assert_eq!(textures.len(), 2);
        assert_eq!(textures[0].kind.type_name(), "texture_diffuse");
        assert_eq!(textures[1].kind.type_name(), "texture_specular");
        assert!(Arc::ptr_eq(&textures[0].image, &textures[1].image));
        assert_eq!(textures[0].image.pixels, vec![255, 0, 0, 255]);
    }

    #[test]
    fn load_obj_str_goes_through_the_layout_contract() {
        let mut model = Model::new();
        model
            .load_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
            .unwrap();
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.index_count(), 3);
        let vertex = &model.meshes[0].vertices[0];
        // Generated face normal for the XY triangle points along +Z.
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
    }
}
