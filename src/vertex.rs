use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-vertex attribute kinds understood by the loader and the shaders.
///
/// Each kind owns a fixed GPU attribute slot; shader input locations must
/// match [`VertexAttribute::shader_slot`] exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexAttribute {
    Position,
    Normal,
    TexCoord,
    Tangent,
    Bitangent,
}

impl VertexAttribute {
    /// All attributes in slot order.
    pub const ALL: [Self; 5] = [
        Self::Position,
        Self::Normal,
        Self::TexCoord,
        Self::Tangent,
        Self::Bitangent,
    ];

    /// Number of scalars the attribute occupies in a vertex row.
    pub const fn component_count(self) -> usize {
        match self {
            Self::TexCoord => 2,
            _ => 3,
        }
    }

    /// Fixed shader attribute location for this kind.
    pub const fn shader_slot(self) -> u32 {
        match self {
            Self::Position => 0,
            Self::Normal => 1,
            Self::TexCoord => 2,
            Self::Tangent => 3,
            Self::Bitangent => 4,
        }
    }
}

/// One vertex in the interleaved GPU layout.
///
/// The field order matches the attribute slot order, so a `&[Vertex]` casts
/// straight into a vertex buffer upload. Attributes absent from a layout
/// stay zeroed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

/// Structural errors raised while interpreting a flat vertex buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("row width must be non-zero")]
    ZeroRowWidth,
    #[error("buffer length {len} is not a multiple of the row width {cols}")]
    RowWidthMismatch { len: usize, cols: usize },
    #[error("{attribute:?} at offset {offset} reads past the row width {cols}")]
    AttributeOutOfRange {
        attribute: VertexAttribute,
        offset: usize,
        cols: usize,
    },
}

/// Interprets `data` as rows of `cols` scalars through the declared layout.
///
/// `attributes` maps each declared kind to its starting offset within one
/// row. The whole buffer is validated before any vertex is produced, so a
/// failed call leaves nothing half-built.
pub fn unpack_vertices(
    cols: usize,
    attributes: &[(VertexAttribute, usize)],
    data: &[f32],
) -> Result<Vec<Vertex>, LayoutError> {
    if cols == 0 {
        return Err(LayoutError::ZeroRowWidth);
    }
    if data.len() % cols != 0 {
        return Err(LayoutError::RowWidthMismatch {
            len: data.len(),
            cols,
        });
    }
    for &(attribute, offset) in attributes {
        if offset + attribute.component_count() > cols {
            return Err(LayoutError::AttributeOutOfRange {
                attribute,
                offset,
                cols,
            });
        }
    }

    let mut vertices = Vec::with_capacity(data.len() / cols);
    for row in data.chunks_exact(cols) {
        let mut vertex = Vertex::default();
        for &(attribute, offset) in attributes {
            let scalars = &row[offset..offset + attribute.component_count()];
            match attribute {
                VertexAttribute::Position => vertex.position.copy_from_slice(scalars),
                VertexAttribute::Normal => vertex.normal.copy_from_slice(scalars),
                VertexAttribute::TexCoord => vertex.tex_coords.copy_from_slice(scalars),
                VertexAttribute::Tangent => vertex.tangent.copy_from_slice(scalars),
                VertexAttribute::Bitangent => vertex.bitangent.copy_from_slice(scalars),
            }
        }
        vertices.push(vertex);
    }
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_the_loader_shader_contract() {
        let slots: Vec<u32> = VertexAttribute::ALL
            .iter()
            .map(|a| a.shader_slot())
            .collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 4]);
        assert_eq!(VertexAttribute::TexCoord.component_count(), 2);
        assert_eq!(VertexAttribute::Position.component_count(), 3);
    }

    #[test]
    fn unpack_round_trips_declared_attributes() {
        let data: Vec<f32> = vec![
            1.0, 2.0, 3.0, 0.25, 0.75, //
            4.0, 5.0, 6.0, 0.5, 1.0,
        ];
        let layout = [
            (VertexAttribute::Position, 0),
            (VertexAttribute::TexCoord, 3),
        ];
        let vertices = unpack_vertices(5, &layout, &data).unwrap();

        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(vertices[0].tex_coords, [0.25, 0.75]);
        assert_eq!(vertices[1].position, [4.0, 5.0, 6.0]);
        assert_eq!(vertices[1].tex_coords, [0.5, 1.0]);
        for vertex in &vertices {
            assert_eq!(vertex.normal, [0.0; 3]);
            assert_eq!(vertex.tangent, [0.0; 3]);
            assert_eq!(vertex.bitangent, [0.0; 3]);
        }
    }

    #[test]
    fn rejects_buffer_not_divisible_by_row_width() {
        let data = vec![0.0; 7];
        let err = unpack_vertices(5, &[(VertexAttribute::Position, 0)], &data).unwrap_err();
        assert_eq!(err, LayoutError::RowWidthMismatch { len: 7, cols: 5 });
    }

    #[test]
    fn rejects_attribute_reading_past_the_row() {
        let data = vec![0.0; 10];
        let err = unpack_vertices(5, &[(VertexAttribute::Position, 4)], &data).unwrap_err();
        assert_eq!(
            err,
            LayoutError::AttributeOutOfRange {
                attribute: VertexAttribute::Position,
                offset: 4,
                cols: 5,
            }
        );
    }

    #[test]
    fn rejects_zero_row_width() {
        assert_eq!(
            unpack_vertices(0, &[], &[]).unwrap_err(),
            LayoutError::ZeroRowWidth
        );
    }

    #[test]
    fn empty_buffer_produces_no_vertices() {
        let vertices = unpack_vertices(8, &[(VertexAttribute::Position, 0)], &[]).unwrap();
        assert!(vertices.is_empty());
    }
}
