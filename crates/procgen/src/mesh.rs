//! Triangulated vertex/index stream handed to the mesh renderer.

use bytemuck::{Pod, Zeroable};
use engine_core::{try_alloc, TerrainError};

use crate::heightfield::{HeightField, HeightSample};

/// Vertex layout consumed by the renderer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
    pub normal: [f32; 3],
}

impl TerrainVertex {
    fn from_sample(sample: &HeightSample, tu: f32, tv: f32) -> Self {
        Self {
            position: sample.position.into(),
            texcoord: [tu, tv],
            normal: sample.normal.into(),
        }
    }
}

/// Two triangles per quad, six unshared vertices each.
#[derive(Debug, Clone, Default)]
pub struct TerrainMesh {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

/// Downstream consumer of a finished mesh (GPU upload lives behind this).
pub trait MeshRenderer {
    fn upload(&mut self, mesh: &TerrainMesh) -> anyhow::Result<()>;
}

impl TerrainMesh {
    /// Vertex (and index) count for a `width` x `height` field.
    pub fn vertex_count(width: u32, height: u32) -> usize {
        (width as usize - 1) * (height as usize - 1) * 6
    }

    /// Triangulate every quad as upper-left, upper-right, bottom-left /
    /// bottom-left, upper-right, bottom-right.
    ///
    /// Texture seams: a `tv` of exactly 1 on the upper row becomes 0, and a `tu`
    /// of exactly 0 on the right column becomes 1, so each quad spans a full tile
    /// edge instead of wrapping back.
    pub fn from_field(field: &HeightField) -> Result<Self, TerrainError> {
        let count = Self::vertex_count(field.width(), field.height());
        let mut vertices = try_alloc("mesh vertices", count, TerrainVertex::zeroed())?;
        let mut indices = try_alloc("mesh indices", count, 0_u32)?;

        let samples = field.samples();
        let mut next = 0;
        let mut emit = |vertex: TerrainVertex| {
            vertices[next] = vertex;
            indices[next] = next as u32;
            next += 1;
        };

        for row in 0..field.height() - 1 {
            for col in 0..field.width() - 1 {
                let bl = &samples[field.index(row, col)];
                let br = &samples[field.index(row, col + 1)];
                let ul = &samples[field.index(row + 1, col)];
                let ur = &samples[field.index(row + 1, col + 1)];

                let upper_left = TerrainVertex::from_sample(ul, ul.texcoord.x, top_edge(ul.texcoord.y));
                let upper_right = TerrainVertex::from_sample(
                    ur,
                    right_edge(ur.texcoord.x),
                    top_edge(ur.texcoord.y),
                );
                let bottom_left = TerrainVertex::from_sample(bl, bl.texcoord.x, bl.texcoord.y);
                let bottom_right = TerrainVertex::from_sample(br, right_edge(br.texcoord.x), br.texcoord.y);

                emit(upper_left);
                emit(upper_right);
                emit(bottom_left);
                emit(bottom_left);
                emit(upper_right);
                emit(bottom_right);
            }
        }

        Ok(Self { vertices, indices })
    }

    /// Raw vertex bytes for buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

#[inline]
fn top_edge(tv: f32) -> f32 {
    if tv == 1.0 {
        0.0
    } else {
        tv
    }
}

#[inline]
fn right_edge(tu: f32) -> f32 {
    if tu == 0.0 {
        1.0
    } else {
        tu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_match_quad_count() {
        let field = HeightField::new(10, 7).unwrap();
        let mesh = TerrainMesh::from_field(&field).unwrap();
        assert_eq!(mesh.vertices.len(), 9 * 6 * 6);
        assert_eq!(mesh.index_count(), 9 * 6 * 6);
        assert!(mesh.indices.iter().enumerate().all(|(i, &idx)| idx as usize == i));
        assert_eq!(
            mesh.vertex_bytes().len(),
            mesh.vertices.len() * std::mem::size_of::<TerrainVertex>()
        );
    }

    #[test]
    fn first_quad_winding_and_positions() {
        let field = HeightField::from_elevations(2, 2, &[0.0, 1.0, 2.0, 3.0]).unwrap();
        let mesh = TerrainMesh::from_field(&field).unwrap();
        let p: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            p,
            vec![
                [0.0, 2.0, 1.0],
                [1.0, 3.0, 1.0],
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 3.0, 1.0],
                [1.0, 1.0, 0.0],
            ]
        );
    }

    #[test]
    fn seam_coordinates_are_fixed_up() {
        let mut field = HeightField::new(4, 4).unwrap();
        field.compute_texcoords(4);
        // increment = 1.0, period = 1: every sample has tu = 0 and tv = 1.
        let mesh = TerrainMesh::from_field(&field).unwrap();
        let quad = &mesh.vertices[..6];
        // Upper row: tv 1 becomes 0; right column: tu 0 becomes 1.
        assert_eq!(quad[0].texcoord, [0.0, 0.0]);
        assert_eq!(quad[1].texcoord, [1.0, 0.0]);
        assert_eq!(quad[2].texcoord, [0.0, 1.0]);
        assert_eq!(quad[5].texcoord, [1.0, 1.0]);
    }
}
