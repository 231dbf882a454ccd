use bytemuck::{
    Pod,
    Zeroable,
};
use nalgebra::{
    Point2,
    Vector4,
};

use crate::{
    render::texture::{
        TextureHandle,
        TextureTable,
    },
    voxel::mesh::Face,
};

/// Two triangles per quad, counter-clockwise like the face vertices.
const QUAD_INDICES: [[u32; 3]; 2] = [[0, 1, 2], [0, 2, 3]];

#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: Vector4<f32>,
    pub normal: Vector4<f32>,
    pub uv: Point2<f32>,
    pub texture_id: u32,
}

#[derive(Clone, Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<Vertex>,
    faces: Vec<[u32; 3]>,
}

impl MeshBuilder {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
    }

    pub fn push(
        &mut self,
        vertices: impl IntoIterator<Item = Vertex>,
        faces: impl IntoIterator<Item = [u32; 3]>,
    ) {
        let base_index = self.vertices.len() as u32;

        self.vertices.extend(vertices);
        self.faces.extend(
            faces
                .into_iter()
                .map(|face| face.map(|index| index + base_index)),
        );
    }

    pub fn push_face(&mut self, face: &Face, texture: TextureHandle) {
        let normal = face.normal().cast::<f32>().to_homogeneous();
        let uvs = face.uvs();

        let vertices = face
            .vertices()
            .into_iter()
            .zip(uvs)
            .map(|(position, uv)| {
                Vertex {
                    position: position.cast::<f32>().to_homogeneous(),
                    normal,
                    uv: uv.cast(),
                    texture_id: texture.0,
                }
            });

        self.push(vertices, QUAD_INDICES);
    }

    /// Pushes all faces that have a texture in `textures`. Returns how many
    /// were skipped.
    #[profiling::function]
    pub fn push_faces<'a>(
        &mut self,
        faces: impl IntoIterator<Item = &'a Face>,
        textures: &TextureTable,
    ) -> usize {
        let mut skipped = 0;

        for face in faces {
            if let Some(handle) = textures.handle(&face.texture) {
                self.push_face(face, handle);
            }
            else {
                tracing::warn!(texture = %face.texture, "face with unresolved texture");
                skipped += 1;
            }
        }

        skipped
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn finish(&self) -> Option<MeshData> {
        if self.faces.is_empty() {
            None
        }
        else {
            assert!(!self.vertices.is_empty());

            Some(MeshData {
                vertices: self.vertices.clone(),
                indices: self.faces.clone(),
            })
        }
    }
}

/// Vertices and triangles ready to be copied into GPU buffers.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<[u32; 3]>,
}

impl MeshData {
    pub fn num_indices(&self) -> u32 {
        3 * self.indices.len() as u32
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
