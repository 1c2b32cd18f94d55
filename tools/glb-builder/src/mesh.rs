//! High-level mesh construction

use crate::buffer::{AccessorIndex, BufferBuilder};

/// Accessor indices for a mesh
#[derive(Debug, Clone)]
pub struct MeshAccessors {
    pub positions: AccessorIndex,
    pub normals: Option<AccessorIndex>,
    pub uvs: Option<AccessorIndex>,
    pub indices: Option<AccessorIndex>,
    pub material: Option<u32>,
}

/// Builder for mesh data
#[derive(Default)]
pub struct MeshBuilder {
    positions: Vec<[f32; 3]>,
    normals: Option<Vec<[f32; 3]>>,
    uvs: Option<Vec<[f32; 2]>>,
    indices: Option<Vec<u32>>,
    material: Option<u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set positions (required)
    pub fn positions(mut self, positions: &[[f32; 3]]) -> Self {
        self.positions = positions.to_vec();
        self
    }

    /// Set normals (optional)
    pub fn normals(mut self, normals: &[[f32; 3]]) -> Self {
        self.normals = Some(normals.to_vec());
        self
    }

    /// Set UVs (optional)
    pub fn uvs(mut self, uvs: &[[f32; 2]]) -> Self {
        self.uvs = Some(uvs.to_vec());
        self
    }

    /// Set indices (optional)
    pub fn indices(mut self, indices: &[u32]) -> Self {
        self.indices = Some(indices.to_vec());
        self
    }

    /// Set the material index used by the primitive (optional)
    pub fn material(mut self, material: u32) -> Self {
        self.material = Some(material);
        self
    }

    /// Build and pack into buffer
    pub fn build(self, buffer: &mut BufferBuilder) -> MeshAccessors {
        let positions = buffer.pack_positions(&self.positions);
        let normals = self.normals.as_ref().map(|n| buffer.pack_vec3(n));
        let uvs = self.uvs.as_ref().map(|uv| buffer.pack_vec2(uv));
        let indices = self.indices.as_ref().map(|i| buffer.pack_indices_u32(i));

        MeshAccessors {
            positions,
            normals,
            uvs,
            indices,
            material: self.material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_builder_basic() {
        let mut buffer = BufferBuilder::new();
        let mesh = MeshBuilder::new()
            .positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]])
            .normals(&[[0.0, 0.0, 1.0]; 3])
            .indices(&[0, 1, 2])
            .build(&mut buffer);

        assert_eq!(mesh.positions, AccessorIndex(0));
        assert_eq!(mesh.normals, Some(AccessorIndex(1)));
        assert_eq!(mesh.indices, Some(AccessorIndex(2)));
        assert!(mesh.uvs.is_none());
        assert!(mesh.material.is_none());
    }

    #[test]
    fn test_mesh_builder_textured() {
        let mut buffer = BufferBuilder::new();
        let mesh = MeshBuilder::new()
            .positions(&[[0.0, 0.0, 0.0]])
            .uvs(&[[0.5, 0.5]])
            .material(3)
            .build(&mut buffer);

        assert_eq!(mesh.uvs, Some(AccessorIndex(1)));
        assert_eq!(mesh.material, Some(3));
    }
}
