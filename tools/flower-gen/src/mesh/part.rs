use crate::scene::MaterialId;
use glam::{Vec2, Vec3};

/// A mesh vertex; normal and UV are optional per vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Option<Vec3>,
    pub uv: Option<Vec2>,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Option<Vec3>, uv: Option<Vec2>) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Triangle-list geometry with its bounds and material
///
/// Bounds track every vertex as it is added. Attribute flags say whether
/// the exported mesh carries NORMAL / TEXCOORD_0 streams; vertices missing
/// an attribute export a default value for it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    pub name: String,
    pub material: Option<MaterialId>,
    pub has_normals: bool,
    pub has_uvs: bool,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    min: Vec3,
    max: Vec3,
}

impl MeshPart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material: None,
            has_normals: false,
            has_uvs: false,
            vertices: Vec::new(),
            indices: Vec::new(),
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Append a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        self.min = self.min.min(vertex.position);
        self.max = self.max.max(vertex.position);
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    /// Append a triangle (counter-clockwise front face)
    ///
    /// Indices are checked later by [`MeshPart::indices_valid`].
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Axis-aligned bounds of all vertices, `None` while empty
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        (!self.vertices.is_empty()).then_some((self.min, self.max))
    }

    /// True when every index addresses an existing vertex
    pub fn indices_valid(&self) -> bool {
        let count = self.vertices.len();
        self.indices.len() % 3 == 0 && self.indices.iter().all(|&i| (i as usize) < count)
    }

    pub fn positions(&self) -> Vec<[f32; 3]> {
        self.vertices.iter().map(|v| v.position.to_array()).collect()
    }

    /// Normal stream, or `None` when the part has no normals
    pub fn normals(&self) -> Option<Vec<[f32; 3]>> {
        self.has_normals.then(|| {
            self.vertices
                .iter()
                .map(|v| v.normal.unwrap_or(Vec3::Z).to_array())
                .collect()
        })
    }

    /// UV stream, or `None` when the part has no texture coordinates
    pub fn uvs(&self) -> Option<Vec<[f32; 2]>> {
        self.has_uvs.then(|| {
            self.vertices
                .iter()
                .map(|v| v.uv.unwrap_or(Vec2::ZERO).to_array())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_track_vertices() {
        let mut part = MeshPart::new("Test");
        assert!(part.bounds().is_none());

        part.add_vertex(Vertex::new(Vec3::new(1.0, -2.0, 0.5), None, None));
        part.add_vertex(Vertex::new(Vec3::new(-1.0, 3.0, 0.0), None, None));
        let (min, max) = part.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Vec3::new(1.0, 3.0, 0.5));
    }

    #[test]
    fn test_streams_follow_flags() {
        let mut part = MeshPart::new("Test");
        let a = part.add_vertex(Vertex::new(Vec3::ZERO, Some(Vec3::Y), None));
        let b = part.add_vertex(Vertex::new(Vec3::X, None, Some(Vec2::ONE)));
        let c = part.add_vertex(Vertex::new(Vec3::Z, None, None));
        part.add_triangle(a, b, c);

        assert_eq!(part.triangle_count(), 1);
        assert!(part.indices_valid());
        assert!(part.normals().is_none());

        part.has_normals = true;
        part.has_uvs = true;
        let normals = part.normals().unwrap();
        assert_eq!(normals[0], [0.0, 1.0, 0.0]);
        assert_eq!(normals[1], [0.0, 0.0, 1.0]);
        assert_eq!(part.uvs().unwrap()[2], [0.0, 0.0]);
    }
}
