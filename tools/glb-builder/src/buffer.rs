//! Low-level buffer packing with automatic alignment and accessor creation

use crate::utils::{align_buffer, compute_bounds};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// Describes one packed attribute stream before it becomes an accessor
struct Layout {
    count: usize,
    component: json::accessor::ComponentType,
    kind: json::accessor::Type,
    target: json::buffer::Target,
    bounds: Option<(Vec<f32>, Vec<f32>)>,
}

/// Builder for binary buffer with automatic alignment
pub struct BufferBuilder {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    /// Create a new empty buffer builder
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            views: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Get the current accessor count
    pub fn accessor_count(&self) -> u32 {
        self.accessors.len() as u32
    }

    /// Get the binary buffer data
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer views
    pub fn views(&self) -> &[json::buffer::View] {
        &self.views
    }

    /// Get the accessors
    pub fn accessors(&self) -> &[json::Accessor] {
        &self.accessors
    }

    /// Pack Vec3 positions with bounds calculation
    pub fn pack_positions(&mut self, positions: &[[f32; 3]]) -> AccessorIndex {
        let offset = self.buffer.len();
        self.buffer
            .extend_from_slice(bytemuck::cast_slice(positions));

        self.push_accessor(
            offset,
            Layout {
                count: positions.len(),
                component: json::accessor::ComponentType::F32,
                kind: json::accessor::Type::Vec3,
                target: json::buffer::Target::ArrayBuffer,
                bounds: Some(compute_bounds(positions)),
            },
        )
    }

    /// Pack Vec3 data (normals)
    pub fn pack_vec3(&mut self, data: &[[f32; 3]]) -> AccessorIndex {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytemuck::cast_slice(data));

        self.push_accessor(
            offset,
            Layout {
                count: data.len(),
                component: json::accessor::ComponentType::F32,
                kind: json::accessor::Type::Vec3,
                target: json::buffer::Target::ArrayBuffer,
                bounds: None,
            },
        )
    }

    /// Pack Vec2 data (UVs)
    pub fn pack_vec2(&mut self, data: &[[f32; 2]]) -> AccessorIndex {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytemuck::cast_slice(data));

        self.push_accessor(
            offset,
            Layout {
                count: data.len(),
                component: json::accessor::ComponentType::F32,
                kind: json::accessor::Type::Vec2,
                target: json::buffer::Target::ArrayBuffer,
                bounds: None,
            },
        )
    }

    /// Pack u32 triangle indices
    pub fn pack_indices_u32(&mut self, indices: &[u32]) -> AccessorIndex {
        let offset = self.buffer.len();
        for idx in indices {
            self.buffer.extend_from_slice(&idx.to_le_bytes());
        }

        self.push_accessor(
            offset,
            Layout {
                count: indices.len(),
                component: json::accessor::ComponentType::U32,
                kind: json::accessor::Type::Scalar,
                target: json::buffer::Target::ElementArrayBuffer,
                bounds: None,
            },
        )
    }

    /// Pack an opaque blob (e.g. an encoded image) into its own buffer view
    ///
    /// Returns the view index; no accessor is created.
    pub fn pack_bytes(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: (bytes.len() as u64).into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: None,
        });

        align_buffer(&mut self.buffer);
        self.views.len() as u32 - 1
    }

    fn push_accessor(&mut self, offset: usize, layout: Layout) -> AccessorIndex {
        let byte_length = self.buffer.len() - offset;

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: (byte_length as u64).into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(layout.target)),
        });

        let to_json =
            |values: Vec<f32>| json::Value::Array(values.into_iter().map(json::Value::from).collect());
        let (min, max) = match layout.bounds {
            Some((min, max)) => (Some(to_json(min)), Some(to_json(max))),
            None => (None, None),
        };

        let accessor_idx = self.accessors.len() as u32;
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(self.views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: layout.count.into(),
            component_type: Valid(json::accessor::GenericComponentType(layout.component)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(layout.kind),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });

        align_buffer(&mut self.buffer);
        AccessorIndex(accessor_idx)
    }
}

impl Default for BufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_builder_positions() {
        let mut builder = BufferBuilder::new();
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]];
        let idx = builder.pack_positions(&positions);

        assert_eq!(idx, AccessorIndex(0));
        assert_eq!(builder.accessor_count(), 1);
        assert_eq!(builder.views().len(), 1);
        // 3 positions * 12 bytes = 36 bytes, already aligned
        assert_eq!(builder.data().len(), 36);
        assert!(builder.accessors()[0].min.is_some());
        assert!(builder.accessors()[0].max.is_some());
    }

    #[test]
    fn test_buffer_builder_indices_u32() {
        let mut builder = BufferBuilder::new();
        builder.pack_vec2(&[[0.0, 0.0], [1.0, 1.0], [0.5, 0.0]]);
        let idx = builder.pack_indices_u32(&[0, 1, 2]);

        assert_eq!(idx, AccessorIndex(1));
        // 3 uvs * 8 bytes + 3 indices * 4 bytes
        assert_eq!(builder.data().len(), 36);
        let view = &builder.views()[1];
        assert_eq!(view.byte_offset.map(|o| o.0), Some(24));
        assert_eq!(view.byte_length.0, 12);
    }

    #[test]
    fn test_pack_bytes_aligns_following_data() {
        let mut builder = BufferBuilder::new();
        let view = builder.pack_bytes(&[1, 2, 3, 4, 5]);
        let idx = builder.pack_indices_u32(&[0]);

        assert_eq!(view, 0);
        assert_eq!(idx, AccessorIndex(0));
        assert_eq!(builder.views()[0].byte_length.0, 5);
        assert!(builder.views()[0].target.is_none());
        assert_eq!(builder.views()[1].byte_offset.map(|o| o.0), Some(8));
    }
}
