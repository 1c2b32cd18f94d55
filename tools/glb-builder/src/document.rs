//! GLTF document construction

use crate::MeshAccessors;
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use std::collections::BTreeMap;

/// Builder for complete GLTF documents
#[derive(Default)]
pub struct GltfBuilder {
    nodes: Vec<json::Node>,
    meshes: Vec<json::Mesh>,
    materials: Vec<json::Material>,
    images: Vec<json::Image>,
    textures: Vec<json::Texture>,
    samplers: Vec<json::texture::Sampler>,
    scenes: Vec<json::Scene>,
    extensions_used: Vec<String>,
    extras: json::extras::Extras,
    buffer_byte_length: u64,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set buffer byte length (required before building)
    pub fn buffer_byte_length(mut self, length: u64) -> Self {
        self.buffer_byte_length = length;
        self
    }

    /// Add a node
    pub fn add_node(mut self, node: json::Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a mesh with a single triangle-list primitive
    pub fn add_mesh_from_accessors(mut self, name: &str, accessors: &MeshAccessors) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            Valid(json::mesh::Semantic::Positions),
            accessors.positions.as_json_index(),
        );

        if let Some(normals) = accessors.normals {
            attributes.insert(
                Valid(json::mesh::Semantic::Normals),
                normals.as_json_index(),
            );
        }

        if let Some(uvs) = accessors.uvs {
            attributes.insert(
                Valid(json::mesh::Semantic::TexCoords(0)),
                uvs.as_json_index(),
            );
        }

        let primitive = json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: accessors.indices.map(|i| i.as_json_index()),
            material: accessors.material.map(json::Index::new),
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        };

        self.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives: vec![primitive],
            weights: None,
        });

        self
    }

    /// Add a material
    pub fn add_material(mut self, material: json::Material) -> Self {
        self.materials.push(material);
        self
    }

    /// Add a sampler
    pub fn add_sampler(mut self, sampler: json::texture::Sampler) -> Self {
        self.samplers.push(sampler);
        self
    }

    /// Add an image stored in a buffer view of the binary chunk
    pub fn add_image_view(mut self, name: &str, mime_type: &str, view: u32) -> Self {
        self.images.push(json::Image {
            buffer_view: Some(json::Index::new(view)),
            mime_type: Some(json::image::MimeType(mime_type.to_string())),
            name: Some(name.to_string()),
            uri: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        self
    }

    /// Get the current image count
    pub fn image_count(&self) -> u32 {
        self.images.len() as u32
    }

    /// Add a texture sampling an image
    pub fn add_texture(mut self, name: &str, image: u32, sampler: Option<u32>) -> Self {
        self.textures.push(json::Texture {
            name: Some(name.to_string()),
            sampler: sampler.map(json::Index::new),
            source: json::Index::new(image),
            extensions: Default::default(),
            extras: Default::default(),
        });
        self
    }

    /// Declare an extension in `extensionsUsed` (deduplicated)
    pub fn use_extension(mut self, name: &str) -> Self {
        if !self.extensions_used.iter().any(|e| e == name) {
            self.extensions_used.push(name.to_string());
        }
        self
    }

    /// Attach document-level metadata
    pub fn extras(mut self, extras: json::extras::Extras) -> Self {
        self.extras = extras;
        self
    }

    /// Add a scene
    pub fn add_scene(mut self, name: &str, root_nodes: &[u32]) -> Self {
        self.scenes.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            nodes: root_nodes.iter().map(|n| json::Index::new(*n)).collect(),
        });
        self
    }

    /// Build final GLTF Root (requires buffer views and accessors from BufferBuilder)
    pub fn build(
        self,
        buffer_views: &[json::buffer::View],
        accessors: &[json::Accessor],
        generator: &str,
    ) -> json::Root {
        let buffers = vec![json::Buffer {
            byte_length: self.buffer_byte_length.into(),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        }];

        json::Root {
            accessors: accessors.to_vec(),
            animations: Vec::new(),
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(generator.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers,
            buffer_views: buffer_views.to_vec(),
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: Vec::new(),
            extensions_used: self.extensions_used,
            extras: self.extras,
            images: self.images,
            materials: self.materials,
            meshes: self.meshes,
            nodes: self.nodes,
            samplers: self.samplers,
            scene: if self.scenes.is_empty() {
                None
            } else {
                Some(json::Index::new(0))
            },
            scenes: self.scenes,
            skins: Vec::new(),
            textures: self.textures,
        }
    }
}
