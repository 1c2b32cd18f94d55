//! GLB document construction for procedural flower assets
//!
//! Builder APIs over `gltf-json`:
//! - [`BufferBuilder`] packs vertex streams, indices and image blobs into one
//!   4-byte aligned binary chunk, creating views and accessors as it goes
//! - [`MeshBuilder`] bundles the attribute streams of one primitive
//! - [`GltfBuilder`] collects nodes, meshes, materials, images, textures,
//!   samplers and scenes into a `json::Root`
//! - [`assemble_glb`] writes the header, JSON chunk and BIN chunk
//!
//! Materials, samplers and extension blocks are written in their glTF JSON
//! form and converted with [`from_json_value`]; free-form metadata goes
//! through [`extras_from_json`].
//!
//! # Example
//!
//! ```no_run
//! use glb_builder::*;
//!
//! let mut buffer = BufferBuilder::new();
//! let petal = MeshBuilder::new()
//!     .positions(&[[0.0, 0.0, 0.0], [0.1, 0.0, 0.0], [0.0, 0.0, 0.1]])
//!     .uvs(&[[0.5, 0.5], [1.0, 0.5], [0.5, 1.0]])
//!     .indices(&[0, 1, 2])
//!     .material(0)
//!     .build(&mut buffer);
//! let png: Vec<u8> = std::fs::read("petal.png").unwrap();
//! let image_view = buffer.pack_bytes(&png);
//!
//! let material: json::Material = from_json_value(serde_json::json!({
//!     "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } },
//!     "alphaMode": "MASK",
//! }))
//! .unwrap();
//!
//! let root = GltfBuilder::new()
//!     .buffer_byte_length(buffer.data().len() as u64)
//!     .add_mesh_from_accessors("Petal", &petal)
//!     .add_material(material)
//!     .add_image_view("Petal", "image/png", image_view)
//!     .add_texture("Petal", 0, None)
//!     .build(buffer.views(), buffer.accessors(), "glb-builder");
//! let glb_bytes = assemble_glb(&root, buffer.data()).unwrap();
//! ```

pub mod buffer;
pub mod document;
pub mod mesh;
pub mod utils;

pub use buffer::{AccessorIndex, BufferBuilder};
pub use document::GltfBuilder;
pub use mesh::{MeshAccessors, MeshBuilder};
pub use utils::{align_buffer, assemble_glb, compute_bounds, extras_from_json, from_json_value};

pub use gltf_json as json;
