//! Scene graph for an assembled flower
//!
//! An append-only arena: meshes, materials, textures and nodes are pushed
//! once and addressed by typed index handles that are never reused. Mesh
//! parts are finished before they are added, so the scene never holds a
//! half-built or empty mesh.

use crate::mesh::MeshPart;
use crate::texture::Canvas;
use serde_json::Value;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

handle!(
    /// Index of a mesh part
    MeshId
);
handle!(
    /// Index of a node
    NodeId
);
handle!(
    /// Index of a material
    MaterialId
);
handle!(
    /// Index of a texture
    TextureId
);

/// Broken references found by [`SceneGraph::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("node {node} references missing mesh {mesh}")]
    DanglingMesh { node: NodeId, mesh: MeshId },

    #[error("group node {node} references node {child}, which does not precede it")]
    DanglingChild { node: NodeId, child: NodeId },

    #[error("mesh {mesh} references missing material {material}")]
    DanglingMaterial { mesh: MeshId, material: MaterialId },

    #[error("material {material} references missing texture {texture}")]
    DanglingTexture {
        material: MaterialId,
        texture: TextureId,
    },

    #[error("mesh {0} has no triangles")]
    EmptyMesh(MeshId),

    #[error("mesh {0} has an index past its last vertex")]
    InvalidIndices(MeshId),

    #[error("root node {0} does not exist")]
    MissingRoot(NodeId),
}

/// What a node holds: one mesh, or an ordered list of children
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh(MeshId),
    Group(Vec<NodeId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    /// Free-form metadata carried into the exported node
    pub extras: Option<Value>,
}

impl Node {
    pub fn mesh(name: impl Into<String>, mesh: MeshId) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Mesh(mesh),
            extras: None,
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<NodeId>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Group(children),
            extras: None,
        }
    }

    pub fn with_extras(mut self, extras: Value) -> Self {
        self.extras = Some(extras);
        self
    }

    /// Whether this node belongs directly under the flower root
    pub fn is_top_level_part(&self) -> bool {
        self.name == "Stem_Node"
            || self.name.starts_with("Petal_Layer_Node_")
            || self.name.contains("_Group_Node")
    }
}

/// An RGBA image attached to the scene
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAsset {
    pub name: String,
    pub image: Canvas,
}

impl TextureAsset {
    pub fn from_canvas(name: impl Into<String>, image: Canvas) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AlphaMode::Opaque => "OPAQUE",
            AlphaMode::Mask => "MASK",
            AlphaMode::Blend => "BLEND",
        }
    }
}

/// KHR_materials_transmission
#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    pub factor: f32,
    pub texture: Option<TextureId>,
}

/// KHR_materials_volume
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub thickness_factor: f32,
    pub thickness_texture: Option<TextureId>,
    pub attenuation_distance: f32,
    pub attenuation_color: [f32; 3],
}

/// KHR_materials_clearcoat
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clearcoat {
    pub factor: f32,
    pub texture: Option<TextureId>,
    pub roughness_factor: f32,
    pub roughness_texture: Option<TextureId>,
    pub normal_texture: Option<TextureId>,
}

/// Metallic-roughness material with the KHR extensions petals use
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureId>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<TextureId>,
    pub normal_texture: Option<TextureId>,
    pub occlusion_texture: Option<TextureId>,
    pub occlusion_strength: f32,
    pub emissive_texture: Option<TextureId>,
    pub emissive_factor: [f32; 3],
    pub double_sided: bool,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub transmission: Option<Transmission>,
    pub volume: Option<Volume>,
    pub clearcoat: Option<Clearcoat>,
    pub ior: Option<f32>,
    pub emissive_strength: Option<f32>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color_factor: [1.0; 4],
            base_color_texture: None,
            metallic_factor: 0.0,
            roughness_factor: 0.5,
            metallic_roughness_texture: None,
            normal_texture: None,
            occlusion_texture: None,
            occlusion_strength: 1.0,
            emissive_texture: None,
            emissive_factor: [0.0; 3],
            double_sided: false,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            transmission: None,
            volume: None,
            clearcoat: None,
            ior: None,
            emissive_strength: None,
        }
    }
}

const PLANT_GREEN: [f32; 4] = [0.2, 0.6, 0.2, 1.0];

impl Material {
    fn plant(name: &str, base_color_factor: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            base_color_factor,
            metallic_factor: 0.1,
            roughness_factor: 0.9,
            double_sided: true,
            ..Self::default()
        }
    }

    pub fn stem() -> Self {
        Self::plant("Stem", PLANT_GREEN)
    }

    pub fn pistil_style() -> Self {
        Self::plant("PistilStyle", PLANT_GREEN)
    }

    pub fn pistil_stigma(normal_texture: Option<TextureId>) -> Self {
        Self {
            normal_texture,
            metallic_factor: 0.0,
            roughness_factor: 1.0,
            ..Self::plant("PistilStigma", [0.2, 0.8, 0.2, 1.0])
        }
    }

    pub fn stamen_filament() -> Self {
        Self::plant("StamenFilament", PLANT_GREEN)
    }

    pub fn stamen_anther(normal_texture: Option<TextureId>) -> Self {
        Self {
            normal_texture,
            ..Self::plant("StamenAnther", [0.8, 0.8, 0.0, 1.0])
        }
    }

    /// Textured, alpha-masked and slightly translucent petal surface
    pub fn petal(
        name: impl Into<String>,
        texture: Option<TextureId>,
        normal: Option<TextureId>,
        emissive: Option<TextureId>,
    ) -> Self {
        let mut material = Self {
            name: name.into(),
            base_color_texture: texture,
            normal_texture: normal,
            metallic_factor: 0.0,
            roughness_factor: 0.8,
            double_sided: true,
            alpha_mode: AlphaMode::Mask,
            alpha_cutoff: 0.5,
            ior: Some(1.4),
            transmission: Some(Transmission {
                factor: 0.09,
                texture: None,
            }),
            ..Self::default()
        };
        if emissive.is_some() {
            material.emissive_texture = emissive;
            material.emissive_factor = [1.0; 3];
            material.emissive_strength = Some(1.0);
        }
        material
    }

    /// Every texture this material samples
    pub fn texture_refs(&self) -> impl Iterator<Item = TextureId> + '_ {
        [
            self.base_color_texture,
            self.metallic_roughness_texture,
            self.normal_texture,
            self.occlusion_texture,
            self.emissive_texture,
        ]
        .into_iter()
        .chain(self.transmission.iter().map(|t| t.texture))
        .chain(self.volume.iter().map(|v| v.thickness_texture))
        .chain(self.clearcoat.iter().flat_map(|c| {
            [c.texture, c.roughness_texture, c.normal_texture]
        }))
        .flatten()
    }
}

/// Append-only container for everything an exported flower needs
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    pub name: String,
    /// Document-level metadata
    pub extras: Option<Value>,
    meshes: Vec<MeshPart>,
    materials: Vec<Material>,
    textures: Vec<TextureAsset>,
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl SceneGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_mesh(&mut self, part: MeshPart) -> MeshId {
        self.meshes.push(part);
        MeshId(self.meshes.len() as u32 - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() as u32 - 1)
    }

    pub fn add_texture(&mut self, texture: TextureAsset) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() as u32 - 1)
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() as u32 - 1)
    }

    /// Add a finished mesh part together with a node showing it
    pub fn add_mesh_node(&mut self, node_name: impl Into<String>, part: MeshPart) -> NodeId {
        let mesh = self.add_mesh(part);
        self.add_node(Node::mesh(node_name, mesh))
    }

    pub fn add_group(&mut self, name: impl Into<String>, children: Vec<NodeId>) -> NodeId {
        self.add_node(Node::group(name, children))
    }

    /// Group every top-level part under one root node
    ///
    /// Call once all other geometry is in place; nodes added afterwards are
    /// not collected.
    pub fn add_root_group(&mut self, name: impl Into<String>) -> NodeId {
        let children = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_top_level_part())
            .map(|(i, _)| NodeId(i as u32))
            .collect();
        let root = self.add_group(name, children);
        self.root = Some(root);
        root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn meshes(&self) -> &[MeshPart] {
        &self.meshes
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn textures(&self) -> &[TextureAsset] {
        &self.textures
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshPart> {
        self.meshes.get(id.index())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(MeshPart::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshPart::triangle_count).sum()
    }

    /// Check every cross reference before export
    pub fn validate(&self) -> Result<(), SceneError> {
        for (i, node) in self.nodes.iter().enumerate() {
            let id = NodeId(i as u32);
            match &node.kind {
                NodeKind::Mesh(mesh) => {
                    if mesh.index() >= self.meshes.len() {
                        return Err(SceneError::DanglingMesh {
                            node: id,
                            mesh: *mesh,
                        });
                    }
                }
                NodeKind::Group(children) => {
                    // Children always precede their group, which also rules out cycles
                    if let Some(&child) = children.iter().find(|c| c.index() >= i) {
                        return Err(SceneError::DanglingChild { node: id, child });
                    }
                }
            }
        }

        for (i, part) in self.meshes.iter().enumerate() {
            let id = MeshId(i as u32);
            if part.is_empty() {
                return Err(SceneError::EmptyMesh(id));
            }
            if !part.indices_valid() {
                return Err(SceneError::InvalidIndices(id));
            }
            if let Some(material) = part.material {
                if material.index() >= self.materials.len() {
                    return Err(SceneError::DanglingMaterial { mesh: id, material });
                }
            }
        }

        for (i, material) in self.materials.iter().enumerate() {
            if let Some(texture) = material
                .texture_refs()
                .find(|t| t.index() >= self.textures.len())
            {
                return Err(SceneError::DanglingTexture {
                    material: MaterialId(i as u32),
                    texture,
                });
            }
        }

        match self.root {
            Some(root) if root.index() >= self.nodes.len() => Err(SceneError::MissingRoot(root)),
            _ => Ok(()),
        }
    }
}
