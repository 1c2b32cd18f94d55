//! glTF binary export of an assembled flower
//!
//! Scene arenas map one-to-one onto glTF arrays: mesh `i` becomes glTF mesh
//! `i`, node `i` becomes node `i`, and so on. Textures are PNG-encoded into
//! the binary chunk and share a single linear, repeating sampler.

use crate::error::{FlowerError, Result};
use crate::scene::{Material, NodeKind, SceneGraph, TextureId};
use crate::texture::encode_png;
use glb_builder::{
    BufferBuilder, GltfBuilder, MeshBuilder, assemble_glb, extras_from_json, from_json_value, json,
};
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Written to `asset.generator`
pub const GENERATOR: &str = concat!("flower-gen ", env!("CARGO_PKG_VERSION"));

const LINEAR: u32 = 9729;
const LINEAR_MIPMAP_LINEAR: u32 = 9987;
const REPEAT: u32 = 10497;

fn export_err(e: impl std::fmt::Display) -> FlowerError {
    FlowerError::ExportFailed(e.to_string())
}

fn texture_info(texture: TextureId) -> Value {
    json!({ "index": texture.0, "texCoord": 0 })
}

fn insert_texture(object: &mut Map<String, Value>, key: &str, texture: Option<TextureId>) {
    if let Some(texture) = texture {
        object.insert(key.to_string(), texture_info(texture));
    }
}

/// glTF JSON for a material, including any KHR extension blocks
///
/// Returns the names of the extensions the material uses alongside it.
pub fn material_json(material: &Material) -> (Value, Vec<&'static str>) {
    let mut pbr = Map::new();
    pbr.insert("baseColorFactor".into(), json!(material.base_color_factor));
    pbr.insert("metallicFactor".into(), json!(material.metallic_factor));
    pbr.insert("roughnessFactor".into(), json!(material.roughness_factor));
    insert_texture(&mut pbr, "baseColorTexture", material.base_color_texture);
    insert_texture(
        &mut pbr,
        "metallicRoughnessTexture",
        material.metallic_roughness_texture,
    );

    let mut object = Map::new();
    object.insert("name".into(), json!(material.name));
    object.insert("pbrMetallicRoughness".into(), Value::Object(pbr));
    if let Some(normal) = material.normal_texture {
        object.insert(
            "normalTexture".into(),
            json!({ "index": normal.0, "texCoord": 0, "scale": 1.0 }),
        );
    }
    if let Some(occlusion) = material.occlusion_texture {
        object.insert(
            "occlusionTexture".into(),
            json!({ "index": occlusion.0, "texCoord": 0, "strength": material.occlusion_strength }),
        );
    }
    insert_texture(&mut object, "emissiveTexture", material.emissive_texture);
    if material.emissive_factor != [0.0; 3] {
        object.insert("emissiveFactor".into(), json!(material.emissive_factor));
    }
    object.insert("doubleSided".into(), json!(material.double_sided));
    object.insert("alphaMode".into(), json!(material.alpha_mode.as_str()));
    if material.alpha_mode == crate::scene::AlphaMode::Mask {
        object.insert("alphaCutoff".into(), json!(material.alpha_cutoff));
    }

    let mut extensions = Map::new();
    let mut used = Vec::new();

    if let Some(transmission) = &material.transmission {
        let mut block = Map::new();
        block.insert("transmissionFactor".into(), json!(transmission.factor));
        insert_texture(&mut block, "transmissionTexture", transmission.texture);
        extensions.insert("KHR_materials_transmission".into(), Value::Object(block));
        used.push("KHR_materials_transmission");
    }
    if let Some(volume) = &material.volume {
        let mut block = Map::new();
        block.insert("thicknessFactor".into(), json!(volume.thickness_factor));
        insert_texture(&mut block, "thicknessTexture", volume.thickness_texture);
        if volume.attenuation_distance.is_finite() {
            block.insert(
                "attenuationDistance".into(),
                json!(volume.attenuation_distance),
            );
        }
        block.insert("attenuationColor".into(), json!(volume.attenuation_color));
        extensions.insert("KHR_materials_volume".into(), Value::Object(block));
        used.push("KHR_materials_volume");
    }
    if let Some(clearcoat) = &material.clearcoat {
        let mut block = Map::new();
        block.insert("clearcoatFactor".into(), json!(clearcoat.factor));
        insert_texture(&mut block, "clearcoatTexture", clearcoat.texture);
        block.insert(
            "clearcoatRoughnessFactor".into(),
            json!(clearcoat.roughness_factor),
        );
        insert_texture(
            &mut block,
            "clearcoatRoughnessTexture",
            clearcoat.roughness_texture,
        );
        insert_texture(&mut block, "clearcoatNormalTexture", clearcoat.normal_texture);
        extensions.insert("KHR_materials_clearcoat".into(), Value::Object(block));
        used.push("KHR_materials_clearcoat");
    }
    if let Some(ior) = material.ior {
        extensions.insert("KHR_materials_ior".into(), json!({ "ior": ior }));
        used.push("KHR_materials_ior");
    }
    if let Some(strength) = material.emissive_strength {
        extensions.insert(
            "KHR_materials_emissive_strength".into(),
            json!({ "emissiveStrength": strength }),
        );
        used.push("KHR_materials_emissive_strength");
    }
    if !extensions.is_empty() {
        object.insert("extensions".into(), Value::Object(extensions));
    }

    (Value::Object(object), used)
}

fn default_sampler() -> Result<json::texture::Sampler> {
    from_json_value(json!({
        "magFilter": LINEAR,
        "minFilter": LINEAR_MIPMAP_LINEAR,
        "wrapS": REPEAT,
        "wrapT": REPEAT,
    }))
    .map_err(export_err)
}

fn gltf_node(scene: &SceneGraph, index: usize) -> Result<json::Node> {
    let node = &scene.nodes()[index];
    let (mesh, children) = match &node.kind {
        NodeKind::Mesh(mesh) => (Some(json::Index::new(mesh.0)), None),
        NodeKind::Group(children) => (
            None,
            Some(children.iter().map(|c| json::Index::new(c.0)).collect()),
        ),
    };
    let extras = match &node.extras {
        Some(value) => extras_from_json(value).map_err(export_err)?,
        None => Default::default(),
    };

    Ok(json::Node {
        camera: None,
        children,
        extensions: Default::default(),
        extras,
        matrix: None,
        mesh,
        name: Some(node.name.clone()),
        rotation: None,
        scale: None,
        skin: None,
        translation: None,
        weights: None,
    })
}

/// Nodes the scene lists directly: the root if one is set, otherwise every
/// node no group claims as a child
fn scene_roots(scene: &SceneGraph) -> Vec<u32> {
    if let Some(root) = scene.root() {
        return vec![root.0];
    }
    let claimed: BTreeSet<u32> = scene
        .nodes()
        .iter()
        .filter_map(|n| match &n.kind {
            NodeKind::Group(children) => Some(children.iter().map(|c| c.0)),
            NodeKind::Mesh(_) => None,
        })
        .flatten()
        .collect();
    (0..scene.nodes().len() as u32)
        .filter(|i| !claimed.contains(i))
        .collect()
}

/// Serialize `scene` into a self-contained GLB
///
/// The scene is validated first; any failure yields an error and no bytes.
pub fn to_glb(scene: &SceneGraph) -> Result<Vec<u8>> {
    scene.validate()?;

    let mut buffer = BufferBuilder::new();
    let mut meshes = Vec::with_capacity(scene.meshes().len());
    for part in scene.meshes() {
        let mut builder = MeshBuilder::new()
            .positions(&part.positions())
            .indices(part.indices());
        if let Some(normals) = part.normals() {
            builder = builder.normals(&normals);
        }
        if let Some(uvs) = part.uvs() {
            builder = builder.uvs(&uvs);
        }
        if let Some(material) = part.material {
            builder = builder.material(material.0);
        }
        meshes.push((part.name.as_str(), builder.build(&mut buffer)));
    }

    let mut images = Vec::with_capacity(scene.textures().len());
    for texture in scene.textures() {
        let png = encode_png(&texture.image).map_err(export_err)?;
        images.push((texture.name.as_str(), buffer.pack_bytes(&png)));
    }

    let mut gltf = GltfBuilder::new().buffer_byte_length(buffer.data().len() as u64);
    for (name, accessors) in &meshes {
        gltf = gltf.add_mesh_from_accessors(name, accessors);
    }

    for material in scene.materials() {
        let (value, used) = material_json(material);
        gltf = gltf.add_material(from_json_value(value).map_err(export_err)?);
        for extension in used {
            gltf = gltf.use_extension(extension);
        }
    }

    if !scene.textures().is_empty() {
        gltf = gltf.add_sampler(default_sampler()?);
    }
    for (name, view) in images {
        let image = gltf.image_count();
        gltf = gltf
            .add_image_view(name, "image/png", view)
            .add_texture(name, image, Some(0));
    }

    for index in 0..scene.nodes().len() {
        gltf = gltf.add_node(gltf_node(scene, index)?);
    }
    if let Some(extras) = &scene.extras {
        gltf = gltf.extras(extras_from_json(extras).map_err(export_err)?);
    }
    gltf = gltf.add_scene(&scene.name, &scene_roots(scene));

    let root = gltf.build(buffer.views(), buffer.accessors(), GENERATOR);
    let glb = assemble_glb(&root, buffer.data()).map_err(export_err)?;
    info!(
        "exported {}: {} meshes, {} textures, {} bytes",
        scene.name,
        scene.meshes().len(),
        scene.textures().len(),
        glb.len()
    );
    Ok(glb)
}

/// Export `scene` and write it to `path`
pub fn write_glb(scene: &SceneGraph, path: &Path) -> Result<()> {
    let glb = to_glb(scene)?;
    std::fs::write(path, glb)?;
    Ok(())
}
