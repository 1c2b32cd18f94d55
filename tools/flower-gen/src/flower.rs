//! Flower records and the pipelines built on them
//!
//! A record carries the genomes and petal shape of one flower. From it we
//! paint the 2D flower image, or reconstruct a full 3D scene: stem, pistil,
//! stamens, and one lofted petal layer per painted layer image.

use crate::contour::{simplify, trace_canvas};
use crate::error::{FlowerError, Result};
use crate::mesh::{
    MeshError, PetalLoft, generate_petal_layer, generate_pistil, generate_stamen, generate_stem,
    stamen_ring,
};
use crate::paint::{DrawMode, RadialPainter, paint_flower};
use crate::params::{FlowerParameters, PetalParams};
use crate::pattern::GenomeRealizer;
use crate::scene::{Material, MaterialId, Node, SceneGraph, TextureAsset};
use crate::texture::{
    Canvas, EmissiveOptions, NoiseOptions, emissive_from_petal, emissive_intensity,
    normal_from_petal,
};
use glam::Vec3;
use rand::Rng;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

/// Index of the genome that drives petal painting
pub const PETAL_GENOME: usize = 1;
/// Index of the genome reserved for ecological stats
pub const STATS_GENOME: usize = 0;

/// Height of the emissive light hint above the peak ring
const LIGHT_LIFT: f64 = 0.0025;

/// One flower: its genomes and petal shape
#[derive(Debug, Clone, PartialEq)]
pub struct FlowerRecord {
    pub genomes: Vec<Value>,
    pub petals: PetalParams,
}

fn missing(field: &str) -> FlowerError {
    FlowerError::InvalidArgument(format!("flower record is missing `{field}`"))
}

impl FlowerRecord {
    /// Parse `{"Flower": {"dna": {"genomes": [...]}, "petals": {...}}}`
    pub fn from_value(value: &Value) -> Result<Self> {
        let flower = value.get("Flower").ok_or_else(|| missing("Flower"))?;
        let dna = flower.get("dna").ok_or_else(|| missing("Flower.dna"))?;
        let genomes = dna
            .get("genomes")
            .and_then(Value::as_array)
            .ok_or_else(|| missing("Flower.dna.genomes"))?;
        if genomes.len() <= PETAL_GENOME {
            return Err(FlowerError::InvalidArgument(format!(
                "`Flower.dna.genomes` needs a stats and a petal genome, found {}",
                genomes.len()
            )));
        }

        let petals = flower.get("petals").ok_or_else(|| missing("Flower.petals"))?;
        let petals: PetalParams = serde_json::from_value(petals.clone()).map_err(|e| {
            FlowerError::InvalidArgument(format!("malformed `Flower.petals`: {e}"))
        })?;
        petals.validate()?;

        Ok(Self {
            genomes: genomes.clone(),
            petals,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// A fresh record whose genomes are random noise seeds
    pub fn random<R: Rng + ?Sized>(petals: PetalParams, rng: &mut R) -> Self {
        let stats = json!({"inputs": 4, "outputs": 14, "seed": rng.random::<u32>()});
        let petal = json!({"inputs": 4, "outputs": 4, "seed": rng.random::<u32>()});
        Self {
            genomes: vec![stats, petal],
            petals,
        }
    }

    pub fn petal_genome(&self) -> &Value {
        &self.genomes[PETAL_GENOME]
    }

    pub fn stats_genome(&self) -> &Value {
        &self.genomes[STATS_GENOME]
    }

    pub fn to_json(&self) -> Value {
        json!({
            "Flower": {
                "dna": {"genomes": self.genomes},
                "petals": self.petals,
            }
        })
    }

    /// Paint the 2D flower image
    pub fn paint<G: GenomeRealizer>(&self, realizer: &G, mode: DrawMode) -> Canvas {
        paint_flower(realizer.realize(self.petal_genome()), self.petals, mode)
    }
}

/// Materials shared by every part of one flower
struct PartMaterials {
    stem: MaterialId,
    style: MaterialId,
    stigma: MaterialId,
    filament: MaterialId,
    anther: MaterialId,
}

impl PartMaterials {
    fn add_to(scene: &mut SceneGraph) -> Self {
        Self {
            stem: scene.add_material(Material::stem()),
            style: scene.add_material(Material::pistil_style()),
            stigma: scene.add_material(Material::pistil_stigma(None)),
            filament: scene.add_material(Material::stamen_filament()),
            anther: scene.add_material(Material::stamen_anther(None)),
        }
    }
}

/// Reconstruct a 3D flower from `record`
///
/// Geometry units that cannot be built are logged and left out; only a
/// malformed scene is an error. `rng` drives the normal map noise.
pub fn build_model<G, R>(
    record: &FlowerRecord,
    params: &FlowerParameters,
    realizer: &G,
    rng: &mut R,
    model_id: &str,
) -> Result<SceneGraph>
where
    G: GenomeRealizer,
    R: Rng + ?Sized,
{
    let mut scene = SceneGraph::new(format!("Flower_{model_id}_Scene"));
    let materials = PartMaterials::add_to(&mut scene);
    let stem_top = Vec3::Y * params.stem_height;

    match generate_stem(params) {
        Ok(stem) => {
            scene.add_mesh_node("Stem_Node", stem.with_material(materials.stem));
        }
        Err(e) => warn!("skipping stem: {}", e),
    }

    if params.sex.has_pistil() {
        add_pistil(&mut scene, stem_top, params, &materials, 0);
    }

    if params.sex.has_stamens() {
        let roots = stamen_ring(stem_top, params.stamen_ring_radius, params.stamen_count);
        for (id, root) in roots.into_iter().enumerate() {
            add_stamen(&mut scene, root, params, &materials, id as u32);
        }
    }

    let petals = record.petals;
    let mut painter = RadialPainter::new(realizer.realize(record.petal_genome()), petals);
    let loft = PetalLoft::from_params(params);
    for layer in (0..=petals.num_layers).rev() {
        let image = painter.draw_layer(layer, true);
        let depth = (petals.num_layers - layer) as f32;
        let base_y = params.stem_height + depth * params.layer_vertical_spacing;

        match add_petal_layer(&mut scene, layer, image, base_y, params, &loft, rng) {
            Ok(()) => debug!("petal layer {} added", layer),
            Err(e) => warn!("skipping petal layer {}: {}", layer, e),
        }
    }

    scene.add_root_group(format!("Flower_{model_id}_Node"));
    let parameters = params.to_json()?;
    scene.extras = Some(json!({
        "description": "Generated 3d flower",
        "vertices": scene.vertex_count(),
        "textureCoordinates": scene.vertex_count(),
        "normals": scene.vertex_count(),
        "faces": scene.triangle_count(),
        "parameters": parameters,
    }));
    scene.validate()?;

    info!(
        "built flower {}: {} meshes, {} vertices, {} triangles",
        model_id,
        scene.meshes().len(),
        scene.vertex_count(),
        scene.triangle_count()
    );
    Ok(scene)
}

fn add_pistil(
    scene: &mut SceneGraph,
    base: Vec3,
    params: &FlowerParameters,
    materials: &PartMaterials,
    id: u32,
) {
    match generate_pistil(base, params, id) {
        Ok((style, stigma)) => {
            let style = scene.add_mesh_node(
                format!("Pistil_Style_Node_{id}"),
                style.with_material(materials.style),
            );
            let stigma = scene.add_mesh_node(
                format!("Stigma_Node_{id}"),
                stigma.with_material(materials.stigma),
            );
            scene.add_group(format!("Pistil_Group_Node_{id}"), vec![style, stigma]);
        }
        Err(e) => warn!("skipping pistil {}: {}", id, e),
    }
}

fn add_stamen(
    scene: &mut SceneGraph,
    root: Vec3,
    params: &FlowerParameters,
    materials: &PartMaterials,
    id: u32,
) {
    match generate_stamen(root, params, id) {
        Ok((filament, anther)) => {
            let filament = scene.add_mesh_node(
                format!("Stamen_Filament_Node_{id}"),
                filament.with_material(materials.filament),
            );
            let anther = scene.add_mesh_node(
                format!("Stamen_Anther_Node_{id}"),
                anther.with_material(materials.anther),
            );
            scene.add_group(format!("Stamen_Group_Node_{id}"), vec![filament, anther]);
        }
        Err(e) => warn!("skipping stamen {}: {}", id, e),
    }
}

/// Trace, loft and texture one layer image; nothing is added on failure
fn add_petal_layer<R: Rng + ?Sized>(
    scene: &mut SceneGraph,
    layer: i32,
    image: Canvas,
    base_y: f32,
    params: &FlowerParameters,
    loft: &PetalLoft,
    rng: &mut R,
) -> std::result::Result<(), MeshError> {
    let boundary = trace_canvas(&image, params.alpha_threshold).ok_or(MeshError::NoBoundary)?;
    let outline = simplify(&boundary, params.contour_simplification_tolerance);
    debug!(
        "layer {}: {} boundary points, {} after simplification",
        layer,
        boundary.len(),
        outline.len()
    );

    let part = generate_petal_layer(
        format!("Petal_Layer_Mesh_{layer}"),
        &outline,
        image.size(),
        base_y,
        loft,
    )?;

    let texture = scene.add_texture(TextureAsset::from_canvas(
        format!("Petal_Layer_Texture_{layer}"),
        image.clone(),
    ));

    let normal = params.use_normals.then(|| {
        let map = normal_from_petal(&image, &NoiseOptions::petal(), rng);
        scene.add_texture(TextureAsset::from_canvas(
            format!("Petal_Layer_Normal_{layer}"),
            map,
        ))
    });

    let mut lights = None;
    let emissive = params.use_emissive.then(|| {
        let options = EmissiveOptions::petal();
        lights = Some(light_hints(&image, base_y, loft, &options));
        scene.add_texture(TextureAsset::from_canvas(
            format!("Petal_Layer_Emissive_{layer}"),
            emissive_from_petal(&image, &options),
        ))
    });

    let material = scene.add_material(Material::petal(
        format!("Petal_Layer_Material_{layer}"),
        Some(texture),
        normal,
        emissive,
    ));

    let mesh = scene.add_mesh(part.with_material(material));
    let mut node = Node::mesh(format!("Petal_Layer_Node_{layer}"), mesh);
    if let Some(lights) = lights {
        node = node.with_extras(json!({ "lights": lights }));
    }
    scene.add_node(node);
    Ok(())
}

/// Point-light hints for a glowing petal layer, one at the flower center
///
/// The light sits on the flower axis, `LIGHT_LIFT` above the peak ring.
/// A center sample has no droop, so only its height depends on the layer.
/// Empty when the center pixel is black or transparent or too dim.
pub fn light_hints(
    image: &Canvas,
    base_y: f32,
    loft: &PetalLoft,
    options: &EmissiveOptions,
) -> Vec<Value> {
    let (width, height) = image.size();
    let center = image.get_pixel(width as i32 / 2, height as i32 / 2);
    if center == [0, 0, 0, 255] || center[3] == 0 {
        return Vec::new();
    }
    let intensity = emissive_intensity(center, center, options);
    if intensity < 1e-2 {
        return Vec::new();
    }

    let [r, g, b, _] = center.map(u32::from);
    let peak_y = loft.peak_y(base_y as f64) + LIGHT_LIFT;
    let radius = width as f64 * 0.5 * 1.5 * loft.scale;
    vec![json!({
        "type": "PointLight",
        "color": (r << 16) | (g << 8) | b,
        "intensity": intensity as f64 / 100.0,
        "position": [0.0, peak_y, 0.0],
        "radius": radius,
        "decay": 2.0,
    })]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{FnPattern, PatternInputs};
    use crate::scene::NodeKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Realizes every genome as a solid disc painter
    struct DiscRealizer([f64; 3]);

    impl GenomeRealizer for DiscRealizer {
        type Pattern = FnPattern<Box<dyn FnMut(PatternInputs) -> [f64; 4]>>;

        fn realize(&self, _genome: &Value) -> Self::Pattern {
            let [r, g, b] = self.0;
            FnPattern(Box::new(move |_: PatternInputs| [r, g, b, 1.0]))
        }
    }

    fn record(radius: i32, num_layers: i32) -> FlowerRecord {
        FlowerRecord {
            genomes: vec![json!({"id": 0}), json!({"id": 1})],
            petals: PetalParams {
                radius,
                num_layers,
                p: 6.0,
                bias: 1.0,
            },
        }
    }

    #[test]
    fn test_record_round_trip() {
        let original = record(32, 2);
        let parsed = FlowerRecord::from_value(&original.to_json()).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.petal_genome(), &json!({"id": 1}));
        assert_eq!(parsed.stats_genome(), &json!({"id": 0}));
    }

    #[test]
    fn test_record_names_missing_field() {
        let cases = [
            (json!({}), "`Flower`"),
            (json!({"Flower": {}}), "`Flower.dna`"),
            (json!({"Flower": {"dna": {}}}), "`Flower.dna.genomes`"),
            (
                json!({"Flower": {"dna": {"genomes": [{}, {}]}}}),
                "`Flower.petals`",
            ),
        ];
        for (value, field) in cases {
            match FlowerRecord::from_value(&value) {
                Err(FlowerError::InvalidArgument(msg)) => assert!(msg.contains(field), "{msg}"),
                other => panic!("expected invalid argument for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_record_needs_petal_genome() {
        let value = json!({"Flower": {
            "dna": {"genomes": [{}]},
            "petals": {"radius": 8, "numLayers": 1, "P": 6.0, "bias": 1.0},
        }});
        assert!(matches!(
            FlowerRecord::from_value(&value),
            Err(FlowerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_random_record_is_seeded() {
        let mut a = Pcg32::seed_from_u64(5);
        let mut b = Pcg32::seed_from_u64(5);
        let petals = PetalParams::default();
        assert_eq!(
            FlowerRecord::random(petals, &mut a),
            FlowerRecord::random(petals, &mut b)
        );
    }

    #[test]
    fn test_build_model_structure() {
        let params = FlowerParameters::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let scene = build_model(
            &record(32, 2),
            &params,
            &DiscRealizer([1.0, 0.5, 0.0]),
            &mut rng,
            "test",
        )
        .unwrap();

        assert_eq!(scene.name, "Flower_test_Scene");
        for name in [
            "Stem_Node",
            "Pistil_Group_Node_0",
            "Stigma_Node_0",
            "Stamen_Group_Node_5",
            "Petal_Layer_Node_0",
            "Petal_Layer_Node_2",
        ] {
            assert!(scene.find_node(name).is_some(), "missing {name}");
        }

        let root = scene.root().unwrap();
        assert_eq!(root.index(), scene.nodes().len() - 1);
        match &scene.node(root).unwrap().kind {
            // stem + pistil group + 6 stamen groups + 3 petal layers
            NodeKind::Group(children) => assert_eq!(children.len(), 11),
            other => panic!("expected group, got {other:?}"),
        }

        // Color, normal map per layer; no emissive by default
        assert_eq!(scene.textures().len(), 6);
        assert!(scene.meshes().iter().all(|m| m.material.is_some()));
    }

    #[test]
    fn test_build_model_respects_sex() {
        let params = FlowerParameters {
            sex: crate::params::Sex::Female,
            use_normals: false,
            ..FlowerParameters::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let scene = build_model(&record(16, 0), &params, &DiscRealizer([1.0; 3]), &mut rng, "f")
            .unwrap();

        assert!(scene.find_node("Pistil_Group_Node_0").is_some());
        assert!(scene.find_node("Stamen_Group_Node_0").is_none());
        assert_eq!(scene.textures().len(), 1);
    }

    #[test]
    fn test_blank_layers_are_skipped() {
        struct Blank;
        impl GenomeRealizer for Blank {
            type Pattern = FnPattern<fn(PatternInputs) -> [f64; 4]>;
            fn realize(&self, _: &Value) -> Self::Pattern {
                // An undefined cut stops every ray before it paints
                FnPattern(|_: PatternInputs| [0.0, 0.0, 0.0, f64::NAN])
            }
        }

        let params = FlowerParameters::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let scene = build_model(&record(16, 1), &params, &Blank, &mut rng, "b").unwrap();

        assert!(scene.find_node("Stem_Node").is_some());
        assert!(scene.find_node("Petal_Layer_Node_0").is_none());
        assert!(scene.find_node("Petal_Layer_Node_1").is_none());
        assert!(scene.textures().is_empty());
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_emissive_layers_carry_lights() {
        let params = FlowerParameters {
            use_emissive: true,
            ..FlowerParameters::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let scene = build_model(
            &record(16, 0),
            &params,
            &DiscRealizer([1.0, 1.0, 0.0]),
            &mut rng,
            "e",
        )
        .unwrap();

        let node = scene.node(scene.find_node("Petal_Layer_Node_0").unwrap()).unwrap();
        let lights = node.extras.as_ref().unwrap()["lights"].as_array().unwrap();
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0]["color"], json!(0xFFFF00));
        assert_eq!(lights[0]["type"], json!("PointLight"));

        let material = scene
            .materials()
            .iter()
            .find(|m| m.name == "Petal_Layer_Material_0")
            .unwrap();
        assert!(material.emissive_texture.is_some());
        assert_eq!(material.emissive_strength, Some(1.0));
    }

    #[test]
    fn test_light_hints_skip_dark_center() {
        let loft = PetalLoft::from_params(&FlowerParameters::default());
        let options = EmissiveOptions::petal();

        let black = Canvas::filled(8, 8, [0, 0, 0, 255]);
        assert!(light_hints(&black, 0.5, &loft, &options).is_empty());
        let clear = Canvas::new(8, 8);
        assert!(light_hints(&clear, 0.5, &loft, &options).is_empty());

        let lit = Canvas::filled(8, 8, [10, 20, 30, 255]);
        let hints = light_hints(&lit, 0.5, &loft, &options);
        assert_eq!(hints[0]["color"], json!((10 << 16) | (20 << 8) | 30));
        let radius = hints[0]["radius"].as_f64().unwrap();
        assert!((radius - 4.0 * 1.5 * loft.scale).abs() < 1e-9);
    }

    #[test]
    fn test_light_hint_sits_above_peak_ring() {
        let params = FlowerParameters::default();
        let loft = PetalLoft::from_params(&params);
        let lit = Canvas::filled(9, 7, [200, 180, 40, 255]);
        let hints = light_hints(&lit, 0.5, &loft, &EmissiveOptions::petal());

        let position: Vec<f64> = hints[0]["position"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        let expected_y = 0.5
            + params.connection_vertical_offset as f64
            + params.peak_height_offset as f64
            + 0.0025;
        assert_eq!(position[0], 0.0);
        assert!((position[1] - expected_y).abs() < 1e-6);
        assert_eq!(position[2], 0.0);
    }
}
