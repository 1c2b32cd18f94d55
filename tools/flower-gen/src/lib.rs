//! flower-gen library
//!
//! Paints flowers from pattern functions and lifts the painted petal layers
//! into textured 3D models exported as GLB.
//!
//! # Example
//!
//! ```no_run
//! use flower_gen::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(42);
//! let record = FlowerRecord::random(PetalParams::default(), &mut rng);
//!
//! let image = record.paint(&NoiseRealizer, DrawMode::TrunkAndPetals);
//! texture::write_png(&image, std::path::Path::new("flower.png")).unwrap();
//!
//! let params = FlowerParameters::default();
//! let scene = build_model(&record, &params, &NoiseRealizer, &mut rng, "0").unwrap();
//! write_glb(&scene, std::path::Path::new("flower.glb")).unwrap();
//! ```

pub mod contour;
pub mod error;
pub mod export;
pub mod flower;
pub mod mesh;
pub mod paint;
pub mod params;
pub mod pattern;
pub mod scene;
pub mod texture;

pub use error::{FlowerError, Result};
pub use export::{to_glb, write_glb};
pub use flower::{FlowerRecord, build_model, light_hints};
pub use mesh::{MeshError, MeshPart};
pub use paint::{DrawMode, RadialPainter, paint_flower};
pub use params::{FlowerParameters, PetalParams, Sex};
pub use pattern::{FnPattern, GenomeRealizer, NoisePattern, NoiseRealizer, PatternFunction};
pub use scene::{SceneError, SceneGraph};
pub use texture::Canvas;
