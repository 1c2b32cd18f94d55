//! Raster canvases and the textures derived from them
//!
//! A [`Canvas`] is the RGBA surface the petal painter draws into. The same
//! canvas feeds contour tracing, normal/emissive synthesis and PNG export.
//!
//! # Example
//! ```no_run
//! use flower_gen::texture::*;
//! use rand::SeedableRng;
//!
//! let mut canvas = Canvas::new(64, 64);
//! canvas.set_pixel(32, 32, [255, 0, 0, 255]);
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
//! let normals = normal_from_petal(&canvas, &NoiseOptions::petal(), &mut rng);
//! write_png(&normals, std::path::Path::new("normals.png")).unwrap();
//! ```

mod canvas;
mod emissive;
mod export;
mod normal;

// Core type
pub use canvas::{Canvas, TRANSPARENT};

// Derived maps
pub use emissive::{EmissiveOptions, color_distance, emissive_from_petal, emissive_intensity};
pub use normal::{NoiseOptions, normal_from_petal};

// Export
pub use export::{encode_png, write_png};
