//! Outline extraction for painted layers
//!
//! [`trace_boundary`] walks the outer edge of the first opaque region of an
//! RGBA buffer; [`simplify`] thins that outline with Douglas-Peucker so the
//! petal loft works on a handful of points instead of every edge pixel.

mod simplify;
mod trace;

pub use simplify::{segment_distance_sq, simplify};
pub use trace::{NEIGHBORS, trace_boundary, trace_canvas};

/// Integer pixel coordinate on a contour
pub type Point = glam::IVec2;
