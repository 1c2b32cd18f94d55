//! Procedural mesh generation for flower parts
//!
//! Everything here appends into a [`MeshPart`]: revolution surfaces swept
//! along profile curves (stem, pistil, stamens) and the lofted petal layer
//! built from a traced outline.

mod cylinder;
mod part;
mod parts;
mod petal;

pub use cylinder::{
    Caps, ProfileNode, default_orientation, generate_elliptical_cylinder_segment,
    generate_segmented_cylinder, generate_stigma,
};
pub use part::{MeshPart, Vertex};
pub use parts::{
    anther_profile, filament_profile, generate_pistil, generate_stamen, generate_stem,
    pistil_style_profile, stamen_ring,
};
pub use petal::{PetalLoft, generate_petal_layer};

/// Reasons a geometry unit could not be generated
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("radial segments must be at least 3, got {0}")]
    TooFewSegments(u32),

    #[error("radii must not be negative")]
    NegativeRadius,

    #[error("sweep axis is degenerate (length {0})")]
    DegenerateAxis(f32),

    #[error("profile needs at least 2 nodes, got {0}")]
    TooFewProfileNodes(usize),

    #[error("contour needs at least 3 points, got {0}")]
    TooFewContourPoints(usize),

    #[error("source image is empty")]
    EmptyImage,

    #[error("no opaque boundary found in layer image")]
    NoBoundary,
}
