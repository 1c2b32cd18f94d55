//! Stem, pistil and stamen geometry
//!
//! Each part is a fixed profile scaled by [`FlowerParameters`] and swept
//! with [`generate_segmented_cylinder`]. Parts come back as finished
//! [`MeshPart`]s; wiring them into a scene is left to the caller.

use super::{Caps, MeshError, MeshPart, ProfileNode, generate_segmented_cylinder, generate_stigma};
use crate::params::FlowerParameters;
use glam::Vec3;

/// Style heights and radii as fractions of the configured style size
const STYLE_PROFILE: [(f32, f32); 5] = [(0.0, 1.0), (0.2, 1.0), (0.5, 0.8), (0.7, 0.7), (1.0, 0.6)];
const FILAMENT_PROFILE: [(f32, f32); 3] = [(0.0, 1.0), (0.2, 0.5), (1.0, 0.15)];
/// Anther heights as fractions of the anther height, radii as fractions of
/// the filament radius
const ANTHER_PROFILE: [(f32, f32); 6] = [
    (0.0, 0.1),
    (0.2, 0.2),
    (0.4, 0.4),
    (0.6, 0.6),
    (0.8, 0.4),
    (1.0, 0.01),
];

/// Stamens start this far below the stem top
const STAMEN_SINK: f32 = 0.01;
/// Anthers overlap their filament by this much
const ANTHER_OVERLAP: f32 = 0.001;

fn vertical_profile(base: Vec3, height: f32, radius: f32, shape: &[(f32, f32)]) -> Vec<ProfileNode> {
    shape
        .iter()
        .map(|&(h, r)| ProfileNode::circle(base + Vec3::Y * (height * h), radius * r))
        .collect()
}

/// Stem cylinder from the origin up to `stem_height`, capped at both ends
pub fn generate_stem(params: &FlowerParameters) -> Result<MeshPart, MeshError> {
    let profile = [
        ProfileNode::circle(Vec3::ZERO, params.stem_radius),
        ProfileNode::circle(Vec3::Y * params.stem_height, params.stem_radius),
    ];
    let mut part = MeshPart::new("Stem");
    generate_segmented_cylinder(&mut part, &profile, params.stem_segments, Caps::BOTH, false)?;
    Ok(part)
}

/// Five-node style tapering to 60% of its radius, centered on the flower axis
pub fn pistil_style_profile(base: Vec3, params: &FlowerParameters) -> Vec<ProfileNode> {
    let base = Vec3::new(0.0, base.y, 0.0);
    vertical_profile(
        base,
        params.pistil_style_height,
        params.pistil_style_radius,
        &STYLE_PROFILE,
    )
}

/// Three-node stamen filament, starting just below `position`
pub fn filament_profile(position: Vec3, params: &FlowerParameters) -> Vec<ProfileNode> {
    let base = position - Vec3::Y * STAMEN_SINK;
    vertical_profile(
        base,
        params.stamen_filament_height,
        params.stamen_filament_radius,
        &FILAMENT_PROFILE,
    )
}

/// Six-node anther bulge sitting on top of the filament
pub fn anther_profile(position: Vec3, params: &FlowerParameters) -> Vec<ProfileNode> {
    let base = position - Vec3::Y * STAMEN_SINK
        + Vec3::Y * (params.stamen_filament_height - ANTHER_OVERLAP);
    vertical_profile(
        base,
        params.stamen_anther_height,
        params.stamen_filament_radius,
        &ANTHER_PROFILE,
    )
}

/// Pistil style and stigma meshes for the pistil at `base`
pub fn generate_pistil(
    base: Vec3,
    params: &FlowerParameters,
    id: u32,
) -> Result<(MeshPart, MeshPart), MeshError> {
    let segments = params.pistil_stigma_radial_segments;
    let profile = pistil_style_profile(base, params);

    let mut style = MeshPart::new(format!("Pistil_Style_Mesh_{id}"));
    generate_segmented_cylinder(&mut style, &profile, segments, Caps::BOTTOM, false)?;

    let mut stigma = MeshPart::new(format!("Pistil_Stigma_Mesh_{id}"));
    let tip = profile.last().ok_or(MeshError::TooFewProfileNodes(0))?;
    generate_stigma(&mut stigma, tip, params, segments, true)?;

    Ok((style, stigma))
}

/// Filament and anther meshes for the stamen rooted at `position`
pub fn generate_stamen(
    position: Vec3,
    params: &FlowerParameters,
    id: u32,
) -> Result<(MeshPart, MeshPart), MeshError> {
    let mut filament = MeshPart::new(format!("Stamen_Filament_Mesh_{id}"));
    generate_segmented_cylinder(
        &mut filament,
        &filament_profile(position, params),
        params.stamen_filament_radial_segments,
        Caps::BOTH,
        false,
    )?;

    let mut anther = MeshPart::new(format!("Stamen_Anther_Mesh_{id}"));
    generate_segmented_cylinder(
        &mut anther,
        &anther_profile(position, params),
        params.stamen_anther_radial_segments,
        Caps::BOTH,
        true,
    )?;

    Ok((filament, anther))
}

/// Evenly spaced stamen roots on a circle around the flower axis at `center`
pub fn stamen_ring(center: Vec3, radius: f32, count: u32) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            center + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
        })
        .collect()
}
