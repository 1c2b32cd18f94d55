//! Tapered elliptical cylinders and the profile sweeps built from them

use super::{MeshError, MeshPart, Vertex};
use crate::params::FlowerParameters;
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

const EPSILON: f32 = 1e-6;

/// One cross-section of a swept profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileNode {
    pub center: Vec3,
    pub radius_x: f32,
    pub radius_z: f32,
    /// Preferred in-plane X direction; the sweep picks one when unset
    pub orientation: Option<Vec3>,
}

impl ProfileNode {
    pub fn new(center: Vec3, radius_x: f32, radius_z: f32) -> Self {
        Self {
            center,
            radius_x,
            radius_z,
            orientation: None,
        }
    }

    /// Circular cross-section
    pub fn circle(center: Vec3, radius: f32) -> Self {
        Self::new(center, radius, radius)
    }
}

/// Which ends of a segment or sweep get a flat cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caps {
    pub bottom: bool,
    pub top: bool,
}

impl Caps {
    pub const NONE: Caps = Caps {
        bottom: false,
        top: false,
    };
    pub const BOTH: Caps = Caps {
        bottom: true,
        top: true,
    };
    pub const BOTTOM: Caps = Caps {
        bottom: true,
        top: false,
    };
    pub const TOP: Caps = Caps {
        bottom: false,
        top: true,
    };
}

/// Default in-plane X direction for a unit axis
pub fn default_orientation(axis: Vec3) -> Vec3 {
    let mut u = if axis.x.abs() > 0.9 || axis.y.abs() > 0.9 {
        Vec3::Z
    } else {
        Vec3::X
    };
    if axis.dot(u).abs() > 0.99 {
        u = Vec3::Y;
    }
    (u - axis * axis.dot(u)).normalize()
}

/// In-plane basis `(u, v)` for a unit axis, honoring an override when it is
/// not parallel to the axis
fn ring_basis(axis: Vec3, orientation: Option<Vec3>) -> (Vec3, Vec3) {
    let u = match orientation.filter(|o| o.length_squared() > EPSILON) {
        Some(o) => {
            let projected = o - axis * axis.dot(o);
            if projected.length_squared() < EPSILON {
                default_orientation(axis)
            } else {
                projected.normalize()
            }
        }
        None => default_orientation(axis),
    };
    (u, axis.cross(u))
}

/// Add one ring of `segments` vertices and return their indices
fn add_ring(
    part: &mut MeshPart,
    center: Vec3,
    (u, v): (Vec3, Vec3),
    radius_x: f32,
    radius_z: f32,
    segments: u32,
    uv_v: Option<f32>,
) -> Vec<u32> {
    (0..segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let (sin, cos) = (t * TAU).sin_cos();
            let position = center + u * (cos * radius_x) + v * (sin * radius_z);
            let normal = if radius_x < EPSILON || radius_z < EPSILON {
                u * cos + v * sin
            } else {
                u * (cos / radius_x) + v * (sin / radius_z)
            };
            let uv = uv_v.map(|y| Vec2::new(t, y));
            part.add_vertex(Vertex::new(position, Some(normal.normalize()), uv))
        })
        .collect()
}

/// Add a flat fan over an existing ring, facing along `normal`
fn add_cap(part: &mut MeshPart, center: Vec3, ring: &[u32], normal: Vec3, uvs: bool, flip: bool) {
    let segments = ring.len();
    let hub = part.add_vertex(Vertex::new(
        center,
        Some(normal),
        uvs.then_some(Vec2::splat(0.5)),
    ));

    let rim: Vec<u32> = ring
        .iter()
        .enumerate()
        .map(|(i, &source)| {
            let position = part.vertices()[source as usize].position;
            let uv = uvs.then(|| {
                let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
                Vec2::new(0.5 + 0.5 * cos, 0.5 + 0.5 * sin)
            });
            part.add_vertex(Vertex::new(position, Some(normal), uv))
        })
        .collect();

    for i in 0..segments {
        let next = rim[(i + 1) % segments];
        if flip {
            part.add_triangle(hub, next, rim[i]);
        } else {
            part.add_triangle(hub, rim[i], next);
        }
    }
}

/// Append one tapered elliptical cylinder between two centers
///
/// Walls get `segments * 2` vertices and triangles. Each requested cap adds
/// a hub plus `segments` rim vertices, unless both radii at that end are
/// zero. On error nothing is appended.
pub fn generate_elliptical_cylinder_segment(
    part: &mut MeshPart,
    bottom: &ProfileNode,
    top: &ProfileNode,
    segments: u32,
    caps: Caps,
    uvs: bool,
    orientation: Option<Vec3>,
) -> Result<(), MeshError> {
    if segments < 3 {
        return Err(MeshError::TooFewSegments(segments));
    }
    if [bottom.radius_x, bottom.radius_z, top.radius_x, top.radius_z]
        .iter()
        .any(|&r| r < 0.0)
    {
        return Err(MeshError::NegativeRadius);
    }

    let axis = top.center - bottom.center;
    let height = axis.length();
    if height < EPSILON {
        return Err(MeshError::DegenerateAxis(height));
    }
    let axis = axis / height;
    let basis = ring_basis(axis, orientation);

    let bottom_ring = add_ring(
        part,
        bottom.center,
        basis,
        bottom.radius_x,
        bottom.radius_z,
        segments,
        uvs.then_some(0.0),
    );
    let top_ring = add_ring(
        part,
        top.center,
        basis,
        top.radius_x,
        top.radius_z,
        segments,
        uvs.then_some(1.0),
    );

    let n = segments as usize;
    for i in 0..n {
        let next = (i + 1) % n;
        part.add_triangle(bottom_ring[i], top_ring[i], top_ring[next]);
        part.add_triangle(bottom_ring[i], top_ring[next], bottom_ring[next]);
    }

    if caps.bottom && (bottom.radius_x > EPSILON || bottom.radius_z > EPSILON) {
        add_cap(part, bottom.center, &bottom_ring, -axis, uvs, true);
    }
    if caps.top && (top.radius_x > EPSILON || top.radius_z > EPSILON) {
        add_cap(part, top.center, &top_ring, axis, uvs, false);
    }

    part.has_normals = true;
    if uvs {
        part.has_uvs = true;
    }
    Ok(())
}

/// Sweep a profile as a chain of cylinder segments
///
/// The first segment's axis fixes one orientation for the whole sweep so it
/// does not twist; a node's own orientation overrides it for the segment
/// starting at that node. The base cap goes on the first segment only, the
/// tip cap on the last.
pub fn generate_segmented_cylinder(
    part: &mut MeshPart,
    profile: &[ProfileNode],
    segments: u32,
    caps: Caps,
    uvs: bool,
) -> Result<(), MeshError> {
    if profile.len() < 2 {
        return Err(MeshError::TooFewProfileNodes(profile.len()));
    }

    let first_axis = profile[1].center - profile[0].center;
    let sweep_orientation =
        (first_axis.length_squared() > EPSILON).then(|| default_orientation(first_axis.normalize()));

    let last = profile.len() - 2;
    for (i, pair) in profile.windows(2).enumerate() {
        let segment_caps = Caps {
            bottom: i == 0 && caps.bottom,
            top: i == last && caps.top,
        };
        let orientation = pair[0].orientation.or(sweep_orientation);
        generate_elliptical_cylinder_segment(
            part,
            &pair[0],
            &pair[1],
            segments,
            segment_caps,
            uvs,
            orientation,
        )?;
    }
    Ok(())
}

/// Pistil tip: widens from the style's top radius, then narrows to a point
pub fn generate_stigma(
    part: &mut MeshPart,
    style_top: &ProfileNode,
    params: &FlowerParameters,
    segments: u32,
    uvs: bool,
) -> Result<(), MeshError> {
    let height = params.pistil_stigma_height.max(0.001);
    let widest_x = style_top.radius_x * params.pistil_stigma_max_width_factor;
    let widest_z = style_top.radius_z * params.pistil_stigma_max_width_factor;
    let narrow = params.pistil_stigma_tip_narrow_factor;
    let base = style_top.center;

    let profile = [
        ProfileNode::new(base, style_top.radius_x, style_top.radius_z),
        ProfileNode::new(base + Vec3::Y * (height * 0.4), widest_x, widest_z),
        ProfileNode::new(base + Vec3::Y * height, widest_x * narrow, widest_z * narrow),
    ];
    generate_segmented_cylinder(part, &profile, segments, Caps::TOP, uvs)
}
