//! Petal layer lofting
//!
//! A traced outline becomes a drooping cup: three rings per outline point
//! (inner attachment ring, raised peak ring, and the outline itself pushed
//! out to its real radius and dropped by the droop term), stitched by two
//! wrapping triangle strips.

use super::{MeshError, MeshPart, Vertex};
use crate::contour::Point;
use crate::params::FlowerParameters;
use glam::{Vec2, Vec3};

/// Loft shape in world units, derived from [`FlowerParameters`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetalLoft {
    /// World units per source pixel
    pub scale: f64,
    pub connection_radius_px: f64,
    pub droop_start_radius_px: f64,
    pub peak_height_offset: f64,
    pub droop_factor: f64,
    pub connection_vertical_offset: f64,
}

impl PetalLoft {
    pub fn from_params(params: &FlowerParameters) -> Self {
        Self {
            scale: params.petal_scale_factor as f64,
            connection_radius_px: params.connection_radius_px as f64,
            droop_start_radius_px: params.droop_start_radius_px as f64,
            peak_height_offset: params.peak_height_offset as f64,
            droop_factor: params.petal_droop_factor as f64,
            connection_vertical_offset: params.connection_vertical_offset as f64,
        }
    }

    /// Height of the inner ring
    pub fn attachment_y(&self, base_y: f64) -> f64 {
        base_y + self.connection_vertical_offset
    }

    /// Height of the peak ring
    pub fn peak_y(&self, base_y: f64) -> f64 {
        self.attachment_y(base_y) + self.peak_height_offset
    }

    fn inner_radius(&self) -> f64 {
        self.connection_radius_px * self.scale
    }

    /// Peak ring radius, kept strictly outside the inner ring
    fn peak_radius(&self) -> f64 {
        let inner = self.inner_radius();
        let peak = self.droop_start_radius_px * self.scale;
        if peak > inner {
            peak
        } else if inner * 1.1 < 1e-15 {
            0.01
        } else {
            inner * 1.1
        }
    }
}

fn ring_vertex(radius: f64, y: f64, (cos, sin): (f64, f64), normal: Vec3, uv: Vec2) -> Vertex {
    let position = Vec3::new((radius * cos) as f32, y as f32, (radius * sin) as f32);
    Vertex::new(position, Some(normal.normalize()), Some(uv))
}

/// Polar UV around the image center, `radius_px` pixels out
fn polar_uv(radius_px: f64, (width, height): (f64, f64), (cos, sin): (f64, f64)) -> Vec2 {
    Vec2::new(
        (0.5 + radius_px / width * cos).clamp(0.0, 1.0) as f32,
        (0.5 - radius_px / height * sin).clamp(0.0, 1.0) as f32,
    )
}

/// Loft a simplified outline from a `width` x `height` layer image
///
/// Vertices are laid out as three blocks of `contour.len()`: inner ring,
/// peak ring, outline ring. Each outline point contributes four triangles.
pub fn generate_petal_layer(
    name: impl Into<String>,
    contour: &[Point],
    (width, height): (u32, u32),
    base_y: f32,
    loft: &PetalLoft,
) -> Result<MeshPart, MeshError> {
    if contour.len() < 3 {
        return Err(MeshError::TooFewContourPoints(contour.len()));
    }
    if width == 0 || height == 0 {
        return Err(MeshError::EmptyImage);
    }

    let size = (width as f64, height as f64);
    let center = (size.0 / 2.0, size.1 / 2.0);
    let base_y = base_y as f64;
    let attachment_y = loft.attachment_y(base_y);
    let peak_y = loft.peak_y(base_y);
    let inner_radius = loft.inner_radius();
    let peak_radius = loft.peak_radius();

    let mut inner = Vec::with_capacity(contour.len());
    let mut peak = Vec::with_capacity(contour.len());
    let mut outline = Vec::with_capacity(contour.len());

    for point in contour {
        let (px, py) = (point.x as f64, point.y as f64);
        let (dx, dy) = (px - center.0, py - center.1);
        let dist_sq = dx * dx + dy * dy;
        let dist = if dist_sq > 1e-15 { dist_sq.sqrt() } else { 0.0 };
        // Image rows grow downward, world Z grows toward the viewer
        let angle = if dist > 1e-15 { (-dy).atan2(dx) } else { 0.0 };
        let dir = (angle.cos(), angle.sin());
        let (cos, sin) = (dir.0 as f32, dir.1 as f32);

        inner.push(ring_vertex(
            inner_radius,
            attachment_y,
            dir,
            Vec3::new(cos * 0.1, 1.0, sin * 0.1),
            polar_uv(loft.connection_radius_px, size, dir),
        ));

        peak.push(ring_vertex(
            peak_radius,
            peak_y,
            dir,
            Vec3::new(cos * 0.3, 0.9, sin * 0.3),
            polar_uv(loft.droop_start_radius_px, size, dir),
        ));

        let droop = (dist - loft.droop_start_radius_px).max(0.0) * loft.droop_factor * loft.scale;
        let uv = Vec2::new(
            ((px + 0.5) / size.0).clamp(0.0, 1.0) as f32,
            ((py + 0.5) / size.1).clamp(0.0, 1.0) as f32,
        );
        outline.push(ring_vertex(
            dist * loft.scale,
            peak_y - droop,
            dir,
            Vec3::new(cos, 0.5 - droop as f32 * 0.5, sin),
            uv,
        ));
    }

    let mut part = MeshPart::new(name);
    for vertex in inner.into_iter().chain(peak).chain(outline) {
        part.add_vertex(vertex);
    }

    let n = contour.len() as u32;
    let (inner_base, peak_base, outline_base) = (0, n, 2 * n);
    for i in 0..n {
        let next = (i + 1) % n;
        let (in1, in2) = (inner_base + i, inner_base + next);
        let (pk1, pk2) = (peak_base + i, peak_base + next);
        let (co1, co2) = (outline_base + i, outline_base + next);

        part.add_triangle(in1, pk1, pk2);
        part.add_triangle(in1, pk2, in2);
        part.add_triangle(pk1, co1, co2);
        part.add_triangle(pk1, co2, pk2);
    }

    part.has_normals = true;
    part.has_uvs = true;
    Ok(part)
}
