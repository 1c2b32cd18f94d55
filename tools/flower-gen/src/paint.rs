//! Radial flower painting
//!
//! Rays are cast from the flower center toward every point of a
//! midpoint-circle sweep, mirrored eight ways. The pattern function decides
//! how far each ray reaches and what color every pixel along it gets.

use crate::params::PetalParams;
use crate::pattern::PatternFunction;
use crate::texture::Canvas;
use glam::Vec2;
use std::f32::consts::TAU;

/// Trunk color, olive green at half opacity
pub const TRUNK_COLOR: [u8; 4] = [0x55, 0x6B, 0x2F, 128];

/// What [`RadialPainter::draw`] puts on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    Trunk,
    Petals,
    #[default]
    TrunkAndPetals,
}

/// Paints petal layers by querying a [`PatternFunction`] along rays
pub struct RadialPainter<P> {
    pattern: P,
    petals: PetalParams,
}

impl<P: PatternFunction> RadialPainter<P> {
    pub fn new(pattern: P, petals: PetalParams) -> Self {
        Self { pattern, petals }
    }

    pub fn petals(&self) -> &PetalParams {
        &self.petals
    }

    pub fn into_pattern(self) -> P {
        self.pattern
    }

    /// Flower center in pixels
    pub fn origin(&self) -> Vec2 {
        Vec2::splat(self.petals.radius as f32)
    }

    /// Blank `2r x 3r` canvas with room for the trunk below the flower
    pub fn flower_canvas(&self) -> Canvas {
        let r = self.petals.radius.max(0) as u32;
        Canvas::new(r * 2, r * 3)
    }

    /// Blank `2r x 2r` canvas holding a single layer
    pub fn layer_canvas(&self) -> Canvas {
        let r = self.petals.radius.max(0) as u32;
        Canvas::new(r * 2, r * 2)
    }

    /// Paint a full flower; petal layers go from the outermost inward, each
    /// at half the previous radius
    pub fn draw(&mut self, canvas: &mut Canvas, mode: DrawMode) {
        if matches!(mode, DrawMode::Trunk | DrawMode::TrunkAndPetals) {
            draw_trunk(canvas, self.origin());
        }
        if matches!(mode, DrawMode::Petals | DrawMode::TrunkAndPetals) {
            let mut radius = self.petals.radius;
            for layer in (0..=self.petals.num_layers).rev() {
                self.draw_petals(canvas, radius, layer);
                radius /= 2;
            }
        }
    }

    /// Paint one layer alone on a fresh `2r x 2r` canvas
    ///
    /// With `scaled`, the radius is halved once per step inward from the
    /// outermost layer, matching the layer's size in the full flower.
    pub fn draw_layer(&mut self, layer: i32, scaled: bool) -> Canvas {
        let mut canvas = self.layer_canvas();
        let mut radius = self.petals.radius;
        if scaled {
            for _ in layer..self.petals.num_layers {
                radius /= 2;
            }
        }
        self.draw_petals(&mut canvas, radius, layer);
        canvas
    }

    /// Sweep one layer with an eight-way symmetric midpoint circle
    pub fn draw_petals(&mut self, canvas: &mut Canvas, radius: i32, layer: i32) {
        let (mut x, mut y) = (0, radius);
        let mut d = 1 - y;
        self.paint_symmetric(canvas, x, y, radius, layer);
        while x <= y {
            if d <= 0 {
                d -= 2 * x + 1;
            } else {
                d += 2 * y + 1;
                y -= 1;
            }
            x += 1;
            self.paint_symmetric(canvas, x, y, radius, layer);
        }
    }

    fn paint_symmetric(&mut self, canvas: &mut Canvas, x: i32, y: i32, radius: i32, layer: i32) {
        let origin = self.origin();
        let (x, y) = (x as f32, y as f32);
        for offset in [
            Vec2::new(x, y),
            Vec2::new(x, -y),
            Vec2::new(-x, -y),
            Vec2::new(-x, y),
            Vec2::new(y, x),
            Vec2::new(y, -x),
            Vec2::new(-y, -x),
            Vec2::new(-y, x),
        ] {
            self.paint_ray(canvas, origin + offset, radius, layer);
        }
    }

    /// `sin(P * angle)` of a point around the flower center
    fn angle_feature(&self, pos: Vec2) -> f32 {
        let to = pos - self.origin();
        let mut angle = to.y.atan2(to.x);
        if angle < 0.0 {
            angle += TAU;
        }
        (self.petals.p * angle).sin()
    }

    fn query(&mut self, radius: i32, feature: f32, layer: i32) -> [f64; 4] {
        let out = self.pattern.query([
            radius as f64,
            feature as f64,
            layer as f64,
            self.petals.bias as f64,
        ]);
        [out[0], out[1], out[2], out[3]]
    }

    /// Walk from the center toward `target`, coloring pixels until the cut
    fn paint_ray(&mut self, canvas: &mut Canvas, target: Vec2, radius: i32, layer: i32) {
        let origin = self.origin();
        let feature = self.angle_feature(target);
        let direction = (target - origin).normalize_or_zero();

        let cut = self.query(0, feature, layer);
        let reach = (cut[3] * radius as f64).abs().min(radius as f64);
        if reach.is_nan() {
            return;
        }

        let (width, height) = (canvas.width as f32, canvas.height as f32);
        let outer_half = layer >= self.petals.num_layers / 2;
        let mut current_radius = radius;
        let mut pos = origin + direction;

        for step in 0..=(reach.floor() as i32) {
            if outer_half {
                let local = self.query(step, self.angle_feature(pos), layer);
                current_radius = local[3] as i32;
            }
            if pos.x >= 0.0 && pos.y >= 0.0 && pos.x < width && pos.y < height {
                let color = self.query(current_radius, self.angle_feature(pos), layer);
                canvas.set_pixel(
                    pos.x as i32,
                    pos.y as i32,
                    [
                        (color[0] * 255.0) as u8,
                        (color[1] * 255.0) as u8,
                        (color[2] * 255.0) as u8,
                        255,
                    ],
                );
            }
            pos += direction;
        }
    }
}

/// Three-pixel-wide trunk from the flower center to the bottom edge
pub fn draw_trunk(canvas: &mut Canvas, origin: Vec2) {
    let (cx, top) = (origin.x as i32, origin.y as i32);
    for y in top.max(0)..canvas.height as i32 {
        for x in cx - 1..=cx + 1 {
            canvas.set_pixel(x, y, TRUNK_COLOR);
        }
    }
}

/// Paint a complete flower image in `mode`
pub fn paint_flower<P: PatternFunction>(pattern: P, petals: PetalParams, mode: DrawMode) -> Canvas {
    let mut painter = RadialPainter::new(pattern, petals);
    let mut canvas = painter.flower_canvas();
    painter.draw(&mut canvas, mode);
    canvas
}
