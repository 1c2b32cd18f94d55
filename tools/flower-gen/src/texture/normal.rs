//! Normal map synthesis from painted petal layers
//!
//! Heights are not stored anywhere: each opaque pixel gets a height built
//! from random bumps scattered around it, and four such heights (one per
//! axis neighbour) drive a central-difference gradient. The result is a
//! tangent-space normal map (B channel = up) with fine, organic grain.

use super::Canvas;
use glam::Vec3;
use rand::Rng;

/// Parameters for the random bump field behind a petal normal map
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseOptions {
    /// Random bumps sampled per height evaluation
    pub num_points: u32,
    /// Lowest bump intensity (negative bumps dent the surface)
    pub noise_min: i32,
    /// Highest bump intensity
    pub noise_max: i32,
    /// Apply exponential falloff with distance
    pub soft_noise: bool,
    /// Sampling radius in pixels
    pub spread: u32,
    /// Falloff rate used when `soft_noise` is set
    pub softness_factor: f32,
    /// Horizontal stretch of the distance metric
    pub direction_bias_x: f32,
    /// Vertical stretch of the distance metric
    pub direction_bias_y: f32,
    /// Global bump multiplier
    pub scale_strength: f32,
    /// Extra offset per sample, truncated to whole pixels
    pub jitter: f32,
    /// Exponent applied to bump magnitude
    pub noise_power: f32,
    /// Height of an opaque pixel before bumps are added
    pub base_height: f32,
}

impl Default for NoiseOptions {
    fn default() -> Self {
        Self {
            num_points: 32,
            noise_min: -14,
            noise_max: 64,
            soft_noise: true,
            spread: 6,
            softness_factor: 1.1,
            direction_bias_x: 0.2,
            direction_bias_y: 0.5,
            scale_strength: 0.5,
            jitter: 0.4,
            noise_power: 0.8,
            base_height: 0.6,
        }
    }
}

impl NoiseOptions {
    /// Settings used for petal layers of a 3D flower
    pub fn petal() -> Self {
        Self {
            base_height: 0.8,
            ..Self::default()
        }
    }
}

fn sample_height<R: Rng + ?Sized>(
    source: &Canvas,
    sx: i32,
    sy: i32,
    options: &NoiseOptions,
    rng: &mut R,
) -> f32 {
    if !source.is_solid(sx, sy) {
        return 0.0;
    }

    let width = source.width as i32;
    let height = source.height as i32;
    let spread = options.spread as i32;
    let jitter = options.jitter.abs();
    let (noise_lo, noise_hi) = (
        options.noise_min.min(options.noise_max),
        options.noise_min.max(options.noise_max),
    );
    let mut value = options.base_height;

    for _ in 0..options.num_points {
        let jitter_x = rng.random_range(-jitter..=jitter) as i32;
        let jitter_y = rng.random_range(-jitter..=jitter) as i32;
        let cx = sx + rng.random_range(-spread..=spread) + jitter_x;
        let cy = sy + rng.random_range(-spread..=spread) + jitter_y;

        if cx <= 0 || cx >= width - 1 || cy <= 0 || cy >= height - 1 {
            continue;
        }
        if !source.is_solid(cx, cy) {
            continue;
        }

        let dx = (sx - cx) as f32 * (1.0 + options.direction_bias_x);
        let dy = (sy - cy) as f32 * (1.0 + options.direction_bias_y);
        let dist = (dx * dx + dy * dy).sqrt();
        if dist > options.spread as f32 {
            continue;
        }

        let raw = rng.random_range(noise_lo..=noise_hi) as f32 / 255.0;
        let shaped = raw.abs().powf(options.noise_power).copysign(raw);
        let falloff = if options.soft_noise {
            (-dist * options.softness_factor).exp()
        } else {
            1.0
        };
        value += shaped * falloff * options.scale_strength;
    }

    value
}

/// Generate a tangent-space normal map for the opaque region of `source`
///
/// Border pixels and pixels that are not fully opaque stay transparent.
/// Output depends on `rng`; a seeded generator gives reproducible maps.
pub fn normal_from_petal<R: Rng + ?Sized>(
    source: &Canvas,
    options: &NoiseOptions,
    rng: &mut R,
) -> Canvas {
    let mut normal = Canvas::new(source.width, source.height);
    let width = source.width as i32;
    let height = source.height as i32;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if !source.is_solid(x, y) {
                continue;
            }

            let h_l = sample_height(source, x - 1, y, options, rng);
            let h_r = sample_height(source, x + 1, y, options, rng);
            let h_u = sample_height(source, x, y - 1, options, rng);
            let h_d = sample_height(source, x, y + 1, options, rng);

            let n = Vec3::new(-(h_r - h_l), -(h_d - h_u), 1.0).normalize();

            // Convert from [-1, 1] to [0, 255]
            let r = ((n.x * 0.5 + 0.5) * 255.0) as u8;
            let g = ((n.y * 0.5 + 0.5) * 255.0) as u8;
            let b = ((n.z * 0.5 + 0.5) * 255.0) as u8;

            normal.set_pixel(x, y, [r, g, b, 255]);
        }
    }

    normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_flat_region_points_up() {
        // Without bumps every height equals base_height, so the gradient is zero
        let source = Canvas::filled(8, 8, [200, 50, 50, 255]);
        let options = NoiseOptions {
            num_points: 0,
            ..NoiseOptions::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let map = normal_from_petal(&source, &options, &mut rng);

        assert_eq!(map.get_pixel(4, 4), [127, 127, 255, 255]);
        // Border stays transparent
        assert_eq!(map.get_pixel(0, 4), [0, 0, 0, 0]);
        assert_eq!(map.get_pixel(7, 7), [0, 0, 0, 0]);
    }

    #[test]
    fn test_transparent_pixels_skipped() {
        let mut source = Canvas::new(10, 10);
        for y in 2..8 {
            for x in 2..8 {
                source.set_pixel(x, y, [255, 255, 255, 255]);
            }
        }
        source.set_pixel(5, 5, [255, 255, 255, 128]);

        let mut rng = Pcg32::seed_from_u64(3);
        let map = normal_from_petal(&source, &NoiseOptions::petal(), &mut rng);

        assert_eq!(map.alpha(5, 5), 0);
        assert_eq!(map.alpha(1, 1), 0);
        assert_eq!(map.alpha(3, 3), 255);
        // Tangent-space normals always face outward
        assert!(map.get_pixel(3, 3)[2] >= 127);
    }

    #[test]
    fn test_seeded_maps_are_reproducible() {
        let source = Canvas::filled(16, 16, [255, 255, 255, 255]);
        let options = NoiseOptions::petal();

        let a = normal_from_petal(&source, &options, &mut Pcg32::seed_from_u64(42));
        let b = normal_from_petal(&source, &options, &mut Pcg32::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
