//! Emissive map synthesis: pixels colored like the flower's centre glow

use super::Canvas;

/// Shape of the color-match glow curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissiveOptions {
    /// Match distance at which emission fades out, and the minimum
    /// intensity a pixel needs to be copied into the map
    pub color_threshold: f32,
    /// Intensity of the worst matching pixel
    pub min_intensity: f32,
    /// Intensity of a perfect match
    pub max_intensity: f32,
    /// Exponent on the match factor (1 = linear, >1 sharper)
    pub falloff_power: f32,
}

impl Default for EmissiveOptions {
    fn default() -> Self {
        Self {
            color_threshold: 0.2,
            min_intensity: 0.1,
            max_intensity: 1.2,
            falloff_power: 1.0,
        }
    }
}

impl EmissiveOptions {
    /// Settings used for petal layers of a 3D flower
    pub fn petal() -> Self {
        Self {
            color_threshold: 0.8,
            min_intensity: 0.01,
            max_intensity: 1.5,
            falloff_power: 1.2,
        }
    }
}

/// Euclidean RGB distance with channels normalized to [0, 1]
pub fn color_distance(a: [u8; 4], b: [u8; 4]) -> f32 {
    let channel = |i: usize| (b[i] as f32 - a[i] as f32) / 255.0;
    let (dr, dg, db) = (channel(0), channel(1), channel(2));
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Glow intensity of `color` relative to `reference`
pub fn emissive_intensity(reference: [u8; 4], color: [u8; 4], options: &EmissiveOptions) -> f32 {
    let dist = color_distance(reference, color);
    let inv_threshold = 1.0 / options.color_threshold.max(1e-6);
    let raw_match = 1.0 - (dist * inv_threshold).clamp(0.0, 1.0);
    let matched = raw_match.powf(options.falloff_power);
    options.min_intensity + (options.max_intensity - options.min_intensity) * matched
}

/// Build an emissive map that keeps only pixels close in color to the
/// centre pixel of `source`; everything else stays opaque black.
pub fn emissive_from_petal(source: &Canvas, options: &EmissiveOptions) -> Canvas {
    let mut emissive = Canvas::filled(source.width, source.height, [0, 0, 0, 255]);
    let center = source.get_pixel(source.width as i32 / 2, source.height as i32 / 2);

    for y in 0..source.height as i32 {
        for x in 0..source.width as i32 {
            let color = source.get_pixel(x, y);
            if color[3] != 255 {
                continue;
            }
            if emissive_intensity(center, color, options) < options.color_threshold {
                continue;
            }
            emissive.set_pixel(x, y, color);
        }
    }

    emissive
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_distance() {
        assert_eq!(color_distance([10, 20, 30, 255], [10, 20, 30, 0]), 0.0);
        let d = color_distance([0, 0, 0, 255], [255, 255, 255, 255]);
        assert!((d - 3f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_intensity_range() {
        let opts = EmissiveOptions::petal();
        let same = emissive_intensity([200, 100, 0, 255], [200, 100, 0, 255], &opts);
        assert!((same - opts.max_intensity).abs() < 1e-6);

        let far = emissive_intensity([0, 0, 0, 255], [255, 255, 255, 255], &opts);
        assert!((far - opts.min_intensity).abs() < 1e-6);
    }

    #[test]
    fn test_emissive_copies_matching_pixels() {
        let mut source = Canvas::new(9, 9);
        for y in 0..9 {
            for x in 0..9 {
                source.set_pixel(x, y, [0, 0, 255, 255]);
            }
        }
        // Centre color
        for y in 3..6 {
            for x in 3..6 {
                source.set_pixel(x, y, [255, 200, 0, 255]);
            }
        }
        // Transparent pixel with the same color never glows
        source.set_pixel(0, 0, [255, 200, 0, 100]);

        let map = emissive_from_petal(&source, &EmissiveOptions::petal());

        assert_eq!(map.get_pixel(4, 4), [255, 200, 0, 255]);
        assert_eq!(map.get_pixel(8, 8), [0, 0, 0, 255]);
        assert_eq!(map.get_pixel(0, 0), [0, 0, 0, 255]);
    }
}
