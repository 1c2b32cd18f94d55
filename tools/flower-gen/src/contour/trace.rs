//! Moore-neighbour boundary tracing

use super::Point;
use crate::texture::Canvas;
use glam::IVec2;

/// 8-connected offsets in clockwise order (y grows downward), starting East
pub const NEIGHBORS: [IVec2; 8] = [
    IVec2::new(1, 0),   // E
    IVec2::new(1, 1),   // SE
    IVec2::new(0, 1),   // S
    IVec2::new(-1, 1),  // SW
    IVec2::new(-1, 0),  // W
    IVec2::new(-1, -1), // NW
    IVec2::new(0, -1),  // N
    IVec2::new(1, -1),  // NE
];

/// Arrival direction used for the start pixel; the first search begins
/// just past it, as if the trace had entered from the East.
const INITIAL_ARRIVAL: usize = 4;

struct AlphaMask<'a> {
    rgba: &'a [u8],
    width: i32,
    height: i32,
    threshold: u8,
}

impl AlphaMask<'_> {
    #[inline]
    fn is_opaque(&self, p: Point) -> bool {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return false;
        }
        let idx = (p.y as usize * self.width as usize + p.x as usize) * 4 + 3;
        self.rgba[idx] >= self.threshold
    }

    fn first_opaque(&self) -> Option<Point> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| IVec2::new(x, y)))
            .find(|&p| self.is_opaque(p))
    }
}

/// Trace the outer boundary of the first opaque region in a row-major RGBA
/// buffer. A pixel is opaque when its alpha is at least `alpha_threshold`.
///
/// Returns the boundary pixels in clockwise order with the start pixel
/// (the first opaque pixel in row-major order) listed once. Only the first
/// region is traced and holes are ignored.
///
/// Returns `None` when the buffer is empty, too small for the given size,
/// has no opaque pixel, holds an isolated pixel, yields fewer than three
/// boundary points, or the walk exceeds `2 * width * height` points.
///
/// Thin features are walked on both sides, so a one-pixel-wide line lists
/// its interior pixels twice (a 3-pixel line gives 4 points) and a
/// 2-pixel region is rejected.
pub fn trace_boundary(rgba: &[u8], width: u32, height: u32, alpha_threshold: u8) -> Option<Vec<Point>> {
    if width == 0 || height == 0 || rgba.len() < width as usize * height as usize * 4 {
        return None;
    }

    let mask = AlphaMask {
        rgba,
        width: width as i32,
        height: height as i32,
        threshold: alpha_threshold,
    };
    let start = mask.first_opaque()?;
    let limit = width as usize * height as usize * 2;

    let mut contour = vec![start];
    let mut current = start;
    let mut arrival = INITIAL_ARRIVAL;

    loop {
        let search_start = (arrival + 1) % 8;
        let next = (0..8)
            .map(|i| (search_start + i) % 8)
            .find(|&dir| mask.is_opaque(current + NEIGHBORS[dir]));

        let Some(dir) = next else {
            // Isolated pixel: nothing to walk around
            if contour.len() == 1 {
                return None;
            }
            break;
        };

        arrival = (dir + 4) % 8;
        current += NEIGHBORS[dir];

        if current != start {
            contour.push(current);
        } else if contour.len() > 1 {
            break;
        }

        if contour.len() > limit {
            return None;
        }
    }

    (contour.len() >= 3).then_some(contour)
}

/// Trace the outer boundary of a canvas
pub fn trace_canvas(canvas: &Canvas, alpha_threshold: u8) -> Option<Vec<Point>> {
    trace_boundary(&canvas.pixels, canvas.width, canvas.height, alpha_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_from(width: u32, height: u32, opaque: impl Fn(i32, i32) -> bool) -> Canvas {
        let mut canvas = Canvas::new(width, height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                if opaque(x, y) {
                    canvas.set_pixel(x, y, [255, 255, 255, 255]);
                }
            }
        }
        canvas
    }

    #[test]
    fn test_empty_image_fails() {
        let canvas = Canvas::new(16, 16);
        assert_eq!(trace_canvas(&canvas, 128), None);
    }

    #[test]
    fn test_invalid_buffer_fails() {
        assert_eq!(trace_boundary(&[], 0, 0, 1), None);
        assert_eq!(trace_boundary(&[255; 12], 2, 2, 1), None);
    }

    #[test]
    fn test_square_clockwise() {
        let canvas = canvas_from(8, 8, |x, y| (2..=5).contains(&x) && (2..=5).contains(&y));
        let contour = trace_canvas(&canvas, 128).unwrap();

        let expected: Vec<Point> = [
            (2, 2), (3, 2), (4, 2), (5, 2),
            (5, 3), (5, 4), (5, 5),
            (4, 5), (3, 5), (2, 5),
            (2, 4), (2, 3),
        ]
        .iter()
        .map(|&(x, y)| IVec2::new(x, y))
        .collect();
        assert_eq!(contour, expected);
    }

    #[test]
    fn test_threshold_decides_opacity() {
        let mut canvas = canvas_from(8, 8, |x, y| (2..=5).contains(&x) && (2..=5).contains(&y));
        for y in 0..8 {
            canvas.set_pixel(0, y, [0, 0, 0, 100]);
        }
        // Column 0 is below the threshold and must not start the trace
        let contour = trace_canvas(&canvas, 128).unwrap();
        assert_eq!(contour[0], IVec2::new(2, 2));

        let contour = trace_canvas(&canvas, 100).unwrap();
        assert_eq!(contour[0], IVec2::new(0, 0));
    }

    #[test]
    fn test_single_pixel_fails() {
        let canvas = canvas_from(8, 8, |x, y| x == 3 && y == 3);
        assert_eq!(trace_canvas(&canvas, 1), None);
    }

    #[test]
    fn test_two_pixel_region_fails() {
        let canvas = canvas_from(8, 8, |x, y| y == 2 && (x == 2 || x == 3));
        assert_eq!(trace_canvas(&canvas, 1), None);
    }

    #[test]
    fn test_thin_line_walks_both_sides() {
        let canvas = canvas_from(8, 8, |x, y| y == 2 && (2..=4).contains(&x));
        let contour = trace_canvas(&canvas, 1).unwrap();
        let expected: Vec<Point> = [(2, 2), (3, 2), (4, 2), (3, 2)]
            .iter()
            .map(|&(x, y)| IVec2::new(x, y))
            .collect();
        assert_eq!(contour, expected);
    }

    #[test]
    fn test_disc_boundary_properties() {
        let r = 32;
        let inside = |x: i32, y: i32| {
            let dx = x as f32 + 0.5 - r as f32;
            let dy = y as f32 + 0.5 - r as f32;
            dx * dx + dy * dy <= (r * r) as f32
        };
        let canvas = canvas_from(64, 64, inside);
        let contour = trace_canvas(&canvas, 128).unwrap();

        // Roughly the circumference 2*pi*r
        let circumference = 2.0 * std::f32::consts::PI * r as f32;
        assert!((contour.len() as f32) > circumference * 0.8);
        assert!((contour.len() as f32) < circumference * 1.2);
        assert!(contour.len() <= 2 * 64 * 64);

        for p in &contour {
            assert!(canvas.alpha(p.x, p.y) >= 128);
            let touches_outside = NEIGHBORS
                .iter()
                .any(|&d| canvas.alpha(p.x + d.x, p.y + d.y) < 128);
            assert!(touches_outside, "{p} is an interior pixel");
        }

        // Positive shoelace area in y-down image space means clockwise on screen
        let n = contour.len();
        let area: i32 = (0..n)
            .map(|i| {
                let a = contour[i];
                let b = contour[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        assert!(area > 0);
    }
}
