//! Douglas-Peucker polyline simplification

use super::Point;

/// Squared distance from `p` to the segment `a`-`b`
///
/// A degenerate segment (`a == b`) falls back to the point distance.
pub fn segment_distance_sq(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.length_squared();
    if len_sq == 0 {
        return ap.length_squared() as f32;
    }

    let t = (ap.dot(ab) as f32 / len_sq as f32).clamp(0.0, 1.0);
    let closest = a.as_vec2() + t * ab.as_vec2();
    (p.as_vec2() - closest).length_squared()
}

/// Simplify a polyline so no dropped point lies farther than `epsilon`
/// from the chord that replaces it.
///
/// The first and last input points are always kept and the output is an
/// ordered subsequence of the input. Inputs with fewer than three points,
/// or a negative `epsilon`, are returned unchanged. When the result starts
/// and ends on the same point and the input endpoints were within two
/// pixels of each other, the duplicated closing point is dropped.
pub fn simplify(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() < 3 || epsilon < 0.0 {
        return points.to_vec();
    }

    let epsilon_sq = epsilon * epsilon;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut ranges = vec![(0, points.len() - 1)];
    while let Some((first, last)) = ranges.pop() {
        let mut max_dist_sq = 0.0f32;
        let mut split = first;
        for (i, &p) in points.iter().enumerate().take(last).skip(first + 1) {
            let dist_sq = segment_distance_sq(p, points[first], points[last]);
            if dist_sq > max_dist_sq {
                max_dist_sq = dist_sq;
                split = i;
            }
        }

        if max_dist_sq > epsilon_sq {
            keep[split] = true;
            ranges.push((first, split));
            ranges.push((split, last));
        }
    }

    let mut result: Vec<Point> = points
        .iter()
        .zip(&keep)
        .filter_map(|(&p, &k)| k.then_some(p))
        .collect();

    if result.len() > 1 && result.first() == result.last() {
        let gap = points[0] - points[points.len() - 1];
        if gap.length_squared() < 4 {
            result.pop();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::trace_canvas;
    use crate::texture::Canvas;
    use glam::IVec2;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| IVec2::new(x, y)).collect()
    }

    fn disc_contour(r: i32) -> Vec<Point> {
        let size = (2 * r) as u32;
        let mut canvas = Canvas::new(size, size);
        for y in 0..2 * r {
            for x in 0..2 * r {
                let dx = x as f32 + 0.5 - r as f32;
                let dy = y as f32 + 0.5 - r as f32;
                if dx * dx + dy * dy <= (r * r) as f32 {
                    canvas.set_pixel(x, y, [255, 0, 0, 255]);
                }
            }
        }
        trace_canvas(&canvas, 128).unwrap()
    }

    #[test]
    fn test_segment_distance() {
        let a = IVec2::new(0, 0);
        let b = IVec2::new(4, 0);
        assert_eq!(segment_distance_sq(IVec2::new(2, 3), a, b), 9.0);
        // Beyond the end of the segment measures to the endpoint
        assert_eq!(segment_distance_sq(IVec2::new(6, 0), a, b), 4.0);
        // Degenerate segment
        assert_eq!(segment_distance_sq(IVec2::new(3, 4), a, a), 25.0);
    }

    #[test]
    fn test_short_inputs_unchanged() {
        let two = pts(&[(0, 0), (5, 5)]);
        assert_eq!(simplify(&two, 1.0), two);

        let three = pts(&[(0, 0), (1, 7), (2, 0)]);
        assert_eq!(simplify(&three, -1.0), three);
    }

    #[test]
    fn test_collinear_points_collapse() {
        let line = pts(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        assert_eq!(simplify(&line, 0.5), pts(&[(0, 0), (4, 0)]));
    }

    #[test]
    fn test_zigzag_kept() {
        let zigzag = pts(&[(0, 0), (1, 3), (2, 0), (3, 3), (4, 0)]);
        assert_eq!(simplify(&zigzag, 0.5), zigzag);
        assert_eq!(simplify(&zigzag, 5.0), pts(&[(0, 0), (4, 0)]));
    }

    #[test]
    fn test_closing_duplicate_dropped() {
        let closed = pts(&[(0, 0), (4, 0), (4, 4), (0, 4), (0, 0)]);
        assert_eq!(simplify(&closed, 0.5), pts(&[(0, 0), (4, 0), (4, 4), (0, 4)]));
    }

    #[test]
    fn test_disc_reduction() {
        let contour = disc_contour(32);
        let simplified = simplify(&contour, 0.5);

        assert!(simplified.len() >= 3);
        assert!((simplified.len() as f32) < contour.len() as f32 * 0.4);
        assert_eq!(simplified.first(), contour.first());
        assert_eq!(simplified.last(), contour.last());

        // Retained points keep their original order
        let mut cursor = contour.iter();
        for p in &simplified {
            assert!(cursor.any(|q| q == p));
        }
    }

    #[test]
    fn test_dropped_points_within_tolerance() {
        let contour = disc_contour(24);
        let epsilon = 1.0;
        let simplified = simplify(&contour, epsilon);

        let index_of = |p: &Point| contour.iter().position(|q| q == p).unwrap();
        for pair in simplified.windows(2) {
            let (start, end) = (index_of(&pair[0]), index_of(&pair[1]));
            for &p in &contour[start..=end] {
                let d = segment_distance_sq(p, pair[0], pair[1]);
                assert!(d <= epsilon * epsilon + 1e-4);
            }
        }
    }

    #[test]
    fn test_idempotent_and_monotonic() {
        let contour = disc_contour(32);
        let once = simplify(&contour, 0.5);
        assert_eq!(simplify(&once, 0.5), once);

        let mut previous = contour.len();
        for epsilon in [0.0, 0.5, 1.0, 2.0, 4.0] {
            let len = simplify(&contour, epsilon).len();
            assert!(len <= previous);
            previous = len;
        }
    }
}
