//! Cubic Bézier evaluation.

use kurbo::{CubicBez, Point};

/// Evaluate the cubic Bézier curve defined by four control points at `t`.
///
/// This is the standard Bernstein-basis weighted sum,
/// `B(t) = (1−t)³·p0 + 3(1−t)²t·p1 + 3(1−t)t²·p2 + t³·p3`.
///
/// At the boundaries the result is exact: `B(0) == p0` and `B(1) == p3`.
/// Values of `t` outside `[0, 1]` are neither clamped nor meaningful.
pub fn cubic_bezier(t: f64, p0: Point, p1: Point, p2: Point, p3: Point) -> Point {
    let mt = 1.0 - t;
    let w0 = mt * mt * mt;
    let w1 = 3.0 * mt * mt * t;
    let w2 = 3.0 * mt * t * t;
    let w3 = t * t * t;
    Point::new(
        w0 * p0.x + w1 * p1.x + w2 * p2.x + w3 * p3.x,
        w0 * p0.y + w1 * p1.y + w2 * p2.y + w3 * p3.y,
    )
}

/// Sample a segment at `steps` evenly spaced parameters covering `[0, 1]`,
/// inclusive of both endpoints.
///
/// The iterator is lazy and cheap to recreate; nothing is cached.
pub fn sample_segment(seg: CubicBez, steps: usize) -> impl Iterator<Item = Point> {
    let denom = steps.saturating_sub(1).max(1) as f64;
    (0..steps).map(move |i| cubic_bezier(i as f64 / denom, seg.p0, seg.p1, seg.p2, seg.p3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kurbo::{ParamCurve, Vec2};

    #[test]
    fn boundaries_are_exact() {
        let (p0, p1, p2, p3) = (
            Point::new(3.7, -1.2),
            Point::new(50.1, 0.3),
            Point::new(-50.9, 50.5),
            Point::new(0.25, 49.75),
        );
        assert_eq!(cubic_bezier(0.0, p0, p1, p2, p3), p0);
        assert_eq!(cubic_bezier(1.0, p0, p1, p2, p3), p3);
    }

    #[test]
    fn symmetric_example_midpoint() {
        let result = cubic_bezier(
            0.5,
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(-50.0, 50.0),
            Point::new(0.0, 50.0),
        );
        assert_relative_eq!(result.x, 0.0);
        assert_relative_eq!(result.y, 25.0);
    }

    #[test]
    fn translation_invariance() {
        let d = Vec2::new(17.5, -42.0);
        let (p0, p1, p2, p3) = (
            Point::new(0.0, 0.0),
            Point::new(10.0, 40.0),
            Point::new(30.0, -20.0),
            Point::new(60.0, 5.0),
        );
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let plain = cubic_bezier(t, p0, p1, p2, p3);
            let moved = cubic_bezier(t, p0 + d, p1 + d, p2 + d, p3 + d);
            assert_relative_eq!(moved.x, plain.x + d.x, epsilon = 1e-9);
            assert_relative_eq!(moved.y, plain.y + d.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn agrees_with_kurbo() {
        let seg = CubicBez::new((0., 0.), (25., 100.), (75., -50.), (100., 10.));
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            let ours = cubic_bezier(t, seg.p0, seg.p1, seg.p2, seg.p3);
            let theirs = seg.eval(t);
            assert_relative_eq!(ours.x, theirs.x, epsilon = 1e-9);
            assert_relative_eq!(ours.y, theirs.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn sampling_covers_both_endpoints() {
        let seg = CubicBez::new((0., 0.), (50., 0.), (-50., 50.), (0., 50.));
        let samples: Vec<Point> = sample_segment(seg, 5).collect();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0], seg.p0);
        assert_eq!(samples[4], seg.p3);
        // restartable: a fresh iterator yields the same sequence
        let again: Vec<Point> = sample_segment(seg, 5).collect();
        assert_eq!(samples, again);
    }
}
