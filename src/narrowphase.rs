use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::types::*;

/// Segment-vs-segment primitive tests.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn world_endpoints(position: Vec2, rotation: f32, seg: &RigidSegment) -> (Vec2, Vec2) {
        let mid = position + Vec2::from_angle(rotation).rotate(seg.local_offset);
        let dir = Vec2::from_angle(rotation + seg.local_rotation) * seg.half_length;
        (mid - dir, mid + dir)
    }

    fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
        let d1 = orient(q1, q2, p1);
        let d2 = orient(q1, q2, p2);
        let d3 = orient(p1, p2, q1);
        let d4 = orient(p1, p2, q2);

        if straddles(d1, d2) && straddles(d3, d4) {
            return true;
        }

        // Touching / collinear cases
        (d1 == 0.0 && on_segment(q1, q2, p1))
            || (d2 == 0.0 && on_segment(q1, q2, p2))
            || (d3 == 0.0 && on_segment(p1, p2, q1))
            || (d4 == 0.0 && on_segment(p1, p2, q2))
    }

    fn proximity_connect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2, tolerance: f32) -> bool {
        if Self::segments_intersect(p1, p2, q1, q2) {
            return true;
        }
        let tol2 = tolerance * tolerance;
        [(p1, q1), (p1, q2), (p2, q1), (p2, q2)]
            .iter()
            .any(|(a, b)| a.distance_squared(*b) <= tol2)
    }
}

/// Signed area of the triangle `abc` (twice): >0 when `c` is left of `ab`.
#[inline]
fn orient(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

#[inline]
fn straddles(d0: f32, d1: f32) -> bool {
    (d0 > 0.0 && d1 < 0.0) || (d0 < 0.0 && d1 > 0.0)
}

/// `p` is known collinear with `ab`; check it lies within the segment's box.
#[inline]
fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    let min = a.min(b);
    let max = a.max(b);
    p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f32::consts::FRAC_PI_2;

    fn seg(offset: Vec2, rot: f32, half: f32) -> RigidSegment {
        RigidSegment {
            local_offset: offset,
            local_rotation: rot,
            half_length: half,
            mass: 1.0,
            color: Color::WHITE,
            width: 2.0,
        }
    }

    // --- Endpoints ---------------------------------------------------------

    #[test]
    fn test_world_endpoints_identity() {
        let (a, b) = Narrowphase::world_endpoints(Vec2::new(5.0, 5.0), 0.0, &seg(Vec2::ZERO, 0.0, 2.0));
        assert_abs_diff_eq!(a.x, 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(b.x, 7.0, epsilon = 1e-5);
        assert_abs_diff_eq!(a.y, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_world_endpoints_rotated_offset() {
        // Offset (1,0) under a quarter turn lands at (0,1); local rotation adds
        // another quarter turn so the segment points along -x.
        let s = seg(Vec2::new(1.0, 0.0), FRAC_PI_2, 1.0);
        let (a, b) = Narrowphase::world_endpoints(Vec2::ZERO, FRAC_PI_2, &s);
        assert_abs_diff_eq!(a.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(a.y, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(b.x, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(b.y, 1.0, epsilon = 1e-5);
    }

    // --- Intersection ------------------------------------------------------

    #[test]
    fn test_segments_cross() {
        assert!(Narrowphase::segments_intersect(
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(0.0, 1.0),
        ));
    }

    #[test]
    fn test_segments_touch_at_endpoint() {
        assert!(Narrowphase::segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 3.0),
        ));
    }

    #[test]
    fn test_segments_parallel_miss() {
        assert!(!Narrowphase::segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(2.0, 1.0),
        ));
    }

    #[test]
    fn test_segments_collinear_disjoint() {
        assert!(!Narrowphase::segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 0.0),
        ));
    }

    #[test]
    fn test_segments_collinear_overlap() {
        assert!(Narrowphase::segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(3.0, 0.0),
        ));
    }

    // --- Proximity ---------------------------------------------------------

    #[test]
    fn test_proximity_tip_to_tip() {
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(10.0, 0.0);
        let q1 = Vec2::new(11.5, 0.5);
        let q2 = Vec2::new(20.0, 5.0);
        assert!(!Narrowphase::segments_intersect(p1, p2, q1, q2));
        assert!(Narrowphase::proximity_connect(p1, p2, q1, q2, 2.0));
        assert!(!Narrowphase::proximity_connect(p1, p2, q1, q2, 1.0));
    }

    #[test]
    fn test_proximity_ignores_tip_to_side() {
        // A tip close to the middle of the other segment is not a connection.
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(10.0, 0.0);
        let q1 = Vec2::new(5.0, 0.5);
        let q2 = Vec2::new(5.0, 8.0);
        assert!(!Narrowphase::proximity_connect(p1, p2, q1, q2, 2.0));
    }
}
