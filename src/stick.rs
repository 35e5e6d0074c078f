use glam::Vec2;
use tracing::trace;

use crate::api::{NarrowphaseApi, RigidBodyApi};
use crate::error::{Result, SandboxError};
use crate::narrowphase::Narrowphase;
use crate::types::*;

/// Explicit spawn parameters for one stick.
#[derive(Copy, Clone, Debug)]
pub struct StickParams {
    pub position: Vec2,
    pub rotation: f32,
    pub length: f32,
    pub velocity: Vec2,
    pub omega: f32,
    pub width: f32,
    pub color: Color,
    pub mass_per_unit_length: f32,
}

impl Default for StickParams {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            length: 10.0,
            velocity: Vec2::ZERO,
            omega: 0.0,
            width: 4.0,
            color: Color::WHITE,
            mass_per_unit_length: 0.01,
        }
    }
}

/// Free rod: a body whose single segment sits exactly on the body pose.
#[derive(Clone, Debug, PartialEq)]
pub struct Stick {
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    /// Angular velocity (rad/s).
    pub omega: f32,
    pub segment: RigidSegment,
}

impl Stick {
    /// Build a stick; rejects non-positive or non-finite length and mass.
    pub fn new(p: StickParams) -> Result<Self> {
        let mass = p.length * p.mass_per_unit_length;
        if !(p.length > 0.0 && mass > 0.0 && p.length.is_finite() && mass.is_finite()) {
            return Err(SandboxError::InvalidStick { length: p.length, mass });
        }
        Ok(Self {
            position: p.position,
            rotation: p.rotation,
            velocity: p.velocity,
            omega: p.omega,
            segment: RigidSegment {
                local_offset: Vec2::ZERO,
                local_rotation: 0.0,
                half_length: p.length * 0.5,
                mass,
                color: p.color,
                width: p.width,
            },
        })
    }

    pub fn length(&self) -> f32 {
        self.segment.length()
    }

    /// Inertia about the stick's own centroid.
    pub fn self_inertia(&self) -> f32 {
        self.segment.self_inertia()
    }

    /// Contact tolerance: half the rendered width.
    pub fn tolerance(&self) -> f32 {
        self.segment.width * 0.5
    }

    pub fn world_endpoints(&self) -> (Vec2, Vec2) {
        Narrowphase::world_endpoints(self.position, self.rotation, &self.segment)
    }

    /// Crossing or tip-to-tip contact with another stick. The wider of the
    /// two sticks sets the tolerance, so the test is symmetric.
    pub fn intersects_with(&self, other: &Stick) -> bool {
        let (p1, p2) = self.world_endpoints();
        let (q1, q2) = other.world_endpoints();
        let tol = self.tolerance().max(other.tolerance());
        Narrowphase::proximity_connect(p1, p2, q1, q2, tol)
    }
}

impl RigidBodyApi for Stick {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn omega(&self) -> f32 {
        self.omega
    }

    fn mass(&self) -> f32 {
        self.segment.mass
    }

    fn inertia(&self) -> f32 {
        self.self_inertia()
    }

    fn segments(&self) -> &[RigidSegment] {
        std::slice::from_ref(&self.segment)
    }

    fn integrate(&mut self, dt: f32, bounds: Bounds) {
        self.position += self.velocity * dt;
        self.rotation += self.omega * dt;
        self.bounce_off_bounds(bounds);
    }

    fn bounce_off_bounds(&mut self, bounds: Bounds) -> bool {
        let (a, b) = self.world_endpoints();
        reflect_in_bounds(a.min(b), a.max(b), bounds, &mut self.velocity, &mut self.omega)
    }
}

/// Simplified elastic wall bounce shared by all bodies: crossing a vertical
/// edge flips `v.x`, crossing a horizontal edge flips `v.y`, and each crossing
/// axis also flips the spin.
pub(crate) fn reflect_in_bounds(
    min: Vec2,
    max: Vec2,
    bounds: Bounds,
    velocity: &mut Vec2,
    omega: &mut f32,
) -> bool {
    let mut bounced = false;
    if min.x < bounds.min.x || max.x > bounds.max.x {
        velocity.x = -velocity.x;
        *omega = -*omega;
        bounced = true;
    }
    if min.y < bounds.min.y || max.y > bounds.max.y {
        velocity.y = -velocity.y;
        *omega = -*omega;
        bounced = true;
    }
    if bounced {
        trace!(?min, ?max, ?velocity, omega = *omega, "wall bounce");
    }
    bounced
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn screen() -> Bounds {
        Bounds::from_size(Vec2::new(100.0, 100.0))
    }

    fn stick_at(position: Vec2, rotation: f32, length: f32) -> Stick {
        Stick::new(StickParams { position, rotation, length, ..Default::default() }).unwrap()
    }

    #[test]
    fn test_mass_and_self_inertia() {
        let s = stick_at(Vec2::ZERO, 0.0, 20.0);
        assert_relative_eq!(s.mass(), 0.2, max_relative = 1e-5);
        assert_relative_eq!(s.inertia(), 0.2 * 400.0 / 12.0, max_relative = 1e-5);
    }

    #[test]
    fn test_rejects_degenerate() {
        let zero = Stick::new(StickParams { length: 0.0, ..Default::default() });
        assert!(matches!(zero, Err(SandboxError::InvalidStick { .. })));
        let massless = Stick::new(StickParams { mass_per_unit_length: 0.0, ..Default::default() });
        assert!(massless.is_err());
        let negative = Stick::new(StickParams { length: -5.0, ..Default::default() });
        assert!(negative.is_err());
    }

    #[test]
    fn test_integrate_moves_and_spins() {
        let mut s = stick_at(Vec2::new(50.0, 50.0), 0.0, 10.0);
        s.velocity = Vec2::new(10.0, -4.0);
        s.omega = 2.0;
        s.integrate(0.5, screen());
        assert_relative_eq!(s.position.x, 55.0);
        assert_relative_eq!(s.position.y, 48.0);
        assert_relative_eq!(s.rotation, 1.0);
        assert_relative_eq!(s.velocity.x, 10.0);
    }

    #[test]
    fn test_bounce_right_edge() {
        let mut s = stick_at(Vec2::new(97.0, 50.0), 0.0, 10.0);
        s.velocity = Vec2::new(5.0, 3.0);
        s.omega = 1.5;
        assert!(s.bounce_off_bounds(screen()));
        assert_eq!(s.velocity, Vec2::new(-5.0, 3.0));
        assert_eq!(s.omega, -1.5);
    }

    #[test]
    fn test_bounce_corner_flips_both_axes() {
        let mut s = stick_at(Vec2::new(1.0, 1.0), core::f32::consts::FRAC_PI_4, 10.0);
        s.velocity = Vec2::new(-5.0, -3.0);
        s.omega = 1.5;
        assert!(s.bounce_off_bounds(screen()));
        assert_eq!(s.velocity, Vec2::new(5.0, 3.0));
        // Spin flipped once per axis.
        assert_eq!(s.omega, 1.5);
    }

    #[test]
    fn test_no_bounce_inside() {
        let mut s = stick_at(Vec2::new(50.0, 50.0), 0.3, 10.0);
        s.velocity = Vec2::new(5.0, 3.0);
        assert!(!s.bounce_off_bounds(screen()));
        assert_eq!(s.velocity, Vec2::new(5.0, 3.0));
    }

    #[test]
    fn test_intersects_with() {
        let a = stick_at(Vec2::new(10.0, 10.0), 0.0, 10.0);
        let crossing = stick_at(Vec2::new(10.0, 10.0), core::f32::consts::FRAC_PI_2, 10.0);
        assert!(a.intersects_with(&crossing));
        // Tip at x=15 meets a tip at x=16.5: within the 2.0 tolerance.
        let tip = stick_at(Vec2::new(21.5, 10.0), 0.0, 10.0);
        assert!(a.intersects_with(&tip));
        let far = stick_at(Vec2::new(40.0, 40.0), 0.0, 10.0);
        assert!(!a.intersects_with(&far));
    }

    #[test]
    fn test_intersects_with_mixed_widths_is_symmetric() {
        let thin = Stick::new(StickParams {
            position: Vec2::new(10.0, 10.0),
            width: 0.5,
            ..Default::default()
        })
        .unwrap();
        // Tips at x=15 and x=16: a gap of 1.0, inside only the wide stick's tolerance.
        let wide = Stick::new(StickParams {
            position: Vec2::new(21.0, 10.0),
            width: 4.0,
            ..Default::default()
        })
        .unwrap();
        assert!(thin.intersects_with(&wide));
        assert!(wide.intersects_with(&thin));
    }
}
