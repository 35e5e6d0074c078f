use glam::Vec2;

use crate::api::{NarrowphaseApi, RigidBodyApi};
use crate::narrowphase::Narrowphase;
use crate::stick::{Stick, reflect_in_bounds};
use crate::types::*;

impl MassState {
    /// Inertia about `about` via the parallel-axis theorem.
    pub fn inertia_about(&self, about: Vec2) -> f32 {
        self.inertia + self.mass * self.position.distance_squared(about)
    }

    pub fn linear_momentum(&self) -> Vec2 {
        self.velocity * self.mass
    }

    pub fn angular_momentum(&self) -> f32 {
        self.inertia * self.omega
    }

    /// Fuse two bodies into one rigid body at their common center of mass.
    ///
    /// Mass and linear momentum add. Each body's inertia is re-anchored at the
    /// new center of mass, and the spin is the inertia-weighted mean of the two
    /// spins. Zero total inertia yields zero spin; zero total mass yields the
    /// midpoint at rest.
    pub fn merge(a: MassState, b: MassState) -> MassState {
        let mass = a.mass + b.mass;
        let (position, velocity) = if mass > 0.0 {
            (
                (a.position * a.mass + b.position * b.mass) / mass,
                (a.velocity * a.mass + b.velocity * b.mass) / mass,
            )
        } else {
            ((a.position + b.position) * 0.5, Vec2::ZERO)
        };

        let ia = a.inertia_about(position);
        let ib = b.inertia_about(position);
        let inertia = ia + ib;
        let omega = if inertia > 0.0 {
            (ia * a.omega + ib * b.omega) / inertia
        } else {
            0.0
        };

        MassState { mass, position, velocity, inertia, omega }
    }
}

/// Rigid aggregate of segments sharing one pose, velocity and spin.
///
/// `position` is always the center of mass and `inertia` is taken about it.
/// Segments are append-only in merge order.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeBody {
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub omega: f32,
    mass: f32,
    inertia: f32,
    segments: Vec<RigidSegment>,
}

impl CompositeBody {
    /// Single-contributor composite occupying exactly the stick's pose.
    pub fn from_stick(stick: Stick) -> Self {
        Self {
            position: stick.position,
            rotation: stick.rotation,
            velocity: stick.velocity,
            omega: stick.omega,
            mass: stick.segment.mass,
            inertia: stick.self_inertia(),
            segments: vec![stick.segment],
        }
    }

    /// Fuse two free sticks. The composite starts out aligned with `a`.
    pub fn create_from(a: Stick, b: Stick) -> Self {
        let mut body = Self::from_stick(a);
        body.absorb_stick(b);
        body
    }

    /// Grow by one stick; the stick is consumed.
    pub fn absorb_stick(&mut self, stick: Stick) {
        self.absorb_body(&stick);
    }

    /// Take over every segment of `other`; `other` is consumed.
    pub fn absorb_composite(&mut self, other: CompositeBody) {
        self.absorb_body(&other);
    }

    fn absorb_body(&mut self, other: &impl RigidBodyApi) {
        let merged = MassState::merge(self.mass_state(), other.mass_state());

        // Keep existing segments fixed in world space while the origin moves.
        let shift = Vec2::from_angle(-self.rotation).rotate(self.position - merged.position);
        for seg in &mut self.segments {
            seg.local_offset += shift;
        }

        self.position = merged.position;
        self.velocity = merged.velocity;
        self.omega = merged.omega;
        self.mass = merged.mass;
        self.inertia = merged.inertia;

        let (other_pos, other_rot) = (other.position(), other.rotation());
        let to_other = Vec2::from_angle(other_rot);
        let to_local = Vec2::from_angle(-self.rotation);
        for seg in other.segments() {
            let world_mid = other_pos + to_other.rotate(seg.local_offset);
            self.segments.push(RigidSegment {
                local_offset: to_local.rotate(world_mid - self.position),
                local_rotation: seg.local_rotation + other_rot - self.rotation,
                ..*seg
            });
        }
    }

    /// Inertia recomputed from the stored segments about `position`.
    pub fn recomputed_inertia(&self) -> f32 {
        self.segments
            .iter()
            .map(|s| s.self_inertia() + s.mass * s.local_offset.length_squared())
            .sum()
    }

    /// Contact with a stick: any segment crossing it or meeting it tip to tip
    /// within the stick's tolerance.
    pub fn intersects_stick(&self, stick: &Stick) -> bool {
        let (q1, q2) = stick.world_endpoints();
        let tol = stick.tolerance();
        self.world_segments()
            .into_iter()
            .any(|(p1, p2)| Narrowphase::proximity_connect(p1, p2, q1, q2, tol))
    }

    /// Contact with another composite. Only true crossings count here; the
    /// tip-to-tip tolerance used for sticks is not applied.
    pub fn intersects_composite(&self, other: &CompositeBody) -> bool {
        let theirs = other.world_segments();
        self.world_segments().into_iter().any(|(p1, p2)| {
            theirs
                .iter()
                .any(|&(q1, q2)| Narrowphase::segments_intersect(p1, p2, q1, q2))
        })
    }
}

impl RigidBodyApi for CompositeBody {
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
        self.mass
    }

    fn inertia(&self) -> f32 {
        self.inertia
    }

    fn segments(&self) -> &[RigidSegment] {
        &self.segments
    }

    fn integrate(&mut self, dt: f32, bounds: Bounds) {
        self.position += self.velocity * dt;
        self.rotation += self.omega * dt;
        self.bounce_off_bounds(bounds);
    }

    fn bounce_off_bounds(&mut self, bounds: Bounds) -> bool {
        let (min, max) = self.world_aabb();
        reflect_in_bounds(min, max, bounds, &mut self.velocity, &mut self.omega)
    }
}
