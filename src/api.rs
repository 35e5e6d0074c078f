use glam::Vec2;

use crate::composite::CompositeBody;
use crate::error::Result;
use crate::narrowphase::Narrowphase;
use crate::stick::{Stick, StickParams};
use crate::types::*;

/// Public API contract for the stick sandbox.
pub trait SandboxApi {
    /// Construct a new sandbox; the config is validated first.
    fn new(cfg: SandboxConfig) -> Result<Self>
    where
        Self: Sized;

    // --- Spawning ----------------------------------------------------------

    /// Spawn one stick at `at` with length, speed, heading, and spin drawn
    /// from the configured ranges.
    fn spawn_stick(&mut self, at: Vec2) -> Result<BodyId>;

    /// Spawn one stick with explicit parameters.
    fn spawn_stick_with(&mut self, params: StickParams) -> Result<BodyId>;

    /// Remove every body and silence the fast-spin trigger.
    fn clear(&mut self);

    // --- Tick driver -------------------------------------------------------

    /// Advance every body by `dt` and bounce it off the screen bounds.
    fn integrate_all(&mut self, dt: f32);

    /// Find the first qualifying contact and perform at most one merge.
    fn run_collision_scan(&mut self) -> Option<MergeKind>;

    /// Re-evaluate the fast-spin sound level across all live bodies.
    fn update_ambient_sound_trigger(&mut self);

    /// Run one full tick in driver order.
    fn step(&mut self, dt: f32) -> Option<MergeKind> {
        self.integrate_all(dt);
        let merged = self.run_collision_scan();
        self.update_ambient_sound_trigger();
        merged
    }

    /// Drain and return the accumulated events.
    fn drain_events(&mut self) -> Vec<Event>;

    // --- Queries -----------------------------------------------------------

    /// World segments of every live body, in handle order.
    fn render_segments(&self) -> Vec<WorldSegment>;

    fn stick(&self, id: BodyId) -> Option<&Stick>;

    fn composite(&self, id: BodyId) -> Option<&CompositeBody>;

    /// Any live body by handle.
    fn body(&self, id: BodyId) -> Result<&dyn RigidBodyApi>;
}

/// Segment geometry primitives.
pub trait NarrowphaseApi {
    /// World endpoints of `seg` owned by a body at `position`/`rotation`.
    fn world_endpoints(position: Vec2, rotation: f32, seg: &RigidSegment) -> (Vec2, Vec2);

    /// Proper crossing or touching of segments `p1p2` and `q1q2`.
    fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool;

    /// Intersection, or any pair of endpoints within `tolerance`.
    fn proximity_connect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2, tolerance: f32) -> bool;
}

/// Capability set shared by sticks and composites. The coordinator and the
/// renderer only go through this.
pub trait RigidBodyApi {
    fn position(&self) -> Vec2;
    fn rotation(&self) -> f32;
    fn velocity(&self) -> Vec2;
    fn omega(&self) -> f32;
    fn mass(&self) -> f32;
    /// Moment of inertia about `position`.
    fn inertia(&self) -> f32;
    fn segments(&self) -> &[RigidSegment];

    /// Advance the pose by `dt`, then bounce off `bounds`.
    fn integrate(&mut self, dt: f32, bounds: Bounds);

    /// Reflect velocity and spin if the body's AABB crosses `bounds`.
    /// Returns true if any axis bounced.
    fn bounce_off_bounds(&mut self, bounds: Bounds) -> bool;

    /// World endpoints of every segment, recomputed from the current pose.
    fn world_segments(&self) -> Vec<(Vec2, Vec2)> {
        let (pos, rot) = (self.position(), self.rotation());
        self.segments()
            .iter()
            .map(|s| Narrowphase::world_endpoints(pos, rot, s))
            .collect()
    }

    /// World segments with presentation attributes attached.
    fn render_segments(&self) -> Vec<WorldSegment> {
        let (pos, rot) = (self.position(), self.rotation());
        self.segments()
            .iter()
            .map(|s| {
                let (a, b) = Narrowphase::world_endpoints(pos, rot, s);
                WorldSegment { a, b, color: s.color, width: s.width }
            })
            .collect()
    }

    /// AABB `(min, max)` over all segment endpoints.
    fn world_aabb(&self) -> (Vec2, Vec2) {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for (a, b) in self.world_segments() {
            min = min.min(a).min(b);
            max = max.max(a).max(b);
        }
        (min, max)
    }

    fn mass_state(&self) -> MassState {
        MassState {
            mass: self.mass(),
            position: self.position(),
            velocity: self.velocity(),
            inertia: self.inertia(),
            omega: self.omega(),
        }
    }
}
