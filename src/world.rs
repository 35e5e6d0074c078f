use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::time::Instant;

use crate::api::{RigidBodyApi, SandboxApi};
use crate::composite::CompositeBody;
use crate::error::{Result, SandboxError};
use crate::stick::{Stick, StickParams};
use crate::types::*;

/// Live sandbox: body arena, collision coordinator, and event buffer.
///
/// Bodies live in ordered maps keyed by monotonically issued handles, so every
/// scan visits them in creation order and a merge simply removes the consumed
/// handles.
pub struct Sandbox {
    pub cfg: SandboxConfig,
    rng: StdRng,
    next_id: u32,

    sticks: BTreeMap<BodyId, Stick>,
    composites: BTreeMap<BodyId, CompositeBody>,

    // Pending notifications for the presentation layer
    events: Vec<Event>,
    spin_sound_playing: bool,

    ticks: u64,
    merges: u64,
    last_timing: Option<SandboxTiming>,
}

impl SandboxApi for Sandbox {
    fn new(cfg: SandboxConfig) -> Result<Self> {
        cfg.validate()?;
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(screen = ?cfg.screen_size, seed = ?cfg.seed, "sandbox created");
        Ok(Self {
            cfg,
            rng,
            next_id: 0,
            sticks: BTreeMap::new(),
            composites: BTreeMap::new(),
            events: Vec::new(),
            spin_sound_playing: false,
            ticks: 0,
            merges: 0,
            last_timing: None,
        })
    }

    fn spawn_stick(&mut self, at: Vec2) -> Result<BodyId> {
        // `cfg` is public and may have been edited since construction.
        self.cfg.validate()?;
        let cfg = &self.cfg;
        let rng = &mut self.rng;
        let length = rng.gen_range(cfg.min_len..=cfg.max_len);
        let speed = rng.gen_range(cfg.min_speed..=cfg.max_speed);
        let heading = rng.gen_range(0.0..TAU);
        let rotation = rng.gen_range(0.0..TAU);
        let spin = rng.gen_range(cfg.min_omega..=cfg.max_omega);
        let omega = if rng.gen_bool(0.5) { spin } else { -spin };
        let color = Color::from_hue(rng.gen_range(0.0..1.0));

        let params = StickParams {
            position: at,
            rotation,
            length,
            velocity: Vec2::from_angle(heading) * speed,
            omega,
            width: cfg.thickness,
            color,
            mass_per_unit_length: cfg.mass_per_unit_length,
        };
        self.spawn_stick_with(params)
    }

    fn spawn_stick_with(&mut self, params: StickParams) -> Result<BodyId> {
        let stick = Stick::new(params)?;
        let id = self.alloc_id()?;
        debug!(?id, length = stick.length(), mass = stick.mass(), "stick spawned");
        self.sticks.insert(id, stick);
        self.push_event(Event::Spawned { id });
        Ok(id)
    }

    fn clear(&mut self) {
        self.sticks.clear();
        self.composites.clear();
        if self.spin_sound_playing {
            self.spin_sound_playing = false;
            self.push_event(Event::FastSpin { active: false });
        }
    }

    fn integrate_all(&mut self, dt: f32) {
        let t0 = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
        let bounds = self.cfg.bounds();
        for stick in self.sticks.values_mut() {
            stick.integrate(dt, bounds);
        }
        for body in self.composites.values_mut() {
            body.integrate(dt, bounds);
        }
        self.ticks += 1;
        if let Some(t0) = t0 {
            self.last_timing = Some(SandboxTiming {
                integrate_ms: t0.elapsed().as_secs_f64() * 1000.0,
                ..Default::default()
            });
        }
    }

    fn run_collision_scan(&mut self) -> Option<MergeKind> {
        let t0 = if self.cfg.enable_timing { Some(Instant::now()) } else { None };

        // Ordered passes; the first contact found is the only merge this tick.
        let merged = if let Some((a, b)) = self.find_stick_pair() {
            self.merge_sticks(a, b)
        } else if let Some((stick, body)) = self.find_stick_composite() {
            self.merge_stick_into(stick, body)
        } else if let Some((a, b)) = self.find_composite_pair() {
            self.merge_composites(a, b)
        } else {
            None
        };

        if merged.is_some() {
            self.merges += 1;
        }
        if let Some(t0) = t0 {
            let timing = self.last_timing.get_or_insert_with(SandboxTiming::default);
            timing.scan_ms = t0.elapsed().as_secs_f64() * 1000.0;
            timing.merged = merged.is_some();
        }
        merged
    }

    fn update_ambient_sound_trigger(&mut self) {
        let thr = self.cfg.omega_sound_threshold;
        let fast = self
            .sticks
            .values()
            .map(|s| s.omega)
            .chain(self.composites.values().map(|c| c.omega))
            .any(|omega| omega.abs() > thr);
        if fast != self.spin_sound_playing {
            self.spin_sound_playing = fast;
            debug!(active = fast, "fast spin sound");
            self.push_event(Event::FastSpin { active: fast });
        }
    }

    fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn render_segments(&self) -> Vec<WorldSegment> {
        self.bodies()
            .into_iter()
            .flat_map(|(_, body)| body.render_segments())
            .collect()
    }

    fn stick(&self, id: BodyId) -> Option<&Stick> {
        self.sticks.get(&id)
    }

    fn composite(&self, id: BodyId) -> Option<&CompositeBody> {
        self.composites.get(&id)
    }

    fn body(&self, id: BodyId) -> Result<&dyn RigidBodyApi> {
        if let Some(s) = self.sticks.get(&id) {
            return Ok(s);
        }
        if let Some(c) = self.composites.get(&id) {
            return Ok(c);
        }
        Err(SandboxError::UnknownBody(id))
    }
}

impl Sandbox {
    fn alloc_id(&mut self) -> Result<BodyId> {
        let id = BodyId(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or(SandboxError::HandlesExhausted)?;
        Ok(id)
    }

    /// Buffer an event. Sound level changes bypass `max_events` so the
    /// presentation layer never misses a stop.
    fn push_event(&mut self, ev: Event) {
        if self.events.len() < self.cfg.max_events || matches!(ev, Event::FastSpin { .. }) {
            self.events.push(ev);
        }
    }

    fn find_stick_pair(&self) -> Option<(BodyId, BodyId)> {
        let sticks: Vec<(&BodyId, &Stick)> = self.sticks.iter().collect();
        for (i, (ia, a)) in sticks.iter().enumerate() {
            for (ib, b) in &sticks[i + 1..] {
                if a.intersects_with(b) {
                    return Some((**ia, **ib));
                }
            }
        }
        None
    }

    fn find_stick_composite(&self) -> Option<(BodyId, BodyId)> {
        for (is, s) in &self.sticks {
            for (ic, c) in &self.composites {
                if c.intersects_stick(s) {
                    return Some((*is, *ic));
                }
            }
        }
        None
    }

    fn find_composite_pair(&self) -> Option<(BodyId, BodyId)> {
        let bodies: Vec<(&BodyId, &CompositeBody)> = self.composites.iter().collect();
        for (i, (ia, a)) in bodies.iter().enumerate() {
            for (ib, b) in &bodies[i + 1..] {
                if a.intersects_composite(b) {
                    return Some((**ia, **ib));
                }
            }
        }
        None
    }

    fn merge_sticks(&mut self, a: BodyId, b: BodyId) -> Option<MergeKind> {
        if !self.sticks.contains_key(&a) || !self.sticks.contains_key(&b) {
            return None;
        }
        let id = match self.alloc_id() {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, "stick pair left unfused");
                return None;
            }
        };
        let sa = self.sticks.remove(&a)?;
        let sb = self.sticks.remove(&b)?;
        let body = CompositeBody::create_from(sa, sb);
        self.log_merge(MergeKind::StickStick, id, &body);
        self.composites.insert(id, body);
        self.push_event(Event::Merged {
            kind: MergeKind::StickStick,
            survivor: id,
            absorbed: vec![a, b],
        });
        Some(MergeKind::StickStick)
    }

    fn merge_stick_into(&mut self, stick: BodyId, into: BodyId) -> Option<MergeKind> {
        if !self.composites.contains_key(&into) {
            return None;
        }
        let s = self.sticks.remove(&stick)?;
        let body = self.composites.get_mut(&into)?;
        body.absorb_stick(s);
        let body = &self.composites[&into];
        self.log_merge(MergeKind::StickComposite, into, body);
        self.push_event(Event::Merged {
            kind: MergeKind::StickComposite,
            survivor: into,
            absorbed: vec![stick],
        });
        Some(MergeKind::StickComposite)
    }

    fn merge_composites(&mut self, keep: BodyId, gone: BodyId) -> Option<MergeKind> {
        if !self.composites.contains_key(&keep) {
            return None;
        }
        let other = self.composites.remove(&gone)?;
        let body = self.composites.get_mut(&keep)?;
        body.absorb_composite(other);
        let body = &self.composites[&keep];
        self.log_merge(MergeKind::CompositeComposite, keep, body);
        self.push_event(Event::Merged {
            kind: MergeKind::CompositeComposite,
            survivor: keep,
            absorbed: vec![gone],
        });
        Some(MergeKind::CompositeComposite)
    }

    fn log_merge(&self, kind: MergeKind, id: BodyId, body: &CompositeBody) {
        debug!(
            ?kind,
            ?id,
            segments = body.segments().len(),
            mass = body.mass(),
            omega = body.omega,
            "bodies fused"
        );
    }

    /// Every live body in handle order.
    pub fn bodies(&self) -> Vec<(BodyId, &dyn RigidBodyApi)> {
        let mut out: Vec<(BodyId, &dyn RigidBodyApi)> = self
            .sticks
            .iter()
            .map(|(id, s)| (*id, s as &dyn RigidBodyApi))
            .chain(self.composites.iter().map(|(id, c)| (*id, c as &dyn RigidBodyApi)))
            .collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    pub fn stick_count(&self) -> usize {
        self.sticks.len()
    }

    pub fn composite_count(&self) -> usize {
        self.composites.len()
    }

    /// Is the fast-spin sound currently on?
    pub fn spin_sound_playing(&self) -> bool {
        self.spin_sound_playing
    }

    /// Return debug stats for the live bodies.
    pub fn debug_stats(&self) -> SandboxStats {
        let mut stats = SandboxStats {
            sticks: self.sticks.len(),
            composites: self.composites.len(),
            ticks: self.ticks,
            merges: self.merges,
            ..Default::default()
        };
        for (_, body) in self.bodies() {
            let state = body.mass_state();
            stats.segments += body.segments().len();
            stats.total_mass += state.mass;
            stats.linear_momentum += state.linear_momentum();
            stats.angular_momentum += state.angular_momentum();
        }
        stats
    }

    /// Return timing breakdown for the last `integrate_all`/`run_collision_scan`.
    pub fn timing(&self) -> Option<SandboxTiming> {
        self.last_timing
    }
}
