use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SandboxError};

/// Stable handle for a live body. Sticks and composites share one id space
/// and ids are never reused within a sandbox.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Straight RGBA color passed through to the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    /// Fully saturated color for a hue in turns (`0.0..1.0`).
    pub fn from_hue(hue: f32) -> Self {
        let h = hue.rem_euclid(1.0) * 6.0;
        let x = 1.0 - ((h % 2.0) - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A rigid sub-piece of a body, expressed in the owning body's frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RigidSegment {
    /// Midpoint relative to the body pose, in the body's unrotated frame.
    pub local_offset: Vec2,
    /// Orientation relative to the body rotation (radians).
    pub local_rotation: f32,
    pub half_length: f32,
    pub mass: f32,
    pub color: Color,
    /// Rendered width; half of it is the contact tolerance.
    pub width: f32,
}

impl RigidSegment {
    pub fn length(&self) -> f32 {
        self.half_length * 2.0
    }

    /// Moment of inertia of a thin rod about its own midpoint: `m * L^2 / 12`.
    pub fn self_inertia(&self) -> f32 {
        let len = self.length();
        self.mass * len * len / 12.0
    }
}

/// World-space segment handed to the presentation layer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldSegment {
    pub a: Vec2,
    pub b: Vec2,
    pub color: Color,
    pub width: f32,
}

/// Axis-aligned screen rectangle bodies bounce inside.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Screen rectangle anchored at the origin.
    pub fn from_size(size: Vec2) -> Self {
        Self { min: Vec2::ZERO, max: size }
    }
}

/// Lumped mass properties of a body about its own center of mass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MassState {
    pub mass: f32,
    /// Center of mass in world space.
    pub position: Vec2,
    pub velocity: Vec2,
    /// Moment of inertia about `position`.
    pub inertia: f32,
    pub omega: f32,
}

/// Which coordinator pass produced a merge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MergeKind {
    StickStick,
    StickComposite,
    CompositeComposite,
}

/// Discrete notifications for the presentation layer (sound, effects).
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A stick entered the sandbox.
    Spawned { id: BodyId },
    /// `absorbed` bodies were fused into `survivor` and no longer exist.
    Merged {
        kind: MergeKind,
        survivor: BodyId,
        absorbed: Vec<BodyId>,
    },
    /// Level change of the "something spins fast" ambient sound.
    FastSpin { active: bool },
}

/// Tunables for spawning and the sound trigger.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub min_len: f32,
    pub max_len: f32,
    /// Spin magnitude range; the sign is chosen at random.
    pub min_omega: f32,
    pub max_omega: f32,
    /// Rendered stick width. Half of it is the contact tolerance.
    pub thickness: f32,
    pub mass_per_unit_length: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// `|omega|` above which the fast-spin sound plays.
    pub omega_sound_threshold: f32,
    /// Screen size; bounds span `(0,0)..screen_size`.
    pub screen_size: Vec2,
    /// Fixed RNG seed for reproducible spawns.
    pub seed: Option<u64>,
    /// Maximum number of buffered events; extra are dropped.
    pub max_events: usize,
    /// Enable internal timing instrumentation (adds small overhead when true).
    pub enable_timing: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            min_len: 30.0,
            max_len: 120.0,
            min_omega: 0.5,
            max_omega: 4.0,
            thickness: 4.0,
            mass_per_unit_length: 0.01,
            min_speed: 30.0,
            max_speed: 160.0,
            omega_sound_threshold: 6.0,
            screen_size: Vec2::new(1024.0, 600.0),
            seed: None,
            max_events: 1024,
            enable_timing: false,
        }
    }
}

impl SandboxConfig {
    /// Parse a JSON document; missing keys fall back to defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: SandboxConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        check_range("len", self.min_len, self.max_len)?;
        check_range("omega", self.min_omega, self.max_omega)?;
        check_range("speed", self.min_speed, self.max_speed)?;
        check_positive("min_len", self.min_len)?;
        check_positive("thickness", self.thickness)?;
        check_positive("mass_per_unit_length", self.mass_per_unit_length)?;
        check_positive("screen_size.x", self.screen_size.x)?;
        check_positive("screen_size.y", self.screen_size.y)?;
        if self.min_omega < 0.0 {
            return Err(SandboxError::InvalidConfig { name: "min_omega", value: self.min_omega });
        }
        if self.min_speed < 0.0 {
            return Err(SandboxError::InvalidConfig { name: "min_speed", value: self.min_speed });
        }
        if !(self.omega_sound_threshold >= 0.0) {
            return Err(SandboxError::InvalidConfig {
                name: "omega_sound_threshold",
                value: self.omega_sound_threshold,
            });
        }
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_size(self.screen_size)
    }
}

fn check_range(name: &'static str, min: f32, max: f32) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(SandboxError::InvalidRange { name, min, max });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f32) -> Result<()> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(SandboxError::InvalidConfig { name, value });
    }
    Ok(())
}

/// Debug statistics for the live bodies.
#[derive(Copy, Clone, Debug, Default)]
pub struct SandboxStats {
    pub sticks: usize,
    pub composites: usize,
    pub segments: usize,
    pub total_mass: f32,
    /// `Σ m·v` over all live bodies.
    pub linear_momentum: Vec2,
    /// `Σ I·ω`, each body about its own center of mass.
    pub angular_momentum: f32,
    pub ticks: u64,
    pub merges: u64,
}

/// Timing breakdown for the last completed tick.
#[derive(Copy, Clone, Debug, Default)]
pub struct SandboxTiming {
    pub integrate_ms: f64,
    pub scan_ms: f64,
    pub merged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_rod_self_inertia() {
        let seg = RigidSegment {
            local_offset: Vec2::ZERO,
            local_rotation: 0.0,
            half_length: 10.0,
            mass: 0.2,
            color: Color::WHITE,
            width: 4.0,
        };
        assert_relative_eq!(seg.self_inertia(), 0.2 * 400.0 / 12.0, max_relative = 1e-5);
    }

    #[test]
    fn test_config_json_defaults_and_overrides() {
        let cfg = SandboxConfig::from_json_str(r#"{ "min_len": 10.0, "seed": 7 }"#).unwrap();
        assert_eq!(cfg.min_len, 10.0);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.max_len, SandboxConfig::default().max_len);
    }

    #[test]
    fn test_config_rejects_inverted_range() {
        let err = SandboxConfig::from_json_str(r#"{ "min_speed": 50.0, "max_speed": 10.0 }"#)
            .unwrap_err();
        assert!(matches!(err, SandboxError::InvalidRange { name: "speed", .. }));
    }

    #[test]
    fn test_config_rejects_bad_json() {
        let err = SandboxConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, SandboxError::Config(_)));
    }

    #[test]
    fn test_hue_primaries() {
        let red = Color::from_hue(0.0);
        assert_eq!((red.r, red.g, red.b), (1.0, 0.0, 0.0));
        let blue = Color::from_hue(4.0 / 6.0);
        assert_abs_diff_eq!(blue.b, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(blue.g, 0.0, epsilon = 1e-5);
    }
}
