use thiserror::Error;

use crate::types::BodyId;

/// Errors surfaced by body construction, configuration and lookups.
#[derive(Error, Debug)]
pub enum SandboxError {
    /// Stick geometry or mass that cannot describe a physical rod.
    #[error("invalid stick: length {length} and mass {mass} must be positive and finite")]
    InvalidStick { length: f32, mass: f32 },

    /// A `[min, max]` option pair that is inverted or non-finite.
    #[error("invalid range for {name}: [{min}, {max}]")]
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },

    /// A scalar option outside its allowed domain.
    #[error("invalid config value for {name}: {value}")]
    InvalidConfig { name: &'static str, value: f32 },

    /// Config text that failed to parse.
    #[error("failed to parse config: {0}")]
    Config(#[from] serde_json::Error),

    /// Every body handle has been issued.
    #[error("body handles exhausted")]
    HandlesExhausted,

    /// Handle that does not refer to a live body.
    #[error("no live body with id {0:?}")]
    UnknownBody(BodyId),
}

pub type Result<T> = std::result::Result<T, SandboxError>;
