//! stickfuse: stick sandbox where rods fuse into rigid composites on contact

pub mod types;
pub mod api;
pub mod error;
pub mod narrowphase;
pub mod stick;
pub mod composite;
pub mod world;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::error::{Result, SandboxError};
pub use crate::narrowphase::Narrowphase;
pub use crate::stick::{Stick, StickParams};
pub use crate::composite::CompositeBody;
pub use crate::world::Sandbox;
