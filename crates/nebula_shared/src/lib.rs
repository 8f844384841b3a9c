//! # NEBULA Shared
//!
//! Common types used by the actor runtime and everything that consumes it.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - window or GPU crates
//! - socket or wire-format crates
//!
//! Renderers and replication layers read these types, they do not define them.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{DEFAULT_MAX_DELTA_MS, DEFAULT_TARGET_FPS, MIN_COLLISION_WORKERS, OPACITY_OPAQUE};
pub use math::{Transform2, Vec2};
