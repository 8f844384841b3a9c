//! # Engine Constants
//!
//! Defaults shared by the core runtime and the host loop.

/// Lower bound for the collision worker pool when sized from hardware concurrency.
pub const MIN_COLLISION_WORKERS: usize = 2;

/// Frame rate the host loop budgets for.
pub const DEFAULT_TARGET_FPS: u32 = 60;

/// Largest simulated step a single tick may advance the clock by (milliseconds).
///
/// Keeps coroutine timers and movement sane after a debugger pause or window drag.
pub const DEFAULT_MAX_DELTA_MS: u64 = 100;

/// Fully opaque actor.
pub const OPACITY_OPAQUE: u8 = 255;

/// Tolerance used by the opacity fade to decide it reached its target.
pub const FADE_EPSILON: f32 = 0.01;
