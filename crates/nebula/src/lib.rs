//! # NEBULA
//!
//! Simulation host for the NEBULA actor runtime.
//!
//! ```text
//! ┌──────────────┐  InputSender  ┌─────────────────────────────────────┐
//! │ window / net │──────────────>│ Simulation                          │
//! └──────────────┘               │  ├─ Scene          (nebula_core)    │
//!                                │  ├─ CollisionPool  (worker threads) │
//! ┌──────────────┐  DrawSurface  │  └─ EngineConfig   (TOML)           │
//! │   renderer   │<──────────────│                                     │
//! └──────────────┘               └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration
//! - `events`: cross-thread input queue
//! - `game_loop`: the per-tick driver
//! - `logging`: tracing subscriber setup

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod events;
pub mod game_loop;
pub mod logging;

pub use nebula_core as core;
pub use nebula_shared as shared;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use events::{InputQueue, InputSender};
pub use game_loop::{FrameStats, Simulation};
