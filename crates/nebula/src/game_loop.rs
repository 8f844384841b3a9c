//! # NEBULA Simulation Loop
//!
//! One tick, always in this order:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 0. CLOCK + INPUT                                                    │
//! │    ├─ Clamp delta, advance the scene clock                          │
//! │    └─ Drain the input queue into keyboard/mouse callbacks           │
//! │                                                                     │
//! │ 1. UPDATE          start/update on every active behaviour           │
//! │                                                                     │
//! │ 2. COLLISION       snapshot ──> worker pool ──> on_collision        │
//! │                                                                     │
//! │ 3. COROUTINES      one scheduling pass per component                │
//! │                                                                     │
//! │ 4. SWEEP           free flagged actors and components               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//! Drawing only reads the scene and may happen between ticks.

use std::time::{Duration, Instant};

use nebula_core::{CollisionPool, DrawSurface, Scene};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::events::{InputQueue, InputSender};

/// Timing and counters for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Tick number, starting at 0.
    pub frame: u64,
    /// Simulated time the tick advanced, after clamping.
    pub delta: Duration,
    /// Total tick time in microseconds.
    pub total_us: u64,
    /// Update pass time in microseconds.
    pub update_us: u64,
    /// Collision capture, test and delivery time in microseconds.
    pub collision_us: u64,
    /// Coroutine pass time in microseconds.
    pub coroutine_us: u64,
    /// Sweep time in microseconds.
    pub sweep_us: u64,
    /// Input events delivered.
    pub input_events: u32,
    /// Colliding pairs delivered.
    pub collisions: u32,
    /// Actors freed by the sweep.
    pub actors_swept: u32,
}

#[allow(clippy::cast_possible_truncation)]
fn micros(since: Instant) -> u64 {
    since.elapsed().as_micros() as u64
}

/// Owns the scene and everything that drives it.
pub struct Simulation {
    scene: Scene,
    pool: CollisionPool,
    input: InputQueue,
    config: EngineConfig,
    frame_count: u64,
}

impl Simulation {
    /// Creates a simulation with an empty scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the collision pool cannot start.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let pool = match config.collision_workers {
            Some(workers) => CollisionPool::new(workers)?,
            None => CollisionPool::with_hardware_concurrency()?,
        };
        tracing::info!(
            workers = pool.workers(),
            target_fps = config.target_fps,
            "simulation created"
        );

        Ok(Self {
            scene: Scene::new(),
            pool,
            input: InputQueue::new(config.input_queue_capacity),
            config,
            frame_count: 0,
        })
    }

    /// The scene.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, mutably. Use between ticks to build the world.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Collision worker count.
    #[must_use]
    pub fn collision_workers(&self) -> usize {
        self.pool.workers()
    }

    /// Handle for other threads to queue input.
    #[must_use]
    pub fn input_sender(&self) -> InputSender {
        self.input.sender()
    }

    /// Runs one tick.
    ///
    /// # Arguments
    ///
    /// * `delta` - Simulated time to advance, clamped to `max_delta_ms`
    pub fn tick(&mut self, delta: Duration) -> FrameStats {
        let started = Instant::now();
        let mut stats = FrameStats {
            frame: self.frame_count,
            delta: delta.min(self.config.max_delta()),
            ..FrameStats::default()
        };
        self.scene.advance_clock(stats.delta);

        for event in self.input.drain() {
            self.scene.notify_input(&event);
            stats.input_events += 1;
        }

        let phase = Instant::now();
        self.scene.update();
        stats.update_us = micros(phase);

        let phase = Instant::now();
        let pairs = self.pool.detect(&self.scene);
        self.scene.deliver_collisions(&pairs);
        stats.collision_us = micros(phase);
        stats.collisions = u32::try_from(pairs.len()).unwrap_or(u32::MAX);

        let phase = Instant::now();
        self.scene.execute_coroutines();
        stats.coroutine_us = micros(phase);

        let phase = Instant::now();
        stats.actors_swept = u32::try_from(self.scene.remove_destroyed()).unwrap_or(u32::MAX);
        stats.sweep_us = micros(phase);

        stats.total_us = micros(started);
        self.frame_count += 1;

        if started.elapsed() > self.config.frame_budget() {
            tracing::warn!(
                frame = stats.frame,
                total_us = stats.total_us,
                collisions = stats.collisions,
                actors = self.scene.actor_count(),
                "tick over frame budget"
            );
        }
        stats
    }

    /// Draws every top-level tree ordered by depth.
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        self.scene.draw_scene(surface, self.config.draw_colliders);
    }
}
