//! Fixed-size collision worker pool.
//!
//! Each worker owns one slot: a mutex-guarded record plus two condition
//! variables. The dispatcher fills a slot and raises `ready`; the worker tests
//! its partition, lowers `ready` and signals back.
//!
//! ```text
//!  dispatcher                         worker k
//!  ──────────                         ────────
//!  lock slot k, fill, ready = true
//!  notify data_available ───────────> wake, test partition, push results
//!                                     ready = false
//!  wait work_finished  <───────────── notify work_finished
//!  drain results
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use nebula_shared::constants::MIN_COLLISION_WORKERS;
use parking_lot::{Condvar, Mutex};

use crate::error::{CoreError, CoreResult};
use crate::scene::{ActorId, Scene};

use super::frame::CollisionFrame;
use super::partition::{partition, Partition};

#[derive(Default)]
struct WorkerData {
    ready: bool,
    partition: Partition,
    frame: Option<Arc<CollisionFrame>>,
    results: Vec<(ActorId, ActorId)>,
}

#[derive(Default)]
struct WorkerSlot {
    data: Mutex<WorkerData>,
    data_available: Condvar,
    work_finished: Condvar,
}

/// Persistent worker threads testing top-level tree pairs in parallel.
///
/// Dropping the pool stops and joins every worker.
pub struct CollisionPool {
    slots: Vec<Arc<WorkerSlot>>,
    handles: Vec<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl CollisionPool {
    /// Spawns `workers` threads.
    ///
    /// # Errors
    ///
    /// Returns an error if `workers` is zero or a thread fails to start.
    /// Workers already started are shut down before returning.
    pub fn new(workers: usize) -> CoreResult<Self> {
        if workers == 0 {
            return Err(CoreError::EmptyPool);
        }

        let mut pool = Self {
            slots: Vec::with_capacity(workers),
            handles: Vec::with_capacity(workers),
            stop: Arc::new(AtomicBool::new(false)),
        };

        for index in 0..workers {
            let slot = Arc::new(WorkerSlot::default());
            let worker_slot = Arc::clone(&slot);
            let worker_stop = Arc::clone(&pool.stop);

            let handle = thread::Builder::new()
                .name(format!("nebula-collision-{index}"))
                .spawn(move || Self::worker_loop(&worker_slot, &worker_stop))
                .map_err(|source| CoreError::WorkerSpawn { index, source })?;

            pool.slots.push(slot);
            pool.handles.push(handle);
        }

        tracing::debug!(workers, "collision pool started");
        Ok(pool)
    }

    /// Sizes the pool to the available hardware parallelism, at least two workers.
    ///
    /// # Errors
    ///
    /// Returns an error if a thread fails to start.
    pub fn with_hardware_concurrency() -> CoreResult<Self> {
        let workers = thread::available_parallelism()
            .map_or(MIN_COLLISION_WORKERS, usize::from)
            .max(MIN_COLLISION_WORKERS);
        Self::new(workers)
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.slots.len()
    }

    fn worker_loop(slot: &WorkerSlot, stop: &AtomicBool) {
        let mut data = slot.data.lock();
        loop {
            while !data.ready && !stop.load(Ordering::Acquire) {
                slot.data_available.wait(&mut data);
            }
            if stop.load(Ordering::Acquire) {
                break;
            }

            let WorkerData {
                partition,
                frame,
                results,
                ..
            } = &mut *data;
            if let Some(frame) = frame.take() {
                frame.test_partition(*partition, results);
            }

            data.ready = false;
            slot.work_finished.notify_one();
        }
        tracing::trace!("collision worker exiting");
    }

    /// Tests every pair of trees in `frame` and returns the colliding ones.
    ///
    /// Blocks until every engaged worker has finished. Pairs come back in the
    /// same order a single-threaded pass would produce.
    pub fn test_frame(&self, frame: Arc<CollisionFrame>) -> Vec<(ActorId, ActorId)> {
        let partitions = partition(frame.len(), self.slots.len());

        for (slot, part) in self.slots.iter().zip(&partitions) {
            {
                let mut data = slot.data.lock();
                data.partition = *part;
                data.frame = Some(Arc::clone(&frame));
                data.results.clear();
                data.ready = true;
            }
            slot.data_available.notify_one();
        }

        let mut pairs = Vec::new();
        for slot in self.slots.iter().take(partitions.len()) {
            let mut data = slot.data.lock();
            while data.ready {
                slot.work_finished.wait(&mut data);
            }
            pairs.append(&mut data.results);
        }
        pairs
    }

    /// Captures `scene` and tests it.
    pub fn detect(&self, scene: &Scene) -> Vec<(ActorId, ActorId)> {
        self.test_frame(Arc::new(CollisionFrame::capture(scene)))
    }
}

impl Drop for CollisionPool {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);

        // Taking each lock orders the store before the worker's next wait.
        for slot in &self.slots {
            let _guard = slot.data.lock();
            slot.data_available.notify_all();
        }

        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        tracing::debug!("collision pool stopped");
    }
}

#[cfg(test)]
mod tests {
    use nebula_shared::Vec2;

    use super::*;
    use crate::component::CircleCollider;

    fn ring_scene(count: usize) -> Scene {
        let mut scene = Scene::new();
        for i in 0..count {
            let ship = scene.create_actor(None, format!("ship{i}"));
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32 * 7.0;
            scene.set_local_position(ship, Vec2::new(x, 0.0));
            scene.add_component(ship, CircleCollider::new(4.0));
        }
        scene
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(CollisionPool::new(0), Err(CoreError::EmptyPool)));
    }

    #[test]
    fn test_hardware_pool_has_at_least_two() {
        let pool = CollisionPool::with_hardware_concurrency().unwrap();
        assert!(pool.workers() >= 2);
    }

    #[test]
    fn test_pool_matches_single_threaded_pass() {
        let scene = ring_scene(25);
        let frame = Arc::new(CollisionFrame::capture(&scene));
        let expected = frame.test_all();
        assert_eq!(expected.len(), 24);

        for workers in [1, 2, 3, 8] {
            let pool = CollisionPool::new(workers).unwrap();
            assert_eq!(pool.test_frame(Arc::clone(&frame)), expected);
            // Slots are reusable across frames.
            assert_eq!(pool.test_frame(Arc::clone(&frame)), expected);
        }
    }

    #[test]
    fn test_small_frames() {
        let pool = CollisionPool::new(4).unwrap();
        assert!(pool.detect(&ring_scene(0)).is_empty());
        assert!(pool.detect(&ring_scene(1)).is_empty());
        assert_eq!(pool.detect(&ring_scene(2)).len(), 1);
    }
}
