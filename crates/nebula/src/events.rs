//! # Input Queue
//!
//! Bounded channel carrying input from producer threads (window, network) to
//! the simulation thread, which drains it at the start of every tick.
//!
//! ```text
//! ┌──────────┐   InputSender    ┌────────────┐   drain()   ┌────────────┐
//! │  window  │─────────────────>│ InputQueue │────────────>│ Simulation │
//! └──────────┘                  │ (bounded)  │             │   tick()   │
//! ┌──────────┐   InputSender    │            │             └────────────┘
//! │ network  │─────────────────>│            │
//! └──────────┘                  └────────────┘
//! ```

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use nebula_core::InputEvent;

/// Consumer side, owned by the simulation.
pub struct InputQueue {
    sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
}

impl InputQueue {
    /// Creates a queue.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Events held before producers start dropping them
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a producer handle. Clone freely.
    #[must_use]
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Takes the events queued so far. Events sent while draining wait for
    /// the next call.
    pub fn drain(&self) -> impl Iterator<Item = InputEvent> + '_ {
        let pending = self.receiver.len();
        self.receiver.try_iter().take(pending)
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// Producer handle.
#[derive(Clone)]
pub struct InputSender {
    sender: Sender<InputEvent>,
}

impl InputSender {
    /// Queues an event without blocking.
    ///
    /// Returns `false` if the queue is full or the simulation is gone; the
    /// event is dropped.
    #[inline]
    pub fn send(&self, event: impl Into<InputEvent>) -> bool {
        match self.sender.try_send(event.into()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("input queue full, event dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Queues an event, waiting for room.
    #[inline]
    pub fn send_blocking(&self, event: impl Into<InputEvent>) -> bool {
        self.sender.send(event.into()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use nebula_core::{KeyCode, KeyEvent};

    use super::*;

    #[test]
    fn test_drain_in_order() {
        let queue = InputQueue::new(8);
        let sender = queue.sender();
        assert!(sender.send(KeyEvent::pressed(KeyCode(1))));
        assert!(sender.send(KeyEvent::released(KeyCode(1))));

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![
                InputEvent::Keyboard(KeyEvent::pressed(KeyCode(1))),
                InputEvent::Keyboard(KeyEvent::released(KeyCode(1))),
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_drops() {
        let queue = InputQueue::new(1);
        let sender = queue.sender();
        assert!(sender.send(KeyEvent::pressed(KeyCode(1))));
        assert!(!sender.send(KeyEvent::pressed(KeyCode(2))));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_cross_thread_producer() {
        let queue = InputQueue::new(64);
        let sender = queue.sender();
        std::thread::spawn(move || {
            for key in 0..10 {
                sender.send_blocking(KeyEvent::pressed(KeyCode(key)));
            }
        })
        .join()
        .unwrap();
        assert_eq!(queue.drain().count(), 10);
    }
}
