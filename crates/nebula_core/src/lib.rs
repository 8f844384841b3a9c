//! # NEBULA Core Runtime
//!
//! Actor runtime for a real-time arcade simulation:
//! - A scene graph of actors owning pluggable components
//! - Generation-checked handles that go empty instead of dangling
//! - Cooperative coroutines scheduled per behaviour, no threads involved
//! - Broad-phase collision over a fixed worker pool
//!
//! ## Tick Order
//!
//! ```text
//! Scene::update ──> CollisionPool::detect ──> Scene::deliver_collisions
//!               ──> Scene::execute_coroutines ──> Scene::remove_destroyed
//! ```
//!
//! Only the collision pool runs off the simulation thread, and it reads an
//! immutable snapshot.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nebula_core::{CircleCollider, Scene};
//!
//! let mut scene = Scene::new();
//! let ship = scene.create_actor(None, "ship");
//! scene.add_component(ship, CircleCollider::new(10.0));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod behaviour;
pub mod collision;
pub mod component;
pub mod coroutine;
pub mod error;
pub mod handle;
pub mod input;
pub mod scene;

pub use behaviour::{Behaviour, ScriptContext};
pub use collision::{CollisionFrame, CollisionPool};
pub use component::{CircleCollider, Collider, Component, ComponentEntry, ComponentId, WorldShape};
pub use coroutine::{Coroutine, CoroutineId, CoroutineMaster, FadeOpacity, Yield};
pub use error::{CoreError, CoreResult};
pub use handle::{HandleRegistry, SafeHandle};
pub use input::{InputEvent, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
pub use scene::{Actor, ActorId, DrawSurface, Scene, SpriteCommand, TextureId};
