//! # Behaviours
//!
//! Scriptable components. Every callback receives a [`ScriptContext`] giving
//! mutable access to the whole scene plus the identity of the calling
//! component, so scripts can move actors, spawn and destroy, or schedule
//! coroutines on themselves.
//!
//! Lifecycle:
//!
//! ```text
//! add_component / clone ──> awake
//! first enabled update  ──> start, then update
//! every enabled update  ──> update
//! input / collisions    ──> on_keyboard, on_mouse, on_collision
//! ```

use std::time::Duration;

use crate::component::ComponentId;
use crate::coroutine::{Coroutine, CoroutineId};
use crate::input::{KeyEvent, MouseEvent};
use crate::scene::{ActorId, Scene};

/// Scripting capability of a component.
///
/// All callbacks default to doing nothing.
pub trait Behaviour {
    /// Called once when the component is attached, and again on every clone.
    fn awake(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Called once, right before the first `update` the owner receives while enabled.
    fn start(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Called every tick while the owner and all its ancestors are enabled.
    fn update(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Keyboard input.
    fn on_keyboard(&mut self, _ctx: &mut ScriptContext<'_>, _event: &KeyEvent) {}

    /// Mouse input.
    fn on_mouse(&mut self, _ctx: &mut ScriptContext<'_>, _event: &MouseEvent) {}

    /// A collider of the owner overlaps a collider of `peer` this tick.
    ///
    /// `peer` is the actor in the other tree whose collider resolved the hit.
    /// Fires every tick the overlap holds.
    fn on_collision(&mut self, _ctx: &mut ScriptContext<'_>, _peer: ActorId) {}
}

/// What a behaviour or coroutine sees while it runs.
///
/// The running component's body is checked out of the scene for the duration
/// of the call, so looking itself up through [`Scene::component`] yields `None`.
pub struct ScriptContext<'a> {
    scene: &'a mut Scene,
    owner: ActorId,
    component: ComponentId,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(scene: &'a mut Scene, owner: ActorId, component: ComponentId) -> Self {
        Self {
            scene,
            owner,
            component,
        }
    }

    /// The scene.
    #[inline]
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &*self.scene
    }

    /// The scene, mutably.
    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut *self.scene
    }

    /// Actor owning the running component.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// The running component.
    #[inline]
    #[must_use]
    pub const fn this(&self) -> ComponentId {
        self.component
    }

    /// Simulated time advanced by the current tick.
    #[inline]
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.scene.delta()
    }

    /// Simulated time since the scene was created.
    #[inline]
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scene.now()
    }

    /// Schedules a coroutine on the running component. It first runs on the next pass.
    pub fn start_coroutine(&mut self, coroutine: impl Coroutine + 'static) -> CoroutineId {
        self.scene
            .start_coroutine(self.component, Box::new(coroutine), None)
            .unwrap_or(CoroutineId::NONE)
    }

    /// Schedules a named coroutine.
    ///
    /// A running coroutine with the same name is left alone; stop it first if
    /// only one should run.
    pub fn start_named_coroutine(
        &mut self,
        name: impl Into<String>,
        coroutine: impl Coroutine + 'static,
    ) -> CoroutineId {
        self.scene
            .start_coroutine(self.component, Box::new(coroutine), Some(name.into()))
            .unwrap_or(CoroutineId::NONE)
    }

    /// Stops a coroutine of the running component. Returns `false` if it was not running.
    pub fn stop_coroutine(&mut self, id: CoroutineId) -> bool {
        self.scene.stop_coroutine(self.component, id)
    }

    /// Stops the first coroutine with this name.
    pub fn stop_named_coroutine(&mut self, name: &str) -> bool {
        self.scene.stop_named_coroutine(self.component, name)
    }

    /// Checks if a coroutine is still scheduled.
    #[must_use]
    pub fn is_coroutine_running(&self, id: CoroutineId) -> bool {
        self.scene.is_coroutine_running(self.component, id)
    }

    /// Checks if any coroutine with this name is still scheduled.
    #[must_use]
    pub fn is_named_coroutine_running(&self, name: &str) -> bool {
        self.scene.is_named_coroutine_running(self.component, name)
    }

    /// Abandons every coroutine of the running component.
    pub fn stop_all_coroutines(&mut self) {
        self.scene.stop_all_coroutines(self.component);
    }

    /// Flags the owner for destruction at the end of the tick.
    pub fn destroy_owner(&mut self) {
        self.scene.destroy(self.owner);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Behaviour;
    use crate::component::Component;

    /// Behaviour with no callbacks, used to host coroutines.
    #[derive(Clone, Copy, Debug, Default)]
    pub(crate) struct Idle;

    impl Behaviour for Idle {}

    impl Component for Idle {
        fn as_behaviour_mut(&mut self) -> Option<&mut dyn Behaviour> {
            Some(self)
        }
    }
}
