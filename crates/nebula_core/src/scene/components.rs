//! Attaching, querying and driving components.

use crate::behaviour::{Behaviour, ScriptContext};
use crate::component::{Component, ComponentEntry, ComponentId};
use crate::coroutine::{self, Coroutine, CoroutineId};
use crate::input::{InputEvent, KeyEvent, MouseEvent};

use super::{ActorId, Scene};

impl Scene {
    // =========================================================================
    // Attach / query / destroy
    // =========================================================================

    /// Attaches `component` to `actor`. Behaviours receive `awake` before this returns.
    ///
    /// Returns `None` if the actor no longer resolves.
    pub fn add_component<C: Component>(&mut self, actor: ActorId, component: C) -> Option<ComponentId> {
        self.add_boxed_component(actor, Box::new(component))
    }

    /// Attaches an already boxed component.
    pub fn add_boxed_component(&mut self, actor: ActorId, component: Box<dyn Component>) -> Option<ComponentId> {
        if !self.actors.contains(actor) {
            return None;
        }
        let entry = ComponentEntry::new(actor, component);
        let behaviour = entry.behaviour;
        let id = self.attach_entry(actor, entry);
        if behaviour {
            self.with_behaviour(id, |b, ctx| b.awake(ctx));
        }
        Some(id)
    }

    /// Stores `entry` and lists it on its actor.
    pub(super) fn attach_entry(&mut self, actor: ActorId, entry: ComponentEntry) -> ComponentId {
        let collider = entry.collider;
        let id = self.components.insert(entry);
        if let Some(owner) = self.actors.get_mut(actor) {
            owner.components.push(id);
            if collider {
                owner.colliders.push(id);
            }
        }
        id
    }

    /// Copies the body of `source`, now back in its slot, into every copy
    /// made while it was checked out. Copies receive `awake`.
    fn fill_pending_copies(&mut self, source: ComponentId) {
        if self.pending_copies.is_empty() {
            return;
        }
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_copies)
            .into_iter()
            .partition(|(s, _)| *s == source);
        self.pending_copies = waiting;

        for (_, copy) in ready {
            let body = self
                .components
                .get(source)
                .and_then(|e| e.body.as_ref())
                .map(|b| b.clone_component());
            let Some(entry) = self.components.get_mut(copy) else {
                continue;
            };
            let Some(body) = body else {
                // The source was freed during its own callback.
                entry.destroyed = true;
                continue;
            };
            entry.body = Some(body);
            if entry.behaviour {
                self.with_behaviour(copy, |b, ctx| b.awake(ctx));
            }
        }
    }

    /// Registry entry of a component.
    #[must_use]
    pub fn component_entry(&self, id: ComponentId) -> Option<&ComponentEntry> {
        self.components.get(id)
    }

    /// Resolves a component and checks its concrete type.
    ///
    /// `None` if the handle is empty, the type differs, or the component is
    /// currently running one of its own callbacks.
    #[must_use]
    pub fn component<T: Component>(&self, id: ComponentId) -> Option<&T> {
        self.components.get(id)?.body.as_deref()?.downcast_ref::<T>()
    }

    /// Mutable variant of [`Scene::component`].
    #[must_use]
    pub fn component_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        self.components.get_mut(id)?.body.as_deref_mut()?.downcast_mut::<T>()
    }

    /// First component of type `T` on `actor`.
    #[must_use]
    pub fn get_component<T: Component>(&self, actor: ActorId) -> Option<ComponentId> {
        self.actor(actor)?
            .components
            .iter()
            .copied()
            .find(|c| self.component::<T>(*c).is_some())
    }

    /// Every component of type `T` on `actor`, in attach order.
    #[must_use]
    pub fn get_components<T: Component>(&self, actor: ActorId) -> Vec<ComponentId> {
        self.actor(actor).map_or_else(Vec::new, |a| {
            a.components
                .iter()
                .copied()
                .filter(|c| self.component::<T>(*c).is_some())
                .collect()
        })
    }

    /// Flags a component for removal at the next sweep. Flagged components get
    /// no further callbacks.
    pub fn destroy_component(&mut self, id: ComponentId) {
        if let Some(entry) = self.components.get_mut(id) {
            entry.destroyed = true;
        }
    }

    /// Checks the component's pending-destruction flag. Swept components read as destroyed.
    #[must_use]
    pub fn is_component_destroyed(&self, id: ComponentId) -> bool {
        self.components.get(id).map_or(true, |e| e.destroyed)
    }

    /// Runs `f` against the behaviour behind `id` with a context on this scene.
    ///
    /// Returns `false` if the component is gone, flagged, not a behaviour, or
    /// already running.
    pub(crate) fn with_behaviour<F>(&mut self, id: ComponentId, f: F) -> bool
    where
        F: FnOnce(&mut dyn Behaviour, &mut ScriptContext<'_>),
    {
        let Some(entry) = self.components.get_mut(id) else {
            return false;
        };
        if entry.destroyed || !entry.behaviour {
            return false;
        }
        let owner = entry.owner;
        let Some(mut body) = entry.body.take() else {
            return false;
        };

        let ran = match body.as_behaviour_mut() {
            Some(behaviour) => {
                f(behaviour, &mut ScriptContext::new(self, owner, id));
                true
            }
            None => false,
        };

        if let Some(entry) = self.components.get_mut(id) {
            entry.body = Some(body);
        }
        self.fill_pending_copies(id);
        ran
    }

    fn behaviours_of(&self, actor: ActorId) -> Vec<ComponentId> {
        self.actor(actor).map_or_else(Vec::new, |a| {
            a.components
                .iter()
                .copied()
                .filter(|c| self.components.get(*c).is_some_and(|e| e.behaviour && !e.destroyed))
                .collect()
        })
    }

    // =========================================================================
    // Per-tick driving
    // =========================================================================

    /// Runs one update pass: depth-first, pre-order from the root, skipping
    /// disabled subtrees. Each behaviour gets `start` before its first `update`.
    pub fn update(&mut self) {
        self.update_actor(self.root);
    }

    fn update_actor(&mut self, id: ActorId) {
        if !self.actor(id).is_some_and(|a| a.enabled) {
            return;
        }

        for component in self.behaviours_of(id) {
            let first = match self.components.get_mut(component) {
                Some(entry) if !entry.destroyed => !std::mem::replace(&mut entry.started, true),
                _ => continue,
            };
            self.with_behaviour(component, |b, ctx| {
                if first {
                    b.start(ctx);
                }
                b.update(ctx);
            });
        }

        let children: Vec<ActorId> = self.children(id).collect();
        for child in children {
            self.update_actor(child);
        }
    }

    /// Delivers a keyboard event to every behaviour of every active actor.
    pub fn notify_keyboard(&mut self, event: &KeyEvent) {
        self.notify_actor(self.root, &mut |b, ctx| b.on_keyboard(ctx, event));
    }

    /// Delivers a mouse event to every behaviour of every active actor.
    pub fn notify_mouse(&mut self, event: &MouseEvent) {
        self.notify_actor(self.root, &mut |b, ctx| b.on_mouse(ctx, event));
    }

    /// Delivers either kind of input event.
    pub fn notify_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Keyboard(key) => self.notify_keyboard(key),
            InputEvent::Mouse(mouse) => self.notify_mouse(mouse),
        }
    }

    fn notify_actor(
        &mut self,
        id: ActorId,
        notify: &mut dyn FnMut(&mut dyn Behaviour, &mut ScriptContext<'_>),
    ) {
        if !self.actor(id).is_some_and(|a| a.enabled) {
            return;
        }
        for component in self.behaviours_of(id) {
            self.with_behaviour(component, |b, ctx| notify(b, ctx));
        }
        let children: Vec<ActorId> = self.children(id).collect();
        for child in children {
            self.notify_actor(child, notify);
        }
    }

    /// Calls `on_collision` on every behaviour of both actors of every pair,
    /// each side receiving the other.
    pub fn deliver_collisions(&mut self, pairs: &[(ActorId, ActorId)]) {
        for &(a, b) in pairs {
            for component in self.behaviours_of(a) {
                self.with_behaviour(component, |beh, ctx| beh.on_collision(ctx, b));
            }
            for component in self.behaviours_of(b) {
                self.with_behaviour(component, |beh, ctx| beh.on_collision(ctx, a));
            }
        }
    }

    // =========================================================================
    // Coroutines
    // =========================================================================

    /// Runs one scheduling pass for every component in the tree, disabled ones included.
    pub fn execute_coroutines(&mut self) {
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            let components = self.actor(current).map(|a| a.components.clone()).unwrap_or_default();
            for component in components {
                coroutine::run_pass(self, component);
            }

            let mut children: Vec<ActorId> = self.children(current).collect();
            children.reverse();
            stack.extend(children);
        }
    }

    /// Schedules a coroutine on the behaviour `component`. It first runs on the next pass.
    ///
    /// Returns `None` if the component no longer resolves or is not a behaviour.
    pub fn start_coroutine(
        &mut self,
        component: ComponentId,
        coroutine: Box<dyn Coroutine>,
        name: Option<String>,
    ) -> Option<CoroutineId> {
        let entry = self.components.get_mut(component).filter(|e| e.behaviour)?;
        let id = CoroutineId(self.next_coroutine);
        self.next_coroutine += 1;
        entry.coroutines.start(id, name, coroutine);
        Some(id)
    }

    /// Stops one coroutine of `component`.
    pub fn stop_coroutine(&mut self, component: ComponentId, id: CoroutineId) -> bool {
        self.components
            .get_mut(component)
            .is_some_and(|e| e.coroutines.stop(id))
    }

    /// Stops the first coroutine of `component` started under `name`.
    pub fn stop_named_coroutine(&mut self, component: ComponentId, name: &str) -> bool {
        self.components
            .get_mut(component)
            .is_some_and(|e| e.coroutines.stop_named(name))
    }

    /// Checks if a coroutine of `component` is scheduled.
    #[must_use]
    pub fn is_coroutine_running(&self, component: ComponentId, id: CoroutineId) -> bool {
        self.components
            .get(component)
            .is_some_and(|e| e.coroutines.is_running(id))
    }

    /// Checks if any coroutine of `component` started under `name` is scheduled.
    #[must_use]
    pub fn is_named_coroutine_running(&self, component: ComponentId, name: &str) -> bool {
        self.components
            .get(component)
            .is_some_and(|e| e.coroutines.is_running_named(name))
    }

    /// Drops every coroutine of `component`.
    pub fn stop_all_coroutines(&mut self, component: ComponentId) {
        if let Some(entry) = self.components.get_mut(component) {
            entry.coroutines.stop_all();
        }
    }
}
