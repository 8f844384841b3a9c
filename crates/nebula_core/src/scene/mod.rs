//! # Scene Graph
//!
//! One [`Scene`] owns every actor and component of a simulation. Actors form a
//! tree under a single root that can never be destroyed, reparented or cloned.
//!
//! ```text
//!                  root
//!          ┌────────┼─────────┐
//!        ship    projectile  ship          top-level trees, tested pairwise
//!       ┌──┴──┐                              by the collision pool
//!   turret  thruster
//! ```
//!
//! Destruction is two-phase. [`Scene::destroy`] only sets a flag; the flagged
//! node stays readable until [`Scene::remove_destroyed`] frees it together with
//! its subtree, after which every handle to it is empty.

mod actor;
mod components;
mod draw;
mod hierarchy;

use std::collections::HashMap;
use std::time::Duration;

use nebula_shared::Vec2;

use crate::component::{ComponentEntry, ComponentId};
use crate::handle::HandleRegistry;

pub use actor::{Actor, ActorId};
pub use draw::{DrawSurface, SpriteCommand, TextureId};
pub use hierarchy::Children;

/// Name given to the root actor.
pub const ROOT_NAME: &str = "root";

/// Arena of actors and components plus the simulated clock.
pub struct Scene {
    pub(crate) actors: HandleRegistry<Actor>,
    pub(crate) components: HandleRegistry<ComponentEntry>,
    root: ActorId,
    by_serial: HashMap<u64, ActorId>,
    /// `(source, copy)` for components cloned while their own callback ran.
    pending_copies: Vec<(ComponentId, ComponentId)>,
    next_serial: u64,
    next_coroutine: u64,
    now: Duration,
    delta: Duration,
}

impl Scene {
    /// Creates a scene holding only the root.
    #[must_use]
    pub fn new() -> Self {
        let mut actors = HandleRegistry::new();
        let root = actors.insert(Actor::new(0, ROOT_NAME.to_owned()));
        let mut by_serial = HashMap::new();
        by_serial.insert(0, root);

        tracing::debug!("scene created");
        Self {
            actors,
            components: HandleRegistry::new(),
            root,
            by_serial,
            pending_copies: Vec::new(),
            next_serial: 1,
            next_coroutine: 1,
            now: Duration::ZERO,
            delta: Duration::ZERO,
        }
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Advances the simulated clock by one tick.
    pub fn advance_clock(&mut self, delta: Duration) {
        self.delta = delta;
        self.now = self.now.saturating_add(delta);
    }

    /// Simulated time since creation.
    #[inline]
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Length of the current tick.
    #[inline]
    #[must_use]
    pub const fn delta(&self) -> Duration {
        self.delta
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// The root actor.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> ActorId {
        self.root
    }

    /// Checks if `id` is the root.
    #[inline]
    #[must_use]
    pub fn is_root(&self, id: ActorId) -> bool {
        id == self.root
    }

    /// Resolves an actor handle.
    #[inline]
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    /// Checks if the handle still resolves (flagged actors count until swept).
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains(id)
    }

    /// Number of live actors, root included.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Number of live components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Finds an actor by its serial.
    #[must_use]
    pub fn actor_by_serial(&self, serial: u64) -> Option<ActorId> {
        self.by_serial
            .get(&serial)
            .copied()
            .filter(|id| self.actors.contains(*id))
    }

    /// First direct child of `parent` named `name`.
    #[must_use]
    pub fn child(&self, parent: ActorId, name: &str) -> Option<ActorId> {
        self.children(parent)
            .find(|id| self.actor(*id).is_some_and(|a| a.name == name))
    }

    /// First descendant of `parent` named `name`, depth-first.
    #[must_use]
    pub fn child_recursive(&self, parent: ActorId, name: &str) -> Option<ActorId> {
        for child in self.children(parent) {
            if self.actor(child).is_some_and(|a| a.name == name) {
                return Some(child);
            }
            if let Some(found) = self.child_recursive(child, name) {
                return Some(found);
            }
        }
        None
    }

    /// Checks if the actor and all its ancestors are enabled.
    #[must_use]
    pub fn is_active(&self, id: ActorId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.actor(current) {
                Some(actor) if actor.enabled => cursor = actor.parent,
                _ => return false,
            }
        }
        true
    }

    /// Checks the pending-destruction flag. Swept actors read as destroyed too.
    #[must_use]
    pub fn is_destroyed(&self, id: ActorId) -> bool {
        self.actor(id).map_or(true, |a| a.destroyed)
    }

    // =========================================================================
    // Per-node attributes (not inherited by children)
    // =========================================================================

    fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id)
    }

    /// Enables or disables the actor and, implicitly, its subtree.
    pub fn set_enabled(&mut self, id: ActorId, enabled: bool) {
        if let Some(actor) = self.actor_mut(id) {
            actor.enabled = enabled;
        }
    }

    /// Sets the draw order.
    pub fn set_depth(&mut self, id: ActorId, depth: i32) {
        if let Some(actor) = self.actor_mut(id) {
            actor.depth = depth;
        }
    }

    /// Sets the opacity.
    pub fn set_opacity(&mut self, id: ActorId, opacity: u8) {
        if let Some(actor) = self.actor_mut(id) {
            actor.opacity = opacity;
        }
    }

    /// Sets or clears the sprite texture.
    pub fn set_texture(&mut self, id: ActorId, texture: Option<TextureId>) {
        if let Some(actor) = self.actor_mut(id) {
            actor.texture = texture;
        }
    }

    /// Sets the sprite origin.
    pub fn set_origin(&mut self, id: ActorId, origin: Vec2) {
        if let Some(actor) = self.actor_mut(id) {
            actor.origin = origin;
        }
    }

    /// Renames the actor.
    pub fn set_name(&mut self, id: ActorId, name: impl Into<String>) {
        if let Some(actor) = self.actor_mut(id) {
            actor.name = name.into();
        }
    }

    /// Adds a tag. Returns `false` if it was already present.
    pub fn add_tag(&mut self, id: ActorId, tag: impl Into<String>) -> bool {
        self.actor_mut(id)
            .is_some_and(|actor| actor.tags.insert(tag.into()))
    }

    /// Removes a tag. Returns `false` if it was not present.
    pub fn remove_tag(&mut self, id: ActorId, tag: &str) -> bool {
        self.actor_mut(id).is_some_and(|actor| actor.tags.remove(tag))
    }

    /// Facing direction of the actor in world space.
    #[must_use]
    pub fn forward(&self, id: ActorId) -> Option<Vec2> {
        self.actor(id).map(Actor::forward)
    }

    /// Right-hand direction of the actor in world space.
    #[must_use]
    pub fn right(&self, id: ActorId) -> Option<Vec2> {
        self.actor(id).map(Actor::right)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scene_has_only_root() {
        let scene = Scene::new();
        assert_eq!(scene.actor_count(), 1);
        assert!(scene.is_root(scene.root()));
        assert_eq!(scene.actor(scene.root()).map(Actor::name), Some(ROOT_NAME));
        assert_eq!(scene.actor_by_serial(0), Some(scene.root()));
    }

    #[test]
    fn test_lookup_by_name() {
        let mut scene = Scene::new();
        let ship = scene.create_actor(None, "ship");
        let turret = scene.create_actor(Some(ship), "turret");
        let barrel = scene.create_actor(Some(turret), "barrel");

        assert_eq!(scene.child(scene.root(), "ship"), Some(ship));
        assert_eq!(scene.child(scene.root(), "barrel"), None);
        assert_eq!(scene.child_recursive(scene.root(), "barrel"), Some(barrel));
    }

    #[test]
    fn test_serials_increase_and_resolve() {
        let mut scene = Scene::new();
        let a = scene.create_actor(None, "a");
        let b = scene.create_actor(None, "b");
        let sa = scene.actor(a).unwrap().serial();
        let sb = scene.actor(b).unwrap().serial();

        assert!(sb > sa);
        assert_eq!(scene.actor_by_serial(sb), Some(b));

        scene.destroy(b);
        scene.remove_destroyed();
        assert_eq!(scene.actor_by_serial(sb), None);
    }

    #[test]
    fn test_disabled_ancestor_deactivates_subtree() {
        let mut scene = Scene::new();
        let ship = scene.create_actor(None, "ship");
        let turret = scene.create_actor(Some(ship), "turret");

        assert!(scene.is_active(turret));
        scene.set_enabled(ship, false);
        assert!(!scene.is_active(turret));
        assert!(scene.actor(turret).unwrap().is_enabled());
    }

    #[test]
    fn test_attributes_do_not_propagate() {
        let mut scene = Scene::new();
        let ship = scene.create_actor(None, "ship");
        let turret = scene.create_actor(Some(ship), "turret");

        scene.set_opacity(ship, 10);
        scene.set_depth(ship, 5);
        assert_eq!(scene.actor(turret).unwrap().opacity(), 255);
        assert_eq!(scene.actor(turret).unwrap().depth(), 0);
    }

    #[test]
    fn test_tags() {
        let mut scene = Scene::new();
        let ship = scene.create_actor(None, "ship");
        assert!(scene.add_tag(ship, "player"));
        assert!(!scene.add_tag(ship, "player"));
        assert!(scene.actor(ship).unwrap().has_tag("player"));
        assert!(scene.remove_tag(ship, "player"));
        assert!(!scene.actor(ship).unwrap().has_tag("player"));
    }
}
