//! Tree structure: creation, reparenting, transforms, cloning, destruction.

use nebula_shared::{Transform2, Vec2};

use crate::component::{Component, ComponentEntry, ComponentId};

use super::{Actor, ActorId, Scene};

/// What a clone takes from one source component.
enum ComponentCopy {
    Ready(Box<dyn Component>),
    /// The source is running its own callback and is copied once it returns.
    Running {
        source: ComponentId,
        behaviour: bool,
        collider: bool,
    },
}

/// Iterator over the direct children of an actor, in order.
pub struct Children<'a> {
    scene: &'a Scene,
    next: Option<ActorId>,
}

impl Iterator for Children<'_> {
    type Item = ActorId;

    fn next(&mut self) -> Option<ActorId> {
        let current = self.next?;
        self.next = self.scene.actor(current).and_then(|a| a.next_sibling);
        Some(current)
    }
}

impl Scene {
    /// Direct children of `id`.
    #[must_use]
    pub fn children(&self, id: ActorId) -> Children<'_> {
        Children {
            scene: self,
            next: self.actor(id).and_then(|a| a.first_child),
        }
    }

    // =========================================================================
    // Creation and linking
    // =========================================================================

    /// Creates an actor under `parent`, or under the root if `parent` is `None`
    /// or no longer resolves.
    pub fn create_actor(&mut self, parent: Option<ActorId>, name: impl Into<String>) -> ActorId {
        let serial = self.next_serial;
        self.next_serial += 1;

        let id = self.actors.insert(Actor::new(serial, name.into()));
        self.by_serial.insert(serial, id);

        let parent = self.resolve_parent(parent);
        self.link_last(id, parent);
        self.propagate(id);
        id
    }

    fn resolve_parent(&self, parent: Option<ActorId>) -> ActorId {
        parent
            .filter(|p| self.actors.contains(*p))
            .unwrap_or(self.root)
    }

    fn link_last(&mut self, child: ActorId, parent: ActorId) {
        let previous_last = self.actors.get(parent).and_then(|p| p.last_child);

        if let Some(actor) = self.actors.get_mut(child) {
            actor.parent = Some(parent);
            actor.prev_sibling = previous_last;
            actor.next_sibling = None;
        }
        if let Some(last) = previous_last.and_then(|l| self.actors.get_mut(l)) {
            last.next_sibling = Some(child);
        }
        if let Some(p) = self.actors.get_mut(parent) {
            if p.first_child.is_none() {
                p.first_child = Some(child);
            }
            p.last_child = Some(child);
            p.child_count += 1;
        }
    }

    fn unlink(&mut self, child: ActorId) {
        let Some(actor) = self.actors.get_mut(child) else {
            return;
        };
        let (parent, prev, next) = (actor.parent.take(), actor.prev_sibling.take(), actor.next_sibling.take());

        if let Some(prev_actor) = prev.and_then(|p| self.actors.get_mut(p)) {
            prev_actor.next_sibling = next;
        }
        if let Some(next_actor) = next.and_then(|n| self.actors.get_mut(n)) {
            next_actor.prev_sibling = prev;
        }
        if let Some(p) = parent.and_then(|p| self.actors.get_mut(p)) {
            if p.first_child == Some(child) {
                p.first_child = next;
            }
            if p.last_child == Some(child) {
                p.last_child = prev;
            }
            p.child_count -= 1;
        }
    }

    /// Checks if `ancestor` is `id` or lies on the path from `id` to the root.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: ActorId, id: ActorId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.actor(current).and_then(|a| a.parent);
        }
        false
    }

    /// Moves `id` under `new_parent`, or under the root if `new_parent` is
    /// `None` or no longer resolves. The actor keeps its local transform.
    ///
    /// No-op for the root, for the current parent, and for any target inside
    /// the actor's own subtree.
    pub fn set_parent(&mut self, id: ActorId, new_parent: Option<ActorId>) {
        if self.is_root(id) || !self.actors.contains(id) {
            return;
        }
        let target = self.resolve_parent(new_parent);
        if self.actor(id).and_then(|a| a.parent) == Some(target) || self.is_ancestor_or_self(id, target) {
            return;
        }

        self.unlink(id);
        self.link_last(id, target);
        self.propagate(id);
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Replaces the local transform and refreshes the subtree.
    pub fn set_local_transform(&mut self, id: ActorId, local: Transform2) {
        if let Some(actor) = self.actors.get_mut(id) {
            actor.local = local;
            self.propagate(id);
        }
    }

    /// Sets the position relative to the parent.
    pub fn set_local_position(&mut self, id: ActorId, position: Vec2) {
        self.edit_local(id, |t| t.position = position);
    }

    /// Sets the per-axis scale relative to the parent.
    pub fn set_local_scale(&mut self, id: ActorId, scale: Vec2) {
        self.edit_local(id, |t| t.scale = scale);
    }

    /// Sets the rotation relative to the parent, in degrees.
    pub fn set_local_rotation(&mut self, id: ActorId, degrees: f32) {
        self.edit_local(id, |t| t.rotation = degrees);
    }

    /// Offsets the local position.
    pub fn translate(&mut self, id: ActorId, offset: Vec2) {
        self.edit_local(id, |t| t.position += offset);
    }

    /// Adds to the local rotation, in degrees.
    pub fn rotate(&mut self, id: ActorId, degrees: f32) {
        self.edit_local(id, |t| t.rotation += degrees);
    }

    fn edit_local(&mut self, id: ActorId, edit: impl FnOnce(&mut Transform2)) {
        if let Some(actor) = self.actors.get_mut(id) {
            edit(&mut actor.local);
            self.propagate(id);
        }
    }

    /// Recomputes the global transform of `id` and, top-down, of its subtree.
    fn propagate(&mut self, id: ActorId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let parent_global = self
                .actor(current)
                .and_then(|a| a.parent)
                .and_then(|p| self.actor(p))
                .map_or(Transform2::IDENTITY, |p| p.global);

            let Some(actor) = self.actors.get_mut(current) else {
                continue;
            };
            actor.global = parent_global.compose(&actor.local);
            stack.extend(self.children(current));
        }
    }

    // =========================================================================
    // Cloning
    // =========================================================================

    /// Copies the actor's own state and components into a new top-level actor.
    ///
    /// Returns `None` for the root or a stale handle. Behaviours on the copy
    /// receive `awake`; running coroutines are not copied. A behaviour that
    /// clones its own actor is copied as it stands when its callback returns.
    pub fn clone_actor(&mut self, id: ActorId, name: impl Into<String>) -> Option<ActorId> {
        if self.is_root(id) {
            return None;
        }
        self.clone_node(id, None, name.into())
    }

    /// Like [`Scene::clone_actor`], also copying the subtree. Cloned children
    /// keep their names.
    pub fn clone_with_children(&mut self, id: ActorId, name: impl Into<String>) -> Option<ActorId> {
        if self.is_root(id) {
            return None;
        }
        let top = self.clone_node(id, None, name.into())?;
        self.clone_children(id, top);
        Some(top)
    }

    fn clone_children(&mut self, source: ActorId, target: ActorId) {
        let children: Vec<ActorId> = self.children(source).collect();
        for child in children {
            let name = self.actor(child).map(|a| a.name.clone()).unwrap_or_default();
            if let Some(copy) = self.clone_node(child, Some(target), name) {
                self.clone_children(child, copy);
            }
        }
    }

    fn clone_node(&mut self, source: ActorId, parent: Option<ActorId>, name: String) -> Option<ActorId> {
        let original = self.actor(source)?;
        let local = original.local;
        let (enabled, depth, opacity) = (original.enabled, original.depth, original.opacity);
        let (texture, origin, tags) = (original.texture, original.origin, original.tags.clone());
        let copies: Vec<ComponentCopy> = original
            .components
            .iter()
            .filter_map(|&c| {
                let entry = self.components.get(c).filter(|e| !e.destroyed)?;
                Some(match &entry.body {
                    Some(body) => ComponentCopy::Ready(body.clone_component()),
                    None => ComponentCopy::Running {
                        source: c,
                        behaviour: entry.behaviour,
                        collider: entry.collider,
                    },
                })
            })
            .collect();

        let copy = self.create_actor(parent, name);
        if let Some(actor) = self.actors.get_mut(copy) {
            actor.local = local;
            actor.enabled = enabled;
            actor.depth = depth;
            actor.opacity = opacity;
            actor.texture = texture;
            actor.origin = origin;
            actor.tags = tags;
        }
        self.propagate(copy);

        for component in copies {
            match component {
                ComponentCopy::Ready(body) => {
                    self.add_boxed_component(copy, body);
                }
                ComponentCopy::Running {
                    source,
                    behaviour,
                    collider,
                } => {
                    let entry = ComponentEntry::pending(copy, behaviour, collider);
                    let pending = self.attach_entry(copy, entry);
                    self.pending_copies.push((source, pending));
                }
            }
        }
        Some(copy)
    }

    // =========================================================================
    // Destruction
    // =========================================================================

    /// Flags the actor for removal at the next sweep. No-op on the root.
    pub fn destroy(&mut self, id: ActorId) {
        if self.is_root(id) {
            return;
        }
        if let Some(actor) = self.actors.get_mut(id) {
            actor.destroyed = true;
        }
    }

    /// Frees every flagged actor (with its whole subtree) and every flagged
    /// component. Returns the number of actors freed.
    pub fn remove_destroyed(&mut self) -> usize {
        let mut freed = 0;
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            self.sweep_components(current);
            let children: Vec<ActorId> = self.children(current).collect();
            for child in children {
                if self.actor(child).is_some_and(|a| a.destroyed) {
                    freed += self.free_subtree(child);
                } else {
                    stack.push(child);
                }
            }
        }
        if freed > 0 {
            tracing::debug!(freed, remaining = self.actors.len(), "swept destroyed actors");
        }
        freed
    }

    fn sweep_components(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get(id) else {
            return;
        };
        let flagged: Vec<ComponentId> = actor
            .components
            .iter()
            .copied()
            .filter(|c| self.components.get(*c).map_or(true, |e| e.destroyed))
            .collect();
        if flagged.is_empty() {
            return;
        }

        for component in &flagged {
            self.components.remove(*component);
        }
        if let Some(actor) = self.actors.get_mut(id) {
            actor.components.retain(|c| !flagged.contains(c));
            actor.colliders.retain(|c| !flagged.contains(c));
        }
    }

    /// Unlinks `id` and frees it and its descendants, leaves first.
    fn free_subtree(&mut self, id: ActorId) -> usize {
        self.unlink(id);

        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.children(current));
        }

        for current in order.iter().rev() {
            if let Some(actor) = self.actors.remove(*current) {
                for component in actor.components {
                    self.components.remove(component);
                }
                self.by_serial.remove(&actor.serial);
            }
        }
        order.len()
    }
}
