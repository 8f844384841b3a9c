//! Actor node data.
//!
//! Actors are plain records in the scene's registry. Tree links are handles,
//! children form an intrusive doubly linked list so unlinking is O(1).
//! All mutation goes through [`Scene`](super::Scene) so derived transforms stay
//! consistent.

use std::collections::BTreeSet;

use nebula_shared::constants::OPACITY_OPAQUE;
use nebula_shared::{Transform2, Vec2};

use crate::component::ComponentId;
use crate::handle::SafeHandle;

use super::draw::TextureId;

/// Handle to an actor.
pub type ActorId = SafeHandle<Actor>;

/// Node of the scene graph.
#[derive(Debug)]
pub struct Actor {
    pub(crate) serial: u64,
    pub(crate) name: String,

    pub(crate) parent: Option<ActorId>,
    pub(crate) first_child: Option<ActorId>,
    pub(crate) last_child: Option<ActorId>,
    pub(crate) prev_sibling: Option<ActorId>,
    pub(crate) next_sibling: Option<ActorId>,
    pub(crate) child_count: usize,

    pub(crate) local: Transform2,
    pub(crate) global: Transform2,

    pub(crate) enabled: bool,
    pub(crate) depth: i32,
    pub(crate) opacity: u8,
    pub(crate) texture: Option<TextureId>,
    pub(crate) origin: Vec2,
    pub(crate) tags: BTreeSet<String>,

    pub(crate) components: Vec<ComponentId>,
    pub(crate) colliders: Vec<ComponentId>,
    pub(crate) destroyed: bool,
}

impl Actor {
    pub(crate) fn new(serial: u64, name: String) -> Self {
        Self {
            serial,
            name,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            child_count: 0,
            local: Transform2::IDENTITY,
            global: Transform2::IDENTITY,
            enabled: true,
            depth: 0,
            opacity: OPACITY_OPAQUE,
            texture: None,
            origin: Vec2::ZERO,
            tags: BTreeSet::new(),
            components: Vec::new(),
            colliders: Vec::new(),
            destroyed: false,
        }
    }

    /// Scene-unique, monotonically increasing identifier. Never reused.
    #[inline]
    #[must_use]
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    /// Name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent, `None` only for the root.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<ActorId> {
        self.parent
    }

    /// Number of direct children.
    #[inline]
    #[must_use]
    pub const fn child_count(&self) -> usize {
        self.child_count
    }

    /// Transform relative to the parent.
    #[inline]
    #[must_use]
    pub const fn local(&self) -> &Transform2 {
        &self.local
    }

    /// Derived world transform.
    #[inline]
    #[must_use]
    pub const fn global(&self) -> &Transform2 {
        &self.global
    }

    /// Own enabled flag. Ancestors may still disable the actor, see
    /// [`Scene::is_active`](super::Scene::is_active).
    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Draw order, lower first.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> i32 {
        self.depth
    }

    /// Opacity, 255 is opaque.
    #[inline]
    #[must_use]
    pub const fn opacity(&self) -> u8 {
        self.opacity
    }

    /// Sprite texture, if the actor is drawable.
    #[inline]
    #[must_use]
    pub const fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Sprite origin in texture pixels.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Tags.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Checks for a tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Attached components in attach order.
    #[must_use]
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    /// Attached colliders in attach order.
    #[must_use]
    pub fn colliders(&self) -> &[ComponentId] {
        &self.colliders
    }

    /// Checks the pending-destruction flag.
    #[inline]
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Facing direction from the global rotation.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        self.global.forward()
    }

    /// Right-hand direction from the global rotation.
    #[must_use]
    pub fn right(&self) -> Vec2 {
        self.global.right()
    }
}
