//! Immutable collision snapshot.
//!
//! Captured on the simulation thread before dispatch. Workers only ever see
//! this frame, never the scene, so nothing they read can change under them.

use crate::component::WorldShape;
use crate::scene::{ActorId, Scene};

use super::partition::Partition;

/// One actor of a captured tree with its world-space collider shapes.
#[derive(Clone, Debug)]
pub struct CollisionNode {
    /// Actor the shapes belong to.
    pub actor: ActorId,
    /// Shapes of the actor's own colliders.
    pub shapes: Vec<WorldShape>,
    /// Enabled, non-destroyed children.
    pub children: Vec<CollisionNode>,
}

impl CollisionNode {
    /// Captures `id` and its active subtree. `None` if the actor is disabled,
    /// flagged or gone.
    #[must_use]
    pub fn capture(scene: &Scene, id: ActorId) -> Option<Self> {
        let actor = scene.actor(id)?;
        if !actor.is_enabled() || actor.is_destroyed() {
            return None;
        }
        Some(Self {
            actor: id,
            shapes: scene.world_shapes(id),
            children: scene
                .children(id)
                .filter_map(|child| Self::capture(scene, child))
                .collect(),
        })
    }

    /// Finds the first pair of actors, one from each tree, whose shapes overlap.
    ///
    /// Own shapes are tested against own shapes, then `self` against each of
    /// `other`'s children, then `other` against each of `self`'s children. The
    /// pair is ordered `(actor in self, actor in other)`.
    #[must_use]
    pub fn resolve_hit(&self, other: &Self) -> Option<(ActorId, ActorId)> {
        let direct = self
            .shapes
            .iter()
            .any(|a| other.shapes.iter().any(|b| a.intersects(b)));
        if direct {
            return Some((self.actor, other.actor));
        }

        other
            .children
            .iter()
            .find_map(|child| self.resolve_hit(child))
            .or_else(|| {
                self.children
                    .iter()
                    .find_map(|child| other.resolve_hit(child))
                    .map(|(theirs, ours)| (ours, theirs))
            })
    }

    /// Checks if any actor of one tree overlaps any actor of the other.
    #[must_use]
    pub fn collides_with(&self, other: &Self) -> bool {
        self.resolve_hit(other).is_some()
    }
}

/// Snapshot of every active top-level tree, in child order.
#[derive(Clone, Debug, Default)]
pub struct CollisionFrame {
    trees: Vec<CollisionNode>,
}

impl CollisionFrame {
    /// Captures the root's active children.
    #[must_use]
    pub fn capture(scene: &Scene) -> Self {
        Self {
            trees: scene
                .children(scene.root())
                .filter_map(|id| CollisionNode::capture(scene, id))
                .collect(),
        }
    }

    /// Number of captured trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Checks if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Captured trees.
    #[must_use]
    pub fn trees(&self) -> &[CollisionNode] {
        &self.trees
    }

    /// Tests every tree of `partition` against every later tree, appending
    /// the actors that resolved each hit to `out`.
    pub fn test_partition(&self, partition: Partition, out: &mut Vec<(ActorId, ActorId)>) {
        let end = (partition.first + partition.count).min(self.trees.len());
        for i in partition.first..end {
            let a = &self.trees[i];
            for b in &self.trees[i + 1..] {
                if let Some(pair) = a.resolve_hit(b) {
                    out.push(pair);
                }
            }
        }
    }

    /// All colliding pairs, tested on the calling thread.
    #[must_use]
    pub fn test_all(&self) -> Vec<(ActorId, ActorId)> {
        let mut out = Vec::new();
        self.test_partition(
            Partition {
                first: 0,
                count: self.trees.len(),
            },
            &mut out,
        );
        out
    }
}
