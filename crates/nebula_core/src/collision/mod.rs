//! # Parallel Collision
//!
//! Broad-phase testing of every pair of top-level trees, spread over a fixed
//! worker pool.
//!
//! ```text
//! Scene ──capture──> CollisionFrame (Arc, read-only)
//!                         │
//!            partition(n, workers)
//!         ┌───────────────┼───────────────┐
//!      worker 0        worker 1   ...  worker k
//!         └───────────────┼───────────────┘
//!                  Vec<(ActorId, ActorId)>
//!                         │
//!        Scene::deliver_collisions (simulation thread)
//! ```
//!
//! Only the capture reads live components; workers see shapes already
//! resolved into world space. Each overlapping pair of trees yields one pair
//! per tick: the two actors, at any depth, whose colliders resolved the hit.

mod frame;
mod partition;
mod pool;

pub use frame::{CollisionFrame, CollisionNode};
pub use partition::{partition, Partition};
pub use pool::CollisionPool;

use crate::scene::{ActorId, Scene};

/// Tests two actors' active subtrees against each other on the calling thread.
#[must_use]
pub fn test_pair(scene: &Scene, a: ActorId, b: ActorId) -> bool {
    match (CollisionNode::capture(scene, a), CollisionNode::capture(scene, b)) {
        (Some(a), Some(b)) => a.collides_with(&b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use nebula_shared::Vec2;

    use super::*;
    use crate::component::CircleCollider;

    #[test]
    fn test_circle_scenario() {
        let mut scene = Scene::new();
        let a = scene.create_actor(None, "a");
        let b = scene.create_actor(None, "b");
        scene.add_component(a, CircleCollider::new(10.0));
        scene.add_component(b, CircleCollider::new(10.0));

        scene.set_local_position(b, Vec2::new(15.0, 0.0));
        assert!(test_pair(&scene, a, b));

        scene.set_local_position(b, Vec2::new(25.0, 0.0));
        assert!(!test_pair(&scene, a, b));
    }

    #[test]
    fn test_descendants_collide_across_trees() {
        let mut scene = Scene::new();
        let ship = scene.create_actor(None, "ship");
        let wing = scene.create_actor(Some(ship), "wing");
        let rock = scene.create_actor(None, "rock");
        let shard = scene.create_actor(Some(rock), "shard");
        scene.set_local_position(wing, Vec2::new(50.0, 0.0));
        scene.set_local_position(rock, Vec2::new(100.0, 0.0));
        scene.set_local_position(shard, Vec2::new(-45.0, 0.0));
        scene.add_component(wing, CircleCollider::new(3.0));
        scene.add_component(shard, CircleCollider::new(3.0));

        assert!(test_pair(&scene, ship, rock));
        assert_eq!(CollisionFrame::capture(&scene).test_all(), vec![(wing, shard)]);

        scene.set_enabled(shard, false);
        assert!(!test_pair(&scene, ship, rock));
    }

    #[test]
    fn test_flagged_actors_are_not_captured() {
        let mut scene = Scene::new();
        let a = scene.create_actor(None, "a");
        let b = scene.create_actor(None, "b");
        scene.add_component(a, CircleCollider::new(1.0));
        let shield = scene.add_component(b, CircleCollider::new(1.0)).unwrap();

        assert_eq!(CollisionFrame::capture(&scene).test_all().len(), 1);
        scene.destroy_component(shield);
        assert!(CollisionFrame::capture(&scene).test_all().is_empty());
        scene.destroy(b);
        assert_eq!(CollisionFrame::capture(&scene).len(), 1);
    }
}
