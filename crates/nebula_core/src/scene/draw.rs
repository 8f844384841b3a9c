//! Draw-list extraction.
//!
//! The scene never talks to a GPU. It walks the tree, orders what is visible
//! and hands plain commands to a [`DrawSurface`] supplied by the renderer.

use nebula_shared::{Transform2, Vec2};

use crate::component::WorldShape;

use super::{ActorId, Scene};

/// Renderer-owned texture identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// One sprite to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteCommand {
    /// Actor the sprite belongs to.
    pub actor: ActorId,
    /// Texture to draw.
    pub texture: TextureId,
    /// World transform.
    pub transform: Transform2,
    /// Origin in texture pixels.
    pub origin: Vec2,
    /// Opacity, 255 is opaque.
    pub opacity: u8,
    /// Draw order the command was sorted by.
    pub depth: i32,
}

/// Sink for draw commands, implemented by renderers.
pub trait DrawSurface {
    /// Draws a sprite.
    fn draw_sprite(&mut self, sprite: &SpriteCommand);

    /// Draws a collider outline. Ignored by default.
    fn draw_collider(&mut self, _shape: &WorldShape) {}
}

impl Scene {
    /// Draws `id` and its enabled descendants, ordered by depth (stable),
    /// then optionally every collider of that subtree.
    ///
    /// Actors without a texture are skipped. Disabled subtrees are not drawn.
    pub fn draw(&self, id: ActorId, surface: &mut dyn DrawSurface, draw_colliders: bool) {
        let mut visible = Vec::new();
        self.collect_enabled(id, &mut visible);

        let mut sprites: Vec<SpriteCommand> = visible
            .iter()
            .filter_map(|&actor_id| {
                let actor = self.actor(actor_id)?;
                Some(SpriteCommand {
                    actor: actor_id,
                    texture: actor.texture?,
                    transform: actor.global,
                    origin: actor.origin,
                    opacity: actor.opacity,
                    depth: actor.depth,
                })
            })
            .collect();
        sprites.sort_by_key(|s| s.depth);
        for sprite in &sprites {
            surface.draw_sprite(sprite);
        }

        if draw_colliders {
            for &actor_id in &visible {
                for shape in self.world_shapes(actor_id) {
                    surface.draw_collider(&shape);
                }
            }
        }
    }

    /// Draws every top-level tree, trees ordered by their top node's depth.
    pub fn draw_scene(&self, surface: &mut dyn DrawSurface, draw_colliders: bool) {
        let mut trees: Vec<(i32, ActorId)> = self
            .children(self.root())
            .filter_map(|id| self.actor(id).map(|a| (a.depth, id)))
            .collect();
        trees.sort_by_key(|(depth, _)| *depth);
        for (_, id) in trees {
            self.draw(id, surface, draw_colliders);
        }
    }

    fn collect_enabled(&self, id: ActorId, out: &mut Vec<ActorId>) {
        if !self.actor(id).is_some_and(|a| a.enabled) {
            return;
        }
        out.push(id);
        for child in self.children(id) {
            self.collect_enabled(child, out);
        }
    }

    /// World-space shapes of the actor's own live colliders.
    #[must_use]
    pub fn world_shapes(&self, id: ActorId) -> Vec<WorldShape> {
        let Some(actor) = self.actor(id) else {
            return Vec::new();
        };
        actor
            .colliders
            .iter()
            .filter_map(|c| self.components.get(*c))
            .filter(|entry| !entry.destroyed)
            .filter_map(|entry| entry.body.as_deref()?.as_collider())
            .map(|collider| collider.world_shape(&actor.global))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::CircleCollider;

    #[derive(Default)]
    struct Recording {
        sprites: Vec<(ActorId, i32)>,
        colliders: usize,
    }

    impl DrawSurface for Recording {
        fn draw_sprite(&mut self, sprite: &SpriteCommand) {
            self.sprites.push((sprite.actor, sprite.depth));
        }

        fn draw_collider(&mut self, _shape: &WorldShape) {
            self.colliders += 1;
        }
    }

    #[test]
    fn test_draw_sorts_by_depth_and_skips_untextured() {
        let mut scene = Scene::new();
        let ship = scene.create_actor(None, "ship");
        let flame = scene.create_actor(Some(ship), "flame");
        let hidden = scene.create_actor(Some(ship), "hidden");
        let marker = scene.create_actor(Some(ship), "marker");
        scene.set_texture(ship, Some(TextureId(1)));
        scene.set_texture(flame, Some(TextureId(2)));
        scene.set_texture(hidden, Some(TextureId(3)));
        scene.set_depth(flame, -1);
        scene.set_enabled(hidden, false);
        scene.add_component(marker, CircleCollider::new(3.0));

        let mut surface = Recording::default();
        scene.draw(ship, &mut surface, true);

        assert_eq!(surface.sprites, vec![(flame, -1), (ship, 0)]);
        assert_eq!(surface.colliders, 1);
    }

    #[test]
    fn test_draw_scene_orders_trees() {
        let mut scene = Scene::new();
        let back = scene.create_actor(None, "back");
        let front = scene.create_actor(None, "front");
        scene.set_texture(back, Some(TextureId(0)));
        scene.set_texture(front, Some(TextureId(0)));
        scene.set_depth(front, -5);

        let mut surface = Recording::default();
        scene.draw_scene(&mut surface, false);
        assert_eq!(surface.sprites, vec![(front, -5), (back, 0)]);
    }
}
