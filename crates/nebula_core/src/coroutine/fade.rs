//! Opacity fade, the stock example of a hand-written coroutine state machine.

use std::time::Duration;

use nebula_shared::constants::FADE_EPSILON;

use crate::behaviour::ScriptContext;
use crate::scene::ActorId;

use super::{Coroutine, Yield};

#[derive(Clone, Copy, Debug)]
enum FadeState {
    Begin,
    Stepping { current: f32 },
}

/// Eases an actor's opacity toward `target`.
///
/// Every `delay` the opacity moves by `factor` of the remaining distance.
/// Finishes once within a hundredth of the target, or as soon as the actor is gone.
#[derive(Clone, Debug)]
pub struct FadeOpacity {
    actor: ActorId,
    target: f32,
    delay: Duration,
    factor: f32,
    state: FadeState,
}

impl FadeOpacity {
    /// Creates the fade.
    ///
    /// # Arguments
    ///
    /// * `actor` - Actor whose opacity changes
    /// * `target` - Opacity to reach, `0..=255`
    /// * `delay` - Time between steps
    /// * `factor` - Fraction of the remaining distance covered per step, `0..=1`
    #[must_use]
    pub fn new(actor: ActorId, target: u8, delay: Duration, factor: f32) -> Self {
        Self {
            actor,
            target: f32::from(target),
            delay,
            factor: factor.clamp(0.0, 1.0),
            state: FadeState::Begin,
        }
    }
}

impl Coroutine for FadeOpacity {
    fn resume(&mut self, ctx: &mut ScriptContext<'_>) -> Yield {
        let Some(actor) = ctx.scene().actor(self.actor) else {
            return Yield::Finished;
        };

        let current = match self.state {
            FadeState::Begin => f32::from(actor.opacity()),
            FadeState::Stepping { current } => current,
        };
        // A zero factor would never converge.
        if (current - self.target).abs() <= FADE_EPSILON || self.factor <= 0.0 {
            return Yield::Finished;
        }

        let next = current * (1.0 - self.factor) + self.target * self.factor;
        self.state = FadeState::Stepping { current: next };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let opacity = next.clamp(0.0, 255.0) as u8;
        ctx.scene_mut().set_opacity(self.actor, opacity);
        Yield::WaitFor(self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviour::testing::Idle;
    use crate::scene::Scene;

    #[test]
    fn test_fade_reaches_target_then_finishes() {
        let mut scene = Scene::new();
        let ship = scene.create_actor(None, "ship");
        let host = scene.add_component(ship, Idle).unwrap();
        let fade = scene
            .start_coroutine(
                host,
                Box::new(FadeOpacity::new(ship, 0, Duration::from_millis(10), 0.5)),
                None,
            )
            .unwrap();

        scene.execute_coroutines();
        assert_eq!(scene.actor(ship).unwrap().opacity(), 127);

        for _ in 0..100 {
            scene.advance_clock(Duration::from_millis(10));
            scene.execute_coroutines();
        }
        assert_eq!(scene.actor(ship).unwrap().opacity(), 0);
        assert!(!scene.is_coroutine_running(host, fade));
    }

    #[test]
    fn test_fade_finishes_when_actor_is_gone() {
        let mut scene = Scene::new();
        let host_actor = scene.create_actor(None, "host");
        let host = scene.add_component(host_actor, Idle).unwrap();
        let victim = scene.create_actor(None, "victim");
        let fade = scene
            .start_coroutine(
                host,
                Box::new(FadeOpacity::new(victim, 0, Duration::ZERO, 0.1)),
                None,
            )
            .unwrap();

        scene.destroy(victim);
        scene.remove_destroyed();
        scene.execute_coroutines();
        assert!(!scene.is_coroutine_running(host, fade));
    }
}
