//! # NEBULA Headless
//!
//! Runs a small arena without a window: ships circle and fire, projectiles
//! fly until they hit another ship or expire, hit ships fade out and die.
//! Useful for profiling the tick and for eyeballing the logs.
//!
//! ```bash
//! # Defaults
//! ./nebula_headless
//!
//! # With a config file and verbose core logs
//! RUST_LOG=nebula_core=trace ./nebula_headless nebula.toml
//! ```

use std::process::ExitCode;
use std::time::Duration;

use nebula::core::coroutine::{self, Yield};
use nebula::core::{
    ActorId, Behaviour, CircleCollider, Component, FadeOpacity, KeyCode, KeyEvent, ScriptContext,
};
use nebula::shared::Vec2;
use nebula::{logging, EngineConfig, EngineResult, Simulation};

/// Ticks to simulate.
const TICKS: u64 = 600;

/// Fixed simulated step (60 Hz).
const STEP: Duration = Duration::from_micros(16_667);

/// Key that doubles ship speed while held.
const BOOST: KeyCode = KeyCode(16);

const SHIP_TAG: &str = "ship";
const PROJECTILE_TAG: &str = "projectile";

#[derive(Clone)]
struct Ship {
    speed: f32,
    turn_rate: f32,
    boosting: bool,
    hits: u32,
}

impl Ship {
    fn fire(ctx: &mut ScriptContext<'_>) {
        let shooter = ctx.owner();
        let Some(ship) = ctx.scene().actor(shooter) else {
            return;
        };
        let muzzle = ship.global().position + ship.forward() * 12.0;
        let heading = ship.global().rotation;

        let scene = ctx.scene_mut();
        let shot = scene.create_actor(None, PROJECTILE_TAG);
        scene.set_local_position(shot, muzzle);
        scene.set_local_rotation(shot, heading);
        scene.add_tag(shot, PROJECTILE_TAG);
        scene.add_component(shot, CircleCollider::new(2.0));
        scene.add_component(shot, Projectile { shooter, speed: 240.0 });
    }
}

impl Behaviour for Ship {
    fn start(&mut self, ctx: &mut ScriptContext<'_>) {
        ctx.start_named_coroutine(
            "fire",
            coroutine::from_fn(|ctx| {
                Ship::fire(ctx);
                Yield::seconds(0.5)
            }),
        );
    }

    fn update(&mut self, ctx: &mut ScriptContext<'_>) {
        let dt = ctx.delta().as_secs_f32();
        let speed = if self.boosting { self.speed * 2.0 } else { self.speed };
        let owner = ctx.owner();
        let forward = ctx.scene().forward(owner).unwrap_or(Vec2::X);

        let scene = ctx.scene_mut();
        scene.rotate(owner, self.turn_rate * dt);
        scene.translate(owner, forward * (speed * dt));
    }

    fn on_keyboard(&mut self, _ctx: &mut ScriptContext<'_>, event: &KeyEvent) {
        if event.key == BOOST {
            self.boosting = event.pressed;
        }
    }

    fn on_collision(&mut self, ctx: &mut ScriptContext<'_>, peer: ActorId) {
        let scene = ctx.scene();
        if !scene.actor(peer).is_some_and(|a| a.has_tag(PROJECTILE_TAG)) {
            return;
        }
        let own_shot = scene
            .get_component::<Projectile>(peer)
            .and_then(|c| scene.component::<Projectile>(c))
            .is_some_and(|p| p.shooter == ctx.owner());
        if own_shot || scene.is_destroyed(peer) {
            return;
        }

        self.hits += 1;
        let owner = ctx.owner();
        tracing::debug!(ship = ?owner, hits = self.hits, "ship hit");
        if self.hits >= 3 {
            ctx.stop_named_coroutine("fire");
            ctx.start_coroutine(FadeOpacity::new(owner, 0, Duration::from_millis(20), 0.3));
            ctx.start_coroutine(coroutine::from_fn(move |ctx| {
                if ctx.scene().actor(owner).is_some_and(|a| a.opacity() < 8) {
                    ctx.destroy_owner();
                    Yield::Finished
                } else {
                    Yield::NextPass
                }
            }));
        }
    }
}

impl Component for Ship {
    fn as_behaviour_mut(&mut self) -> Option<&mut dyn Behaviour> {
        Some(self)
    }
}

#[derive(Clone)]
struct Projectile {
    shooter: ActorId,
    speed: f32,
}

impl Behaviour for Projectile {
    fn awake(&mut self, ctx: &mut ScriptContext<'_>) {
        let mut armed = false;
        ctx.start_coroutine(coroutine::from_fn(move |ctx| {
            if !armed {
                armed = true;
                return Yield::seconds(2.0);
            }
            ctx.destroy_owner();
            Yield::Finished
        }));
    }

    fn update(&mut self, ctx: &mut ScriptContext<'_>) {
        let owner = ctx.owner();
        let dt = ctx.delta().as_secs_f32();
        let forward = ctx.scene().forward(owner).unwrap_or(Vec2::X);
        ctx.scene_mut().translate(owner, forward * (self.speed * dt));
    }

    fn on_collision(&mut self, ctx: &mut ScriptContext<'_>, peer: ActorId) {
        let hit_ship = peer != self.shooter
            && ctx.scene().actor(peer).is_some_and(|a| a.has_tag(SHIP_TAG));
        if hit_ship {
            ctx.destroy_owner();
        }
    }
}

impl Component for Projectile {
    fn as_behaviour_mut(&mut self) -> Option<&mut dyn Behaviour> {
        Some(self)
    }
}

fn spawn_arena(sim: &mut Simulation, ships: u32) {
    let scene = sim.scene_mut();
    for i in 0..ships {
        #[allow(clippy::cast_precision_loss)]
        let angle = 360.0 * i as f32 / ships as f32;
        let ship = scene.create_actor(None, format!("ship{i}"));
        scene.set_local_position(ship, Vec2::X.rotated(angle) * 150.0);
        scene.set_local_rotation(ship, angle + 180.0);
        scene.add_tag(ship, SHIP_TAG);
        scene.add_component(ship, CircleCollider::new(8.0));
        scene.add_component(
            ship,
            Ship {
                speed: 40.0,
                turn_rate: 15.0,
                boosting: false,
                hits: 0,
            },
        );
    }
}

fn run() -> EngineResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut sim = Simulation::new(config)?;
    spawn_arena(&mut sim, 8);

    let input = sim.input_sender();
    let mut peak_us = 0;
    for _ in 0..TICKS {
        match sim.frame_count() {
            120 => {
                input.send(KeyEvent::pressed(BOOST));
            }
            240 => {
                input.send(KeyEvent::released(BOOST));
            }
            _ => {}
        }

        let stats = sim.tick(STEP);
        peak_us = peak_us.max(stats.total_us);
        if stats.frame % 60 == 0 {
            tracing::info!(
                frame = stats.frame,
                actors = sim.scene().actor_count(),
                collisions = stats.collisions,
                swept = stats.actors_swept,
                total_us = stats.total_us,
                "tick"
            );
        }
    }

    let survivors = sim
        .scene()
        .children(sim.scene().root())
        .filter(|id| sim.scene().actor(*id).is_some_and(|a| a.has_tag(SHIP_TAG)))
        .count();
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  NEBULA headless run complete");
    println!("  Ticks:        {TICKS}");
    println!("  Workers:      {}", sim.collision_workers());
    println!("  Ships left:   {survivors}");
    println!("  Peak tick:    {peak_us} us");
    println!("═══════════════════════════════════════════════════════════════════");
    Ok(())
}

fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        eprintln!("logging disabled: {e}");
    }
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "headless run failed");
            eprintln!("✗ FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}
