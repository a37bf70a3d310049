use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use rusted_sat::engine::game_loop::GameLoop;
use rusted_sat::engine::lifecycle::Lifecycle;
use rusted_sat::engine::physics::{presets, PhysicsWorld, SharedEntity, WorldConfig};
use rusted_sat::Vector2;

/// Frames simulated when no count is given on the command line
const DEFAULT_FRAMES: u32 = 600;

/// Headless scene: a floor, two walls and a stack of falling bodies
struct Sandbox {
    world: PhysicsWorld,
    bodies: Vec<SharedEntity>,
    // Kept alive for the world's lifetime
    _static_geometry: Vec<SharedEntity>,
}

impl Sandbox {
    fn new() -> Result<Self> {
        let config = WorldConfig::default()
            .with_gravity(Vector2::new(0.0, 0.2))
            .with_restitution(0.4);
        let mut world = PhysicsWorld::with_config(config)?;

        let static_geometry: Vec<SharedEntity> = vec![
            presets::platform(400.0, 620.0, 800.0, 80.0)?.into_shared(),
            presets::platform(-20.0, 300.0, 40.0, 600.0)?.into_shared(),
            presets::platform(820.0, 300.0, 40.0, 600.0)?.into_shared(),
        ];
        for entity in &static_geometry {
            world.add(entity)?;
        }

        let mut bodies = Vec::new();
        for i in 0..8 {
            let x = 120.0 + 80.0 * i as f64;
            let y = 60.0 + 25.0 * (i % 3) as f64;
            let mut body = if i % 2 == 0 {
                presets::box_body(x, y, 40.0, 40.0)?
            } else {
                presets::ball(x, y, 20.0)?
            };
            body.velocity = Vector2::new(2.0 - 0.5 * i as f64, 0.0);
            body.angular_velocity = 0.01 * i as f64;
            let shared = body.into_shared();
            world.add(&shared)?;
            bodies.push(shared);
        }

        Ok(Self {
            world,
            bodies,
            _static_geometry: static_geometry,
        })
    }
}

impl Lifecycle for Sandbox {
    fn init(&mut self) {
        info!(
            "Sandbox ready: {} entities in {}",
            self.world.len(),
            self.world.id()
        );
    }

    fn update(&mut self, dt: f64) {
        self.world.update(dt);
    }

    fn render(&mut self) {
        // Stand-in for a renderer: read fresh world-space geometry every frame
        for body in &self.bodies {
            let body = body.borrow();
            let shape = body.world_shape();
            debug!(
                "{} at ({:.1}, {:.1}) spans x {:.1}..{:.1}",
                body.id(),
                body.position.x,
                body.position.y,
                shape.left(),
                shape.right()
            );
        }
    }

    fn destroy(&mut self) {
        self.world.destroy();
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let frames = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u32>()
            .with_context(|| format!("Invalid frame count: {arg}"))?,
        None => DEFAULT_FRAMES,
    };

    info!("Starting rusted-sat sandbox for {} frames...", frames);

    let mut sandbox = Sandbox::new()?;
    let mut game_loop = GameLoop::new();
    sandbox.init();

    // Feed a steady 60 Hz frame time so runs are reproducible
    let frame_time = Duration::from_micros(16_667);
    for frame in 1..=frames {
        game_loop.run_frame_for(frame_time, &mut sandbox);

        if frame % 120 == 0 {
            info!(
                "Frame {}: {} steps, {} contacts in last step",
                frame,
                sandbox.world.step_count(),
                sandbox.world.contacts().len()
            );
        }
    }

    for body in &sandbox.bodies {
        let body = body.borrow();
        info!(
            "{} resting at ({:.2}, {:.2})",
            body.id(),
            body.position.x,
            body.position.y
        );
    }

    sandbox.destroy();
    info!("Sandbox finished after {} updates", game_loop.update_count());
    Ok(())
}
