//! Gravrun - headless course runner
//!
//! Builds a small rapier course, drives the movement core with a scripted
//! input sequence at a fixed frame rate and logs what happens.
//!
//! Usage: `gravrun [settings.toml] [--write-defaults]`

mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use gravrun_core::TriggerShape;
use gravrun_game::{
    CheckpointVolume, FrameInput, GameConfig, InputEvent, ReorientationVolume, Simulation,
};
use gravrun_physics::{CharacterBody, PhysicsWorld, RapierMotor, ALL_GROUPS};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Frames per second of the scripted run
const FRAME_RATE: f32 = 60.0;

/// Length of the scripted run in frames
const FRAMES: u32 = 900;

/// Collision group of walls that allow climb jumps
const CLIMBABLE: u32 = 0b10;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    let mut path = None;
    let mut write_defaults = false;
    for arg in std::env::args().skip(1) {
        if arg == "--write-defaults" {
            write_defaults = true;
        } else {
            path = Some(PathBuf::from(arg));
        }
    }

    if write_defaults {
        let target = path
            .or_else(settings::default_path)
            .context("Could not determine config directory")?;
        return settings::write_defaults(&target);
    }

    info!("Starting Gravrun course runner...");
    let config = settings::load(path.as_deref());
    run(config)
}

/// Static course: a floor, a climbable wall and a side wall for sideways gravity
fn build_course(config: &GameConfig, spawn: Vec3) -> RapierMotor {
    let mut world = PhysicsWorld::new();
    world.create_ground(0.0);
    world.create_static_box(
        Vec3::new(4.0, 3.0, 0.5),
        Vec3::new(0.0, 3.0, -40.0),
        CLIMBABLE,
    );
    world.create_static_box(
        Vec3::new(0.5, 20.0, 60.0),
        Vec3::new(12.0, 20.0, -20.0),
        ALL_GROUPS,
    );

    let body = CharacterBody::with_config(config.body.clone());
    RapierMotor::new(world, body, spawn, Vec3::Y)
}

/// Input for frame `frame` of the script
fn scripted_input(frame: u32) -> FrameInput {
    let mut input = FrameInput::new();
    let forward = match frame {
        0..=599 => Vec2::Y,
        _ => Vec2::ZERO,
    };
    input.apply(InputEvent::Move(forward));

    match frame {
        60 | 75 => input.apply(InputEvent::Jump),
        150 => input.apply(InputEvent::Dash),
        200..=260 => input.apply(InputEvent::Slide(true)),
        330..=345 => input.apply(InputEvent::Move(Vec2::X)),
        400 => input.apply(InputEvent::Look(Vec2::new(300.0, -40.0))),
        480 => input.apply(InputEvent::PowerUp),
        _ => {}
    }
    input
}

fn run(config: GameConfig) -> Result<()> {
    let spawn = Vec3::new(0.0, 1.0, 0.0);
    let motor = build_course(&config, spawn);
    let mut sim = Simulation::new(config, motor, spawn).context("Invalid settings")?;

    sim.add_checkpoint(CheckpointVolume::new(1, TriggerShape::sphere(spawn, 1.5)));
    sim.add_checkpoint(CheckpointVolume::new(
        2,
        TriggerShape::cuboid(Vec3::new(0.0, 1.0, -20.0), Vec3::new(4.0, 2.0, 1.0)),
    ));
    sim.add_volume(ReorientationVolume::gravity(TriggerShape::sphere(
        Vec3::new(0.0, 1.0, -30.0),
        2.0,
    )));
    sim.add_volume(ReorientationVolume::rotation(
        TriggerShape::sphere(Vec3::new(6.0, 1.0, -30.0), 2.0),
        Some(12.0),
    ));
    sim.controller_mut()
        .landed
        .subscribe(|_| info!("landed"));

    let dt = 1.0 / FRAME_RATE;
    for frame in 0..FRAMES {
        let summary = sim.frame(dt, &scripted_input(frame));
        if let Some(completion) = summary.completion {
            info!(
                outcome = ?completion.outcome,
                timed_out = completion.timed_out,
                "reorientation finished"
            );
        }

        if frame % FRAME_RATE as u32 == 0 {
            let controller = sim.controller();
            info!(
                t = sim.time().total_unscaled_time,
                position = ?controller.position(),
                speed = controller.speed(),
                state = ?controller.state(),
                gravity = ?controller.gravity_direction(),
                meter = sim.meter().value(),
                "status"
            );
        }
        if frame == 720 {
            sim.respawn();
        }
    }

    info!(
        checkpoint = ?sim.checkpoints().last_index(),
        position = ?sim.controller().position(),
        "Course run finished"
    );
    Ok(())
}
