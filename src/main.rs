use bevy::prelude::*;
use bevy::window::WindowResolution;
use slingshot::constants::{WORLD_HEIGHT, WORLD_WIDTH};
use slingshot::game::{GamePlugin, SlingshotPhysicsPlugin};
use slingshot::input::PlayerInputPlugin;
use slingshot::particles::ParticlesPlugin;
use slingshot::rendering::RenderingPlugin;
use slingshot::scenario::{configure_scenario, SCENARIO_ENV};
use std::env;

fn main() {
    let scenario = env::var(SCENARIO_ENV).ok();

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Slingshot".into(),
            resolution: WindowResolution::new(WORLD_WIDTH as u32, WORLD_HEIGHT as u32),
            ..Default::default()
        }),
        ..Default::default()
    }))
    // GamePlugin first: the physics plugin reads the configured step.
    .add_plugins(GamePlugin)
    .add_plugins(SlingshotPhysicsPlugin)
    .add_plugins((PlayerInputPlugin, RenderingPlugin, ParticlesPlugin));

    if let Some(name) = scenario {
        configure_scenario(&mut app, &name);
    }

    app.run();
}
