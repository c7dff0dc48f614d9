// Per-pixel Phong/toon lighting of a loaded model, lit by a point light that wanders around it.
//
// Keys: A/D/S toggle the ambient/diffuse/specular terms, L shows the vector to the light,
// R reloads the shaders from disk.

use anyhow::Context;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin, WindowResolution};

#[cfg(feature = "dev")]
use bevy::dev_tools::fps_overlay::FpsOverlayPlugin;

mod camera;
mod config;
mod lighting;
mod render;

use camera::TurntablePlugin;
use config::AppConfig;
use lighting::LightingPlugin;
use render::ShadingPlugin;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("startup resources are missing")?;
    let asset_root = config.asset_root();

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: config.window.title.clone(),
                    resolution: WindowResolution::new(config.window.width, config.window.height),
                    resizable: config.window.resizable,
                    present_mode: PresentMode::AutoVsync,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: asset_root.to_string_lossy().into_owned(),
                ..default()
            }),
    );

    #[cfg(feature = "dev")]
    app.add_plugins(FpsOverlayPlugin::default());

    app.insert_resource(config)
        .add_plugins(LightingPlugin)
        .add_plugins(ShadingPlugin)
        .add_plugins(TurntablePlugin);

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("exited with error code {}", code),
    }
}
