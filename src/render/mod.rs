//! Render module
//!
//! The engine side of the lighting scene: the Phong/toon material, shader slots with live
//! reload, model and ramp loading, the per-frame draw system and the status overlay.

use bevy::prelude::*;
use bevy::render::{Render, RenderApp, RenderSystems};
use bevy::transform::TransformSystems;

pub mod draw;
pub mod hud;
pub mod material;
pub mod scene;
pub mod shaders;

pub use draw::{LastFrame, run_frame};
pub use material::ShadyMaterial;

use crate::config::AppConfig;
use crate::lighting::{FrameOrchestrator, apply_lighting_commands};

/// Plugin for shading the model and drawing the light
pub struct ShadingPlugin;

impl Plugin for ShadingPlugin {
    fn build(&self, app: &mut App) {
        let anchor = app
            .world()
            .get_resource::<AppConfig>()
            .map(|config| config.turntable.center())
            .unwrap_or_default();

        let pipeline_failures = shaders::ShaderPipelineFailures::default();

        app.add_plugins(MaterialPlugin::<ShadyMaterial>::default())
            .insert_resource(pipeline_failures.clone())
            .insert_resource(FrameOrchestrator::new(anchor))
            .init_resource::<LastFrame>()
            .add_systems(
                Startup,
                (shaders::load_shaders, scene::load_scene, hud::spawn_hud),
            )
            .add_systems(
                Update,
                (
                    shaders::reload_shaders.after(apply_lighting_commands),
                    shaders::sync_shader_slots,
                    shaders::restore_last_good_shaders.after(shaders::sync_shader_slots),
                    shaders::report_shader_failures,
                    scene::adopt_model_surfaces,
                    scene::watch_startup_assets,
                    hud::update_hud,
                ),
            )
            .add_systems(
                PostUpdate,
                run_frame.after(TransformSystems::Propagate),
            );

        if let Some(render_app) = app.get_sub_app_mut(RenderApp) {
            render_app.insert_resource(pipeline_failures).add_systems(
                Render,
                shaders::detect_failed_pipelines.in_set(RenderSystems::Cleanup),
            );
        }
    }
}
