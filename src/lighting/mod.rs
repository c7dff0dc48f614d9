//! Lighting module
//!
//! Light animation, the interactive lighting toggles, per-frame shading parameters and the
//! frame tick that ties them together. Nothing in here touches the GPU; the render module
//! supplies the collaborators.

use bevy::prelude::*;

pub mod animator;
pub mod frame;
pub mod params;
pub mod toggles;

pub use frame::{FrameOrchestrator, FrameReport, FrameSink, PosedSurface};
pub use params::{MaterialPreset, RampTextures, ShadingParameters, ShadingSetup};
pub use toggles::{LightingCommand, LightingToggles, on_off};

/// Plugin for keyboard driven lighting toggles
pub struct LightingPlugin;

impl Plugin for LightingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LightingToggles>()
            .add_message::<LightingCommand>()
            .add_systems(
                Update,
                (
                    read_lighting_keys,
                    apply_lighting_commands.after(read_lighting_keys),
                ),
            );
    }
}

/// Translate key presses into lighting commands
pub fn read_lighting_keys(
    input: Res<ButtonInput<KeyCode>>,
    mut commands: MessageWriter<LightingCommand>,
) {
    for key in input.get_just_pressed() {
        if let Some(command) = LightingCommand::from_key(*key) {
            commands.write(command);
        }
    }
}

/// Apply toggle commands to the lighting state
pub fn apply_lighting_commands(
    mut commands: MessageReader<LightingCommand>,
    mut toggles: ResMut<LightingToggles>,
) {
    for command in commands.read() {
        if toggles.apply(*command) {
            info!(
                "Lighting: ambient {}, diffuse {}, specular {}, light vector {}",
                on_off(toggles.ambient()),
                on_off(toggles.diffuse()),
                on_off(toggles.specular()),
                if toggles.show_light_vector { "shown" } else { "hidden" },
            );
        }
    }
}
