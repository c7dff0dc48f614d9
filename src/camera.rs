//! Turntable camera
//!
//! The camera orbits a fixed centre on the model; dragging rotates it, scrolling changes the
//! distance. `bevy_panorbit_camera` does the manipulation.

use bevy::prelude::*;
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

use crate::config::AppConfig;

/// Marker for the camera whose position is the shading eye position
#[derive(Component)]
pub struct MainCamera;

pub struct TurntablePlugin;

impl Plugin for TurntablePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PanOrbitCameraPlugin)
            .add_systems(Startup, spawn_turntable_camera);
    }
}

pub fn spawn_turntable_camera(mut commands: Commands, config: Res<AppConfig>) {
    let turntable = &config.turntable;
    let center = turntable.center();

    let pan_orbit = PanOrbitCamera {
        focus: center,
        radius: Some(turntable.distance),
        yaw: Some(turntable.around),
        pitch: Some(turntable.up),
        force_update: true,
        ..default()
    };

    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.2, 0.2, 0.2)),
            ..default()
        },
        pan_orbit,
        MainCamera,
        Transform::from_translation(center + Vec3::Z * turntable.distance)
            .looking_at(center, Vec3::Y),
        Name::new("Turntable Camera"),
    ));
}
