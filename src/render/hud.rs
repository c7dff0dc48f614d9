//! Status overlay: lighting toggles, light position and key bindings

use bevy::prelude::*;

use crate::lighting::{FrameOrchestrator, LightingToggles, on_off};

use super::draw::LastFrame;

#[derive(Component)]
pub struct LightingHud;

pub fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.9, 0.9, 0.9)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        LightingHud,
    ));
}

pub fn hud_text(toggles: &LightingToggles, elapsed: f64, last_frame: &LastFrame) -> String {
    let frame = match last_frame.report {
        Some(report) => format!(
            "t {:.1}s  light ({:.2}, {:.2}, {:.2})  surfaces {} drawn, {} skipped{}",
            elapsed,
            report.light_position.x,
            report.light_position.y,
            report.light_position.z,
            report.surfaces_drawn,
            report.surfaces_skipped,
            if report.light_vector_drawn { "  light vector drawn" } else { "" },
        ),
        None => "waiting for first frame".to_string(),
    };
    format!(
        "[A] ambient {}  [D] diffuse {}  [S] specular {}  [L] light vector {}  [R] reload shaders\n{}",
        on_off(toggles.ambient()),
        on_off(toggles.diffuse()),
        on_off(toggles.specular()),
        if toggles.show_light_vector { "on" } else { "off" },
        frame
    )
}

pub fn update_hud(
    toggles: Res<LightingToggles>,
    orchestrator: Res<FrameOrchestrator>,
    last_frame: Res<LastFrame>,
    mut query: Query<&mut Text, With<LightingHud>>,
) {
    for mut text in &mut query {
        text.0 = hud_text(&toggles, orchestrator.elapsed(), &last_frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::{FrameReport, LightingCommand};

    #[test]
    fn test_hud_reflects_toggles() {
        let mut toggles = LightingToggles::default();
        toggles.apply(LightingCommand::ToggleSpecular);
        let text = hud_text(&toggles, 0.0, &LastFrame::default());
        assert!(text.contains("[S] specular off"));
        assert!(text.contains("[A] ambient on"));
        assert!(text.contains("waiting for first frame"));
    }

    #[test]
    fn test_hud_reports_last_frame() {
        let last_frame = LastFrame {
            report: Some(FrameReport {
                light_position: Vec4::new(1.0, 2.0, 3.0, 1.0),
                surfaces_drawn: 2,
                surfaces_skipped: 1,
                light_vector_drawn: true,
            }),
            ..default()
        };
        let text = hud_text(&LightingToggles::default(), 4.25, &last_frame);
        assert!(text.contains("t 4.2s") || text.contains("t 4.3s"));
        assert!(text.contains("light (1.00, 2.00, 3.00)"));
        assert!(text.contains("surfaces 2 drawn, 1 skipped"));
        assert!(text.contains("light vector drawn"));
    }
}
