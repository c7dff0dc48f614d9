//! Interactive lighting toggles

use bevy::prelude::*;

/// Discrete lighting commands delivered by the input layer
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightingCommand {
    ToggleAmbient,
    ToggleDiffuse,
    ToggleSpecular,
    ToggleLightVectorDisplay,
    /// Handled by the shader host, not by [`LightingToggles`]
    ReloadShaders,
}

impl LightingCommand {
    /// Key binding for each command; any other key is not a lighting command
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyR => Some(Self::ReloadShaders),
            KeyCode::KeyL => Some(Self::ToggleLightVectorDisplay),
            KeyCode::KeyS => Some(Self::ToggleSpecular),
            KeyCode::KeyD => Some(Self::ToggleDiffuse),
            KeyCode::KeyA => Some(Self::ToggleAmbient),
            _ => None,
        }
    }
}

/// On/off multipliers for each lighting term.
///
/// The multipliers are always exactly 0.0 or 1.0 so a term can be switched off with a single
/// multiply in the parameter builder.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct LightingToggles {
    ambient: f32,
    diffuse: f32,
    specular: f32,
    pub show_light_vector: bool,
}

impl Default for LightingToggles {
    fn default() -> Self {
        Self {
            ambient: 1.0,
            diffuse: 1.0,
            specular: 1.0,
            show_light_vector: false,
        }
    }
}

impl LightingToggles {
    pub fn ambient(&self) -> f32 {
        self.ambient
    }

    pub fn diffuse(&self) -> f32 {
        self.diffuse
    }

    pub fn specular(&self) -> f32 {
        self.specular
    }

    /// Apply one command. Returns false when the command carries no toggle state.
    pub fn apply(&mut self, command: LightingCommand) -> bool {
        match command {
            LightingCommand::ToggleAmbient => flip(&mut self.ambient),
            LightingCommand::ToggleDiffuse => flip(&mut self.diffuse),
            LightingCommand::ToggleSpecular => flip(&mut self.specular),
            LightingCommand::ToggleLightVectorDisplay => {
                self.show_light_vector = !self.show_light_vector
            }
            LightingCommand::ReloadShaders => return false,
        }
        true
    }
}

fn flip(multiplier: &mut f32) {
    *multiplier = if *multiplier == 1.0 { 0.0 } else { 1.0 };
}

/// Human readable on/off label for a multiplier
pub fn on_off(multiplier: f32) -> &'static str {
    if multiplier == 1.0 { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOGGLES: [LightingCommand; 4] = [
        LightingCommand::ToggleAmbient,
        LightingCommand::ToggleDiffuse,
        LightingCommand::ToggleSpecular,
        LightingCommand::ToggleLightVectorDisplay,
    ];

    fn assert_binary(toggles: &LightingToggles) {
        for m in [toggles.ambient(), toggles.diffuse(), toggles.specular()] {
            assert!(m == 0.0 || m == 1.0, "multiplier {m} is not binary");
        }
    }

    #[test]
    fn test_defaults_all_terms_on() {
        let toggles = LightingToggles::default();
        assert_eq!(toggles.ambient(), 1.0);
        assert_eq!(toggles.diffuse(), 1.0);
        assert_eq!(toggles.specular(), 1.0);
        assert!(!toggles.show_light_vector);
    }

    #[test]
    fn test_each_toggle_is_its_own_inverse() {
        for command in TOGGLES {
            let mut toggles = LightingToggles::default();
            let before = toggles;
            assert!(toggles.apply(command));
            assert_ne!(toggles, before);
            assert_binary(&toggles);
            assert!(toggles.apply(command));
            assert_eq!(toggles, before);
        }
    }

    #[test]
    fn test_toggle_only_touches_its_own_flag() {
        let mut toggles = LightingToggles::default();
        toggles.apply(LightingCommand::ToggleSpecular);
        assert_eq!(toggles.specular(), 0.0);
        assert_eq!(toggles.ambient(), 1.0);
        assert_eq!(toggles.diffuse(), 1.0);
        assert!(!toggles.show_light_vector);
    }

    #[test]
    fn test_long_command_sequence_stays_binary() {
        let mut toggles = LightingToggles::default();
        for i in 0..97 {
            toggles.apply(TOGGLES[i % TOGGLES.len()]);
            assert_binary(&toggles);
        }
    }

    #[test]
    fn test_reload_leaves_toggles_untouched() {
        let mut toggles = LightingToggles::default();
        assert!(!toggles.apply(LightingCommand::ReloadShaders));
        assert_eq!(toggles, LightingToggles::default());
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            LightingCommand::from_key(KeyCode::KeyR),
            Some(LightingCommand::ReloadShaders)
        );
        assert_eq!(
            LightingCommand::from_key(KeyCode::KeyL),
            Some(LightingCommand::ToggleLightVectorDisplay)
        );
        assert_eq!(
            LightingCommand::from_key(KeyCode::KeyS),
            Some(LightingCommand::ToggleSpecular)
        );
        assert_eq!(
            LightingCommand::from_key(KeyCode::KeyD),
            Some(LightingCommand::ToggleDiffuse)
        );
        assert_eq!(
            LightingCommand::from_key(KeyCode::KeyA),
            Some(LightingCommand::ToggleAmbient)
        );
        assert_eq!(LightingCommand::from_key(KeyCode::KeyQ), None);
        assert_eq!(LightingCommand::from_key(KeyCode::Space), None);
    }
}
