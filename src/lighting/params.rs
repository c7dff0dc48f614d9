//! Per-frame shading parameters
//!
//! Builds the named parameter set consumed by the lighting shader: material reflection
//! coefficients, light intensities scaled by the toggle multipliers, the light position,
//! the two ramp textures and the eye position.

use std::collections::HashMap;

use anyhow::Result;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::toggles::LightingToggles;

pub const AMBIENT_LIGHT_INTENSITY: &str = "ambient_light_intensity";
pub const DIFFUSE_LIGHT_INTENSITY: &str = "diffuse_light_intensity";
pub const SPECULAR_LIGHT_INTENSITY: &str = "specular_light_intensity";
pub const AMBIENT_REFLECTION_COEFF: &str = "ambient_reflection_coeff";
pub const DIFFUSE_REFLECTION_COEFF: &str = "diffuse_reflection_coeff";
pub const SPECULAR_REFLECTION_COEFF: &str = "specular_reflection_coeff";
pub const SPECULAR_EXPONENT: &str = "specular_exponent";
pub const LIGHT_POSITION: &str = "light_position";
pub const TEXTURE_SAMPLER_DIFFUSE: &str = "texture_sampler_diffuse";
pub const TEXTURE_SAMPLER_SPECULAR: &str = "texture_sampler_specular";
pub const EYE_POS_WORLD: &str = "eye_pos_world";

/// Reflection coefficients ("K" terms) of the shaded surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialConstants {
    pub ambient_reflection: Vec3,
    pub diffuse_reflection: Vec3,
    pub specular_reflection: Vec3,
    pub specular_exponent: f32,
}

/// Selectable material at startup
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialPreset {
    /// Polished brass
    #[default]
    Brass,
    /// White surface; all colour comes from the ramp textures
    Toon,
}

impl MaterialPreset {
    pub fn constants(self) -> MaterialConstants {
        match self {
            MaterialPreset::Brass => MaterialConstants {
                ambient_reflection: Vec3::new(0.33, 0.22, 0.03),
                diffuse_reflection: Vec3::new(0.78, 0.57, 0.11),
                specular_reflection: Vec3::new(0.99, 0.94, 0.80),
                specular_exponent: 27.9,
            },
            MaterialPreset::Toon => MaterialConstants {
                ambient_reflection: Vec3::ONE,
                diffuse_reflection: Vec3::ONE,
                specular_reflection: Vec3::ONE,
                specular_exponent: 50.0,
            },
        }
    }
}

/// Base intensities ("I" terms) of a white point light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightIntensities {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for LightIntensities {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.3),
            diffuse: Vec3::splat(0.6),
            specular: Vec3::splat(1.0),
        }
    }
}

impl LightIntensities {
    /// Scale each channel by its toggle multiplier
    pub fn toggled(&self, toggles: &LightingToggles) -> Self {
        Self {
            ambient: self.ambient * toggles.ambient(),
            diffuse: self.diffuse * toggles.diffuse(),
            specular: self.specular * toggles.specular(),
        }
    }
}

/// Diffuse and specular lookup ramps
#[derive(Debug, Clone, PartialEq)]
pub struct RampTextures {
    pub diffuse: Handle<Image>,
    pub specular: Handle<Image>,
}

/// A single named shader parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderValue {
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Texture(Handle<Image>),
}

/// Everything the lighting shader needs for one frame, looked up by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadingParameters {
    values: HashMap<&'static str, ShaderValue>,
}

impl ShadingParameters {
    pub fn set(&mut self, name: &'static str, value: ShaderValue) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&ShaderValue> {
        self.values.get(name)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name) {
            Some(ShaderValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        match self.get(name) {
            Some(ShaderValue::Vec3(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn vec4(&self, name: &str) -> Option<Vec4> {
        match self.get(name) {
            Some(ShaderValue::Vec4(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn texture(&self, name: &str) -> Option<&Handle<Image>> {
        match self.get(name) {
            Some(ShaderValue::Texture(handle)) => Some(handle),
            _ => None,
        }
    }
}

/// Fixed inputs of the parameter builder, set up once at startup
#[derive(Resource, Debug, Clone)]
pub struct ShadingSetup {
    pub material: MaterialConstants,
    pub intensities: LightIntensities,
    pub ramps: Option<RampTextures>,
}

impl ShadingSetup {
    pub fn new(material: MaterialConstants, ramps: Option<RampTextures>) -> Self {
        Self {
            material,
            intensities: LightIntensities::default(),
            ramps,
        }
    }

    /// Build the complete parameter set for one frame.
    ///
    /// Fails without producing a partial set when a ramp texture is missing.
    pub fn build(
        &self,
        toggles: &LightingToggles,
        light_position: Vec4,
        eye_position: Vec3,
    ) -> Result<ShadingParameters> {
        let Some(ramps) = &self.ramps else {
            anyhow::bail!("ramp textures are not loaded");
        };

        let light = self.intensities.toggled(toggles);
        let mut params = ShadingParameters::default();
        params.set(AMBIENT_LIGHT_INTENSITY, ShaderValue::Vec3(light.ambient));
        params.set(DIFFUSE_LIGHT_INTENSITY, ShaderValue::Vec3(light.diffuse));
        params.set(SPECULAR_LIGHT_INTENSITY, ShaderValue::Vec3(light.specular));

        params.set(
            AMBIENT_REFLECTION_COEFF,
            ShaderValue::Vec3(self.material.ambient_reflection),
        );
        params.set(
            DIFFUSE_REFLECTION_COEFF,
            ShaderValue::Vec3(self.material.diffuse_reflection),
        );
        params.set(
            SPECULAR_REFLECTION_COEFF,
            ShaderValue::Vec3(self.material.specular_reflection),
        );
        params.set(
            SPECULAR_EXPONENT,
            ShaderValue::Float(self.material.specular_exponent),
        );

        params.set(LIGHT_POSITION, ShaderValue::Vec4(light_position));
        params.set(
            TEXTURE_SAMPLER_DIFFUSE,
            ShaderValue::Texture(ramps.diffuse.clone()),
        );
        params.set(
            TEXTURE_SAMPLER_SPECULAR,
            ShaderValue::Texture(ramps.specular.clone()),
        );
        params.set(EYE_POS_WORLD, ShaderValue::Vec3(eye_position));
        Ok(params)
    }
}
