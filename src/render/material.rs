use anyhow::Context;
use bevy::mesh::MeshVertexBufferLayoutRef;
use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::render::render_resource::{
    AsBindGroup, RenderPipelineDescriptor, ShaderType, SpecializedMeshPipelineError,
};
use bevy::shader::ShaderRef;

use crate::lighting::params::{
    AMBIENT_LIGHT_INTENSITY, AMBIENT_REFLECTION_COEFF, DIFFUSE_LIGHT_INTENSITY,
    DIFFUSE_REFLECTION_COEFF, EYE_POS_WORLD, LIGHT_POSITION, SPECULAR_EXPONENT,
    SPECULAR_LIGHT_INTENSITY, SPECULAR_REFLECTION_COEFF, TEXTURE_SAMPLER_DIFFUSE,
    TEXTURE_SAMPLER_SPECULAR,
};
use crate::lighting::{RampTextures, ShadingParameters};

use super::shaders::{FRAGMENT_SHADER_SLOT, VERTEX_SHADER_SLOT};

/// Uniform block of the lighting shader; field order matches `ShadyLighting` in the WGSL
#[derive(ShaderType, Debug, Clone, Copy, Default, PartialEq)]
pub struct ShadyLighting {
    pub ambient_light_intensity: Vec3,
    pub diffuse_light_intensity: Vec3,
    pub specular_light_intensity: Vec3,
    pub ambient_reflection_coeff: Vec3,
    pub diffuse_reflection_coeff: Vec3,
    pub specular_reflection_coeff: Vec3,
    pub specular_exponent: f32,
    pub light_position: Vec4,
    pub eye_pos_world: Vec3,
}

impl ShadyLighting {
    pub fn from_parameters(params: &ShadingParameters) -> anyhow::Result<Self> {
        let vec3 = |name: &str| {
            params
                .vec3(name)
                .with_context(|| format!("missing shading parameter {name}"))
        };
        Ok(Self {
            ambient_light_intensity: vec3(AMBIENT_LIGHT_INTENSITY)?,
            diffuse_light_intensity: vec3(DIFFUSE_LIGHT_INTENSITY)?,
            specular_light_intensity: vec3(SPECULAR_LIGHT_INTENSITY)?,
            ambient_reflection_coeff: vec3(AMBIENT_REFLECTION_COEFF)?,
            diffuse_reflection_coeff: vec3(DIFFUSE_REFLECTION_COEFF)?,
            specular_reflection_coeff: vec3(SPECULAR_REFLECTION_COEFF)?,
            specular_exponent: params
                .float(SPECULAR_EXPONENT)
                .context("missing shading parameter specular_exponent")?,
            light_position: params
                .vec4(LIGHT_POSITION)
                .context("missing shading parameter light_position")?,
            eye_pos_world: vec3(EYE_POS_WORLD)?,
        })
    }
}

/// Phong/toon material whose uniforms are rewritten every frame from [`ShadingParameters`]
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct ShadyMaterial {
    #[uniform(0)]
    pub lighting: ShadyLighting,
    #[texture(1)]
    #[sampler(2)]
    pub diffuse_ramp: Handle<Image>,
    #[texture(3)]
    #[sampler(4)]
    pub specular_ramp: Handle<Image>,
}

impl ShadyMaterial {
    pub fn new(ramps: &RampTextures) -> Self {
        Self {
            lighting: ShadyLighting::default(),
            diffuse_ramp: ramps.diffuse.clone(),
            specular_ramp: ramps.specular.clone(),
        }
    }

    /// Copy a frame's parameter set into the material
    pub fn apply(&mut self, params: &ShadingParameters) -> anyhow::Result<()> {
        self.lighting = ShadyLighting::from_parameters(params)?;
        if let Some(diffuse) = params.texture(TEXTURE_SAMPLER_DIFFUSE)
            && *diffuse != self.diffuse_ramp
        {
            self.diffuse_ramp = diffuse.clone();
        }
        if let Some(specular) = params.texture(TEXTURE_SAMPLER_SPECULAR)
            && *specular != self.specular_ramp
        {
            self.specular_ramp = specular.clone();
        }
        Ok(())
    }
}

impl Material for ShadyMaterial {
    fn vertex_shader() -> ShaderRef {
        VERTEX_SHADER_SLOT.into()
    }

    fn fragment_shader() -> ShaderRef {
        FRAGMENT_SHADER_SLOT.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Opaque
    }

    // The vertex shader only consumes positions and normals
    fn specialize(
        _pipeline: &MaterialPipeline,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_NORMAL.at_shader_location(1),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::{LightingCommand, LightingToggles, MaterialPreset, ShadingSetup};

    fn params(toggles: &LightingToggles) -> ShadingParameters {
        ShadingSetup::new(
            MaterialPreset::Brass.constants(),
            Some(RampTextures {
                diffuse: Handle::default(),
                specular: Handle::default(),
            }),
        )
        .build(toggles, Vec4::new(4.0, 5.0, 6.0, 1.0), Vec3::new(0.0, 1.0, 2.0))
        .unwrap()
    }

    #[test]
    fn test_uniform_mirrors_parameters() {
        let mut toggles = LightingToggles::default();
        toggles.apply(LightingCommand::ToggleDiffuse);
        let lighting = ShadyLighting::from_parameters(&params(&toggles)).unwrap();

        assert_eq!(lighting.ambient_light_intensity, Vec3::splat(0.3));
        assert_eq!(lighting.diffuse_light_intensity, Vec3::ZERO);
        assert_eq!(lighting.specular_light_intensity, Vec3::ONE);
        assert_eq!(lighting.specular_exponent, 27.9);
        assert_eq!(lighting.light_position, Vec4::new(4.0, 5.0, 6.0, 1.0));
        assert_eq!(lighting.eye_pos_world, Vec3::new(0.0, 1.0, 2.0));
    }

    #[test]
    fn test_incomplete_parameters_are_rejected() {
        assert!(ShadyLighting::from_parameters(&ShadingParameters::default()).is_err());
    }

    #[test]
    fn test_apply_updates_material() {
        let ramps = RampTextures {
            diffuse: Handle::default(),
            specular: Handle::default(),
        };
        let mut material = ShadyMaterial::new(&ramps);
        material.apply(&params(&LightingToggles::default())).unwrap();
        assert_eq!(material.lighting.diffuse_light_intensity, Vec3::splat(0.6));
    }
}
