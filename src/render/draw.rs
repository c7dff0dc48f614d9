//! Bevy side of the frame tick
//!
//! Posed surfaces are the mesh entities in the world. The mesh pipeline draws each of them with
//! its own `GlobalTransform`, so "drawing" a surface here means handing it this frame's
//! parameter set through its material.

use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy::time::Real;

use crate::camera::MainCamera;
use crate::lighting::{
    FrameOrchestrator, FrameReport, FrameSink, LightingToggles, PosedSurface, ShadingParameters,
    ShadingSetup,
};

use super::material::ShadyMaterial;

const LIGHT_DEBUG_COLOR: Color = Color::srgb(1.0, 1.0, 0.0);

/// A mesh entity for this frame
pub struct SceneSurface<'a> {
    transform: &'a GlobalTransform,
    material: Option<&'a MeshMaterial3d<ShadyMaterial>>,
}

impl PosedSurface for SceneSurface<'_> {
    type Geometry = MeshMaterial3d<ShadyMaterial>;

    fn geometry(&self) -> Option<&Self::Geometry> {
        self.material
    }

    fn world_from_local(&self) -> Affine3A {
        self.transform.affine()
    }
}

/// Writes parameters into materials and debug geometry into gizmos
pub struct GizmoFrameSink<'a, 'w, 's> {
    materials: &'a mut Assets<ShadyMaterial>,
    gizmos: &'a mut Gizmos<'w, 's>,
    updated: Vec<AssetId<ShadyMaterial>>,
}

impl FrameSink for GizmoFrameSink<'_, '_, '_> {
    type Geometry = MeshMaterial3d<ShadyMaterial>;

    fn draw_surface(
        &mut self,
        geometry: &Self::Geometry,
        _world_from_local: Affine3A,
        params: &ShadingParameters,
    ) {
        // Surfaces usually share one material; write it once per frame
        let id = geometry.0.id();
        if self.updated.contains(&id) {
            return;
        }
        self.updated.push(id);
        let Some(material) = self.materials.get_mut(id) else {
            return;
        };
        if let Err(err) = material.apply(params) {
            warn!("Could not apply shading parameters: {err:#}");
        }
    }

    fn draw_light_marker(&mut self, center: Vec3, radius: f32) {
        self.gizmos
            .sphere(Isometry3d::from_translation(center), radius, LIGHT_DEBUG_COLOR);
    }

    fn draw_light_vector(&mut self, from: Vec3, to: Vec3) {
        self.gizmos.line(from, to, LIGHT_DEBUG_COLOR);
    }
}

/// Last tick's outcome, for the HUD
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct LastFrame {
    pub report: Option<FrameReport>,
    pub(crate) failing: bool,
}

/// One tick of the lighting scene
pub fn run_frame(
    time: Res<Time<Real>>,
    toggles: Res<LightingToggles>,
    setup: Option<Res<ShadingSetup>>,
    mut orchestrator: ResMut<FrameOrchestrator>,
    mut last_frame: ResMut<LastFrame>,
    camera: Query<&GlobalTransform, With<MainCamera>>,
    surfaces: Query<(&GlobalTransform, Option<&MeshMaterial3d<ShadyMaterial>>), With<Mesh3d>>,
    mut materials: ResMut<Assets<ShadyMaterial>>,
    mut gizmos: Gizmos,
) {
    let Some(setup) = setup else {
        return;
    };
    let eye = camera
        .single()
        .map(|transform| transform.translation())
        .unwrap_or(Vec3::ZERO);

    let mut sink = GizmoFrameSink {
        materials: &mut *materials,
        gizmos: &mut gizmos,
        updated: Vec::new(),
    };
    let posed = surfaces
        .iter()
        .map(|(transform, material)| SceneSurface { transform, material });

    match orchestrator.tick(
        time.delta_secs_f64(),
        &toggles,
        &setup,
        eye,
        posed,
        &mut sink,
    ) {
        Ok(report) => {
            last_frame.report = Some(report);
            last_frame.failing = false;
        }
        Err(err) => {
            if !last_frame.failing {
                error!("Surfaces not drawn: {err:#}");
            }
            last_frame.failing = true;
        }
    }
}
