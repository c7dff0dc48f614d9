//! Model and ramp texture loading
//!
//! The glTF scene is spawned as-is; once its mesh entities appear their standard materials are
//! swapped for the shared [`ShadyMaterial`].

use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::image::ImageLoaderSettings;
use bevy::prelude::*;

use crate::config::AppConfig;
use crate::lighting::{RampTextures, ShadingSetup};

use super::material::ShadyMaterial;

/// Root of the loaded model
#[derive(Component)]
pub struct ShadedModel;

/// Load progress of one startup resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    Pending,
    Loaded,
    Failed(String),
}

impl AssetStatus {
    fn from_load_state(state: Option<LoadState>) -> Self {
        match state {
            Some(LoadState::Loaded) => AssetStatus::Loaded,
            Some(LoadState::Failed(err)) => AssetStatus::Failed(err.to_string()),
            _ => AssetStatus::Pending,
        }
    }
}

/// Startup resources whose failure to load ends the app
#[derive(Resource, Debug, Clone, Default)]
pub struct StartupAssets {
    tracked: Vec<(String, UntypedHandle)>,
}

impl StartupAssets {
    pub fn track(&mut self, path: impl Into<String>, handle: UntypedHandle) {
        self.tracked.push((path.into(), handle));
    }

    pub fn is_settled(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Drop every resource that finished loading. Returns the failed ones as
    /// `(path, error)`; loaded ones are logged.
    pub fn settle(
        &mut self,
        mut status: impl FnMut(&UntypedHandle) -> AssetStatus,
    ) -> Vec<(String, String)> {
        let mut failed = Vec::new();
        self.tracked.retain(|(path, handle)| match status(handle) {
            AssetStatus::Pending => true,
            AssetStatus::Loaded => {
                info!("Loaded {}", path);
                false
            }
            AssetStatus::Failed(err) => {
                failed.push((path.clone(), err));
                false
            }
        });
        failed
    }
}

/// The one material instance shared by every surface of the model
#[derive(Resource, Debug, Clone)]
pub struct SharedShadyMaterial(pub Handle<ShadyMaterial>);

pub fn load_scene(
    mut commands: Commands,
    config: Res<AppConfig>,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<ShadyMaterial>>,
) {
    // Ramps are lookup tables, not colour images
    let diffuse: Handle<Image> = asset_server.load_with_settings(
        config.paths.diffuse_ramp.clone(),
        |settings: &mut ImageLoaderSettings| settings.is_srgb = false,
    );
    let specular: Handle<Image> = asset_server.load_with_settings(
        config.paths.specular_ramp.clone(),
        |settings: &mut ImageLoaderSettings| settings.is_srgb = false,
    );
    // Parse failures are reported against the glTF file itself, not its labeled scene
    let gltf: Handle<Gltf> = asset_server.load(config.paths.model.clone());
    let model: Handle<Scene> =
        asset_server.load(GltfAssetLabel::Scene(0).from_asset(config.paths.model.clone()));

    let ramps = RampTextures {
        diffuse: diffuse.clone(),
        specular: specular.clone(),
    };
    let material = materials.add(ShadyMaterial::new(&ramps));

    commands.insert_resource(ShadingSetup::new(config.material.constants(), Some(ramps)));
    commands.insert_resource(SharedShadyMaterial(material));
    let mut startup = StartupAssets::default();
    startup.track(config.paths.model.clone(), gltf.untyped());
    startup.track(
        format!("{}#Scene0", config.paths.model),
        model.clone().untyped(),
    );
    startup.track(config.paths.diffuse_ramp.clone(), diffuse.untyped());
    startup.track(config.paths.specular_ramp.clone(), specular.untyped());
    commands.insert_resource(startup);

    commands.spawn((
        SceneRoot(model),
        ShadedModel,
        Transform::default(),
        Name::new("Model"),
    ));
}

/// Give newly spawned model meshes the lighting material
pub fn adopt_model_surfaces(
    mut commands: Commands,
    shared: Res<SharedShadyMaterial>,
    candidates: Query<Entity, (With<Mesh3d>, With<MeshMaterial3d<StandardMaterial>>)>,
    parents: Query<&ChildOf>,
    models: Query<(), With<ShadedModel>>,
) {
    for entity in &candidates {
        let in_model = parents
            .iter_ancestors(entity)
            .any(|ancestor| models.contains(ancestor));
        if !in_model {
            continue;
        }
        commands
            .entity(entity)
            .remove::<MeshMaterial3d<StandardMaterial>>()
            .insert(MeshMaterial3d(shared.0.clone()));
    }
}

/// Exit when a startup resource exists on disk but cannot be decoded
pub fn watch_startup_assets(
    asset_server: Res<AssetServer>,
    mut startup: ResMut<StartupAssets>,
    mut exit: MessageWriter<AppExit>,
) {
    if startup.is_settled() {
        return;
    }

    let failed = startup.settle(|handle| {
        AssetStatus::from_load_state(asset_server.get_load_state(handle.id()))
    });
    for (path, err) in &failed {
        error!("Failed to load {}: {}", path, err);
    }
    if !failed.is_empty() {
        exit.write(AppExit::error());
    }
}
