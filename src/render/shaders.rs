//! Shader slots with live reload
//!
//! The material pipeline references two fixed shader handles. The configured WGSL files are
//! loaded separately and copied into those slots once they load successfully, so a reload
//! that fails leaves the previous program in place. A reloaded program that loads but does
//! not compile is swapped back out for the one it replaced.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::asset::{AssetLoadFailedEvent, uuid_handle};
use bevy::prelude::*;
use bevy::render::render_resource::{CachedPipelineState, PipelineCache, PipelineDescriptor};

use crate::config::AppConfig;
use crate::lighting::LightingCommand;

pub const VERTEX_SHADER_SLOT: Handle<Shader> =
    uuid_handle!("5d1b7f0c-3a7e-4a41-9a52-2f0e6b8c1d01");
pub const FRAGMENT_SHADER_SLOT: Handle<Shader> =
    uuid_handle!("5d1b7f0c-3a7e-4a41-9a52-2f0e6b8c1d02");

/// One configured shader file and the slot it feeds
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub path: String,
    pub handle: Handle<Shader>,
    slot: AssetId<Shader>,
    active: bool,
    last_good: Option<Shader>,
}

impl ShaderSource {
    fn new(path: String, handle: Handle<Shader>, slot: &Handle<Shader>) -> Self {
        Self {
            path,
            handle,
            slot: slot.id(),
            active: false,
            last_good: None,
        }
    }

    /// Whether the slot has received this file at least once
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// What a failed shader load means for the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderFailure {
    /// The slot was never filled; nothing can be shaded
    Startup,
    /// The slot still holds the previous program
    Reload,
}

/// Handles of the shader files currently backing the slots
#[derive(Resource, Debug, Clone)]
pub struct ShaderLibrary {
    pub vertex: ShaderSource,
    pub fragment: ShaderSource,
}

impl ShaderLibrary {
    pub fn new(
        vertex_path: String,
        vertex: Handle<Shader>,
        fragment_path: String,
        fragment: Handle<Shader>,
    ) -> Self {
        Self {
            vertex: ShaderSource::new(vertex_path, vertex, &VERTEX_SHADER_SLOT),
            fragment: ShaderSource::new(fragment_path, fragment, &FRAGMENT_SHADER_SLOT),
        }
    }

    fn source(&self, id: AssetId<Shader>) -> Option<&ShaderSource> {
        [&self.vertex, &self.fragment]
            .into_iter()
            .find(|source| source.handle.id() == id)
    }

    fn source_mut(&mut self, id: AssetId<Shader>) -> Option<&mut ShaderSource> {
        [&mut self.vertex, &mut self.fragment]
            .into_iter()
            .find(|source| source.handle.id() == id)
    }

    /// Classify a load failure of `id`; `None` if it is not one of ours
    pub fn failure(&self, id: AssetId<Shader>) -> Option<ShaderFailure> {
        self.source(id).map(|source| {
            if source.active {
                ShaderFailure::Reload
            } else {
                ShaderFailure::Startup
            }
        })
    }
}

/// Set from the render world when a pipeline built from the slots fails to compile
#[derive(Resource, Debug, Clone, Default)]
pub struct ShaderPipelineFailures(Arc<AtomicBool>);

impl ShaderPipelineFailures {
    pub fn report(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

pub fn load_shaders(mut commands: Commands, config: Res<AppConfig>, asset_server: Res<AssetServer>) {
    let vertex_path = config.paths.vertex_shader.clone();
    let fragment_path = config.paths.fragment_shader.clone();
    commands.insert_resource(ShaderLibrary::new(
        vertex_path.clone(),
        asset_server.load(vertex_path),
        fragment_path.clone(),
        asset_server.load(fragment_path),
    ));
}

/// Re-read both shader files from disk on [`LightingCommand::ReloadShaders`]
pub fn reload_shaders(
    mut commands: MessageReader<LightingCommand>,
    library: Res<ShaderLibrary>,
    asset_server: Res<AssetServer>,
) {
    if !commands
        .read()
        .any(|command| *command == LightingCommand::ReloadShaders)
    {
        return;
    }
    info!(
        "Reloading shaders {} and {}",
        library.vertex.path, library.fragment.path
    );
    asset_server.reload(library.vertex.path.clone());
    asset_server.reload(library.fragment.path.clone());
}

/// Copy freshly loaded shader sources into the pipeline slots
pub fn sync_shader_slots(
    mut events: MessageReader<AssetEvent<Shader>>,
    mut library: ResMut<ShaderLibrary>,
    mut shaders: ResMut<Assets<Shader>>,
) {
    for event in events.read() {
        let id = match event {
            AssetEvent::LoadedWithDependencies { id } | AssetEvent::Modified { id } => *id,
            _ => continue,
        };
        let Some(source) = library.source_mut(id) else {
            continue;
        };
        let Some(shader) = shaders.get(id).cloned() else {
            continue;
        };
        let previous = shaders.get(source.slot).cloned();
        if let Err(err) = shaders.insert(source.slot, shader) {
            warn!("Could not activate shader {}: {}", source.path, err);
            continue;
        }
        source.active = true;
        source.last_good = previous;
        info!("Shader {} is active", source.path);
    }
}

/// Report shader load failures.
///
/// A file that never loaded leaves its slot empty, so that ends the app. A failed reload keeps
/// whatever program the slot held before.
pub fn report_shader_failures(
    mut failures: MessageReader<AssetLoadFailedEvent<Shader>>,
    library: Res<ShaderLibrary>,
    mut exit: MessageWriter<AppExit>,
) {
    for failure in failures.read() {
        match library.failure(failure.id) {
            Some(ShaderFailure::Startup) => {
                error!("Failed to load shader {}: {}", failure.path, failure.error);
                exit.write(AppExit::error());
            }
            Some(ShaderFailure::Reload) => warn!(
                "Failed to load shader {}: {}; keeping the previous program",
                failure.path, failure.error
            ),
            None => {}
        }
    }
}

/// Put the replaced programs back after a slot pipeline failed to compile
pub fn restore_last_good_shaders(
    failures: Res<ShaderPipelineFailures>,
    mut library: ResMut<ShaderLibrary>,
    mut shaders: ResMut<Assets<Shader>>,
) {
    if !failures.take() {
        return;
    }
    let library = &mut *library;
    for source in [&mut library.vertex, &mut library.fragment] {
        let Some(shader) = source.last_good.take() else {
            continue;
        };
        match shaders.insert(source.slot, shader) {
            Ok(_) => warn!(
                "Shader {} does not compile; restored the previous program",
                source.path
            ),
            Err(err) => warn!("Could not restore shader {}: {}", source.path, err),
        }
    }
}

fn uses_shader_slots(descriptor: &PipelineDescriptor) -> bool {
    let PipelineDescriptor::RenderPipelineDescriptor(descriptor) = descriptor else {
        return false;
    };
    descriptor.vertex.shader.id() == VERTEX_SHADER_SLOT.id()
        || descriptor
            .fragment
            .as_ref()
            .is_some_and(|fragment| fragment.shader.id() == FRAGMENT_SHADER_SLOT.id())
}

/// Render world: flag pipelines built from the slots that ended in an error
pub fn detect_failed_pipelines(
    cache: Option<Res<PipelineCache>>,
    failures: Res<ShaderPipelineFailures>,
) {
    let Some(cache) = cache else {
        return;
    };
    let failed = cache.pipelines().any(|pipeline| {
        matches!(pipeline.state, CachedPipelineState::Err(_))
            && uses_shader_slots(&pipeline.descriptor)
    });
    if failed {
        failures.report();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shader(path: &str) -> Shader {
        Shader::from_wgsl("@fragment fn main() {}", path.to_string())
    }

    fn slot_path(app: &App, slot: &Handle<Shader>) -> Option<String> {
        app.world()
            .resource::<Assets<Shader>>()
            .get(slot.id())
            .map(|shader| shader.path.clone())
    }

    fn shader_app() -> App {
        let mut app = App::new();
        app.init_resource::<Assets<Shader>>()
            .init_resource::<ShaderPipelineFailures>()
            .add_message::<AssetEvent<Shader>>()
            .add_systems(
                Update,
                (sync_shader_slots, restore_last_good_shaders).chain(),
            );

        let mut shaders = app.world_mut().resource_mut::<Assets<Shader>>();
        let vertex = shaders.add(shader("vert_a.wgsl"));
        let fragment = shaders.add(shader("frag_a.wgsl"));
        app.insert_resource(ShaderLibrary::new(
            "shaders/vert.wgsl".to_string(),
            vertex,
            "shaders/frag.wgsl".to_string(),
            fragment,
        ));
        app
    }

    fn vertex_id(app: &App) -> AssetId<Shader> {
        app.world().resource::<ShaderLibrary>().vertex.handle.id()
    }

    #[test]
    fn test_loaded_shader_fills_its_slot() {
        let mut app = shader_app();
        assert_eq!(slot_path(&app, &VERTEX_SHADER_SLOT), None);

        let id = vertex_id(&app);
        app.world_mut()
            .write_message(AssetEvent::LoadedWithDependencies { id });
        app.update();

        assert_eq!(
            slot_path(&app, &VERTEX_SHADER_SLOT).as_deref(),
            Some("vert_a.wgsl")
        );
        assert_eq!(slot_path(&app, &FRAGMENT_SHADER_SLOT), None);
        assert!(app.world().resource::<ShaderLibrary>().vertex.is_active());
    }

    #[test]
    fn test_failed_reload_keeps_previous_program() {
        let mut app = shader_app();
        let id = vertex_id(&app);
        app.world_mut()
            .write_message(AssetEvent::LoadedWithDependencies { id });
        app.update();

        // A failed load produces no loaded or modified event for the handle
        app.world_mut().write_message(AssetEvent::Unused { id });
        app.update();

        let library = app.world().resource::<ShaderLibrary>();
        assert_eq!(library.failure(id), Some(ShaderFailure::Reload));
        assert_eq!(
            slot_path(&app, &VERTEX_SHADER_SLOT).as_deref(),
            Some("vert_a.wgsl")
        );
    }

    #[test]
    fn test_first_load_failure_is_fatal() {
        let app = shader_app();
        let library = app.world().resource::<ShaderLibrary>();
        assert_eq!(
            library.failure(library.vertex.handle.id()),
            Some(ShaderFailure::Startup)
        );
        assert_eq!(
            library.failure(library.fragment.handle.id()),
            Some(ShaderFailure::Startup)
        );
        assert_eq!(library.failure(AssetId::default()), None);
    }

    #[test]
    fn test_reload_replaces_slot_contents() {
        let mut app = shader_app();
        let id = vertex_id(&app);
        app.world_mut()
            .write_message(AssetEvent::LoadedWithDependencies { id });
        app.update();

        let _ = app
            .world_mut()
            .resource_mut::<Assets<Shader>>()
            .insert(id, shader("vert_b.wgsl"));
        app.world_mut().write_message(AssetEvent::Modified { id });
        app.update();

        assert_eq!(
            slot_path(&app, &VERTEX_SHADER_SLOT).as_deref(),
            Some("vert_b.wgsl")
        );
    }

    #[test]
    fn test_pipeline_failure_restores_replaced_program() {
        let mut app = shader_app();
        let id = vertex_id(&app);
        app.world_mut()
            .write_message(AssetEvent::LoadedWithDependencies { id });
        app.update();

        let _ = app
            .world_mut()
            .resource_mut::<Assets<Shader>>()
            .insert(id, shader("vert_broken.wgsl"));
        app.world_mut().write_message(AssetEvent::Modified { id });
        app.update();
        assert_eq!(
            slot_path(&app, &VERTEX_SHADER_SLOT).as_deref(),
            Some("vert_broken.wgsl")
        );

        app.world().resource::<ShaderPipelineFailures>().report();
        app.update();
        assert_eq!(
            slot_path(&app, &VERTEX_SHADER_SLOT).as_deref(),
            Some("vert_a.wgsl")
        );
        // The flag is consumed and nothing else is restored
        app.update();
        assert_eq!(
            slot_path(&app, &VERTEX_SHADER_SLOT).as_deref(),
            Some("vert_a.wgsl")
        );
        assert!(!app.world().resource::<ShaderPipelineFailures>().take());
    }
}
