//! Application configuration
//!
//! Resource paths, window settings, material preset and turntable camera settings. Loaded once
//! at startup and inserted as an immutable resource.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::lighting::MaterialPreset;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "SHADYBUNNIES_CONFIG";

/// The five files loaded at startup, relative to the asset root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourcePaths {
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub model: String,
    pub diffuse_ramp: String,
    pub specular_ramp: String,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            vertex_shader: "shaders/vert.wgsl".to_string(),
            fragment_shader: "shaders/frag.wgsl".to_string(),
            model: "models/torus.gltf".to_string(),
            diffuse_ramp: "textures/lighting_toon.png".to_string(),
            specular_ramp: "textures/lighting_normal.png".to_string(),
        }
    }
}

impl ResourcePaths {
    fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("vertex shader", &self.vertex_shader),
            ("fragment shader", &self.fragment_shader),
            ("model", &self.model),
            ("diffuse ramp", &self.diffuse_ramp),
            ("specular ramp", &self.specular_ramp),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Shady Bunnies".to_string(),
            width: 1024,
            height: 768,
            resizable: true,
        }
    }
}

/// Turntable camera: distance from the centre and initial angles in radians
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TurntableConfig {
    pub distance: f32,
    pub around: f32,
    pub up: f32,
    /// Orbit centre; also the anchor of the light vector
    pub center: [f32; 3],
}

impl Default for TurntableConfig {
    fn default() -> Self {
        Self {
            distance: 2.0,
            around: 0.3,
            up: 0.5,
            center: [-0.3, 0.8, 0.0],
        }
    }
}

impl TurntableConfig {
    pub fn center(&self) -> Vec3 {
        Vec3::from_array(self.center)
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Asset directory; relative paths are resolved like Bevy's file asset reader does
    pub asset_dir: PathBuf,
    pub paths: ResourcePaths,
    pub window: WindowConfig,
    pub material: MaterialPreset,
    pub turntable: TurntableConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            paths: ResourcePaths::default(),
            window: WindowConfig::default(),
            material: MaterialPreset::default(),
            turntable: TurntableConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the configuration for this run.
    ///
    /// Looks at `SHADYBUNNIES_CONFIG` first, then `config.json` in the platform config
    /// directory:
    /// - macOS: ~/Library/Application Support/shadybunnies/
    /// - Linux: ~/.config/shadybunnies/
    /// - Windows: %APPDATA%\shadybunnies\config\
    ///
    /// Falls back to the defaults when neither exists.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        if let Some(proj_dirs) = ProjectDirs::from("", "", "shadybunnies") {
            let path = proj_dirs.config_dir().join("config.json");
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Absolute asset root: `BEVY_ASSET_ROOT`, else `CARGO_MANIFEST_DIR`, else the executable's
    /// directory, joined with `asset_dir`
    pub fn asset_root(&self) -> PathBuf {
        if self.asset_dir.is_absolute() {
            return self.asset_dir.clone();
        }
        let base = env::var_os("BEVY_ASSET_ROOT")
            .or_else(|| env::var_os("CARGO_MANIFEST_DIR"))
            .map(PathBuf::from)
            .or_else(|| {
                env::current_exe()
                    .ok()
                    .and_then(|exe| exe.parent().map(Path::to_path_buf))
            })
            .unwrap_or_default();
        base.join(&self.asset_dir)
    }

    /// Check that every startup resource exists under `root`
    pub fn validate_in(&self, root: &Path) -> anyhow::Result<()> {
        for (kind, relative) in self.paths.entries() {
            let path = root.join(relative);
            if !path.is_file() {
                anyhow::bail!("missing {} file: {}", kind, path.display());
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_in(&self.asset_root())
    }
}
