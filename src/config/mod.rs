//! Editor settings and their JSON persistence.
//!
//! The session only ever receives an [`EditorConfiguration`] value. Reading and writing
//! it is the job of a [`ConfigStore`], which callers drive explicitly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ops::TextBoxStyle;

const APP_DIR: &str = "timetable-editor";
const APP_CONFIG_FILE: &str = "editor.json";

pub const MIN_BRUSH_RADIUS: u32 = 5;
pub const MAX_BRUSH_RADIUS: u32 = 100;
const DEFAULT_BRUSH_RADIUS: u32 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read editor config: {path}")]
    ReadConfig { path: PathBuf, source: io::Error },
    #[error("failed to write editor config: {path}")]
    WriteConfig { path: PathBuf, source: io::Error },
    #[error("failed to parse editor config")]
    ParseConfig(#[from] serde_json::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Per-feature switches. A disabled tool is neither listed nor reachable by shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    pub remove_text: bool,
    pub remove_color: bool,
    pub word_box: bool,
    pub word_box_simplified: bool,
    pub eraser: bool,
    pub zoom: bool,
    pub undo_redo: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            remove_text: true,
            remove_color: true,
            word_box: true,
            word_box_simplified: false,
            eraser: true,
            zoom: true,
            undo_redo: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfiguration {
    pub features: FeatureFlags,
    pub auto_rotate_enabled: bool,
    pub brush_radius: u32,
    pub text_box: TextBoxStyle,
}

impl Default for EditorConfiguration {
    fn default() -> Self {
        Self {
            features: FeatureFlags::default(),
            auto_rotate_enabled: true,
            brush_radius: DEFAULT_BRUSH_RADIUS,
            text_box: TextBoxStyle::default(),
        }
    }
}

impl EditorConfiguration {
    pub fn sanitized(mut self) -> Self {
        self.brush_radius = clamp_brush_radius(self.brush_radius);
        self.text_box = self.text_box.sanitized();
        self
    }
}

pub fn clamp_brush_radius(radius: u32) -> u32 {
    radius.clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS)
}

/// Loads and saves configuration on behalf of the host application.
pub trait ConfigStore {
    fn load(&self) -> ConfigResult<EditorConfiguration>;
    fn save(&self, config: &EditorConfiguration) -> ConfigResult<()>;
}

#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_default_path() -> ConfigResult<Self> {
        let (xdg_config_home, home) = config_env_dirs();
        let path = app_config_path(
            APP_DIR,
            APP_CONFIG_FILE,
            xdg_config_home.as_deref(),
            home.as_deref(),
        )?;
        Ok(Self::with_path(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like [`ConfigStore::load`] but never fails: problems are logged and defaults returned.
    pub fn load_or_default(&self) -> EditorConfiguration {
        self.load().unwrap_or_else(|err| {
            tracing::warn!(?err, path = ?self.path, "failed to load editor config; using defaults");
            EditorConfiguration::default()
        })
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> ConfigResult<EditorConfiguration> {
        if !self.path.exists() {
            return Ok(EditorConfiguration::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| ConfigError::ReadConfig {
            path: self.path.clone(),
            source,
        })?;
        let config: EditorConfiguration = serde_json::from_str(&contents)?;
        tracing::debug!(path = ?self.path, "loaded editor config");
        Ok(config.sanitized())
    }

    fn save(&self, config: &EditorConfiguration) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::WriteConfig {
                path: self.path.clone(),
                source,
            })?;
        }
        let contents = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, contents).map_err(|source| ConfigError::WriteConfig {
            path: self.path.clone(),
            source,
        })
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> ConfigResult<PathBuf> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
