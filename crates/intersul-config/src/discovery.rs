//! Finding and layering config files.
//!
//! A layer that exists but fails to parse is skipped with a warning rather
//! than failing the load; the `--server` flag is applied by the caller.

use std::path::{Path, PathBuf};

use crate::{ConfigError, ConsoleConfig, Result};

const PROJECT_CONFIG_FILE: &str = "intersul.toml";
const USER_CONFIG_FILE: &str = "config.toml";
const APP_NAME: &str = "intersul";

/// Overrides the user config directory (and with it the log directory).
const CONFIG_DIR_ENV: &str = "INTERSUL_CONFIG_DIR";

/// Which file layer a [`ConfigSource`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    User,
    Project,
}

/// One file layer that discovery looked at.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub layer: Layer,
    pub path: PathBuf,
    /// False when the file was absent or could not be used.
    pub loaded: bool,
}

/// The merged, validated configuration and how it was assembled.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ConsoleConfig,
    /// Layers in merge order, user first.
    pub sources: Vec<ConfigSource>,
    /// One line per layer that existed but was skipped.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }

    fn merge_layer(&mut self, layer: Layer, path: PathBuf) -> ConfigSource {
        let loaded = path.is_file()
            && match load_config_file(&path) {
                Ok(file) => {
                    self.config.merge(file);
                    true
                }
                Err(e) => {
                    self.warnings
                        .push(format!("Skipping {}: {}", path.display(), e));
                    false
                }
            };
        ConfigSource {
            layer,
            path,
            loaded,
        }
    }
}

/// Defaults, then the user file, then `./intersul.toml` (or the one in
/// `project_dir`), then `INTERSUL_*` variables; validated at the end.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// [`load_config`] with the user config directory pinned to `config_dir`.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let user = config_dir
        .map(|dir| dir.join(USER_CONFIG_FILE))
        .or_else(xdg_config_path);
    let project = project_dir.unwrap_or(Path::new(".")).join(PROJECT_CONFIG_FILE);

    let layers = user
        .map(|path| (Layer::User, path))
        .into_iter()
        .chain([(Layer::Project, project)]);

    let mut loaded = LoadedConfig {
        config: ConsoleConfig::new(),
        sources: Vec::new(),
        warnings: Vec::new(),
    };
    for (layer, path) in layers {
        let source = loaded.merge_layer(layer, path);
        loaded.sources.push(source);
    }

    loaded.config.apply_env()?;
    loaded.config.validate()?;
    Ok(loaded)
}

/// Parse one config file with no layering.
pub fn load_config_file(path: &Path) -> Result<ConsoleConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    ConsoleConfig::from_toml(&contents)
}

/// `<config dir>/config.toml`.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// `INTERSUL_CONFIG_DIR` when set and non-empty, else the platform config
/// directory joined with `intersul`.
pub fn xdg_config_dir() -> Option<PathBuf> {
    std::env::var(CONFIG_DIR_ENV)
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join(APP_NAME)))
}
