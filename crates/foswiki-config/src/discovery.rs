//! Where configuration lives and how its layers combine.
//!
//! Two layers are read, the later overriding the earlier section by section
//! and preference by preference:
//! 1. `config.toml` in the user config directory (`$FOSWIKI_CONFIG_DIR`,
//!    else `<platform config dir>/foswiki`)
//! 2. `foswiki.toml` in the project directory
//!
//! Command-line flags are applied on top by the caller.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{ConfigError, FoswikiConfig, Result};

/// File name of the project layer.
pub const PROJECT_CONFIG_FILE: &str = "foswiki.toml";

/// File name of the user layer inside the user config directory.
pub const USER_CONFIG_FILE: &str = "config.toml";

/// Environment variable naming the user config directory.
pub const CONFIG_DIR_ENV: &str = "FOSWIKI_CONFIG_DIR";

const APP_NAME: &str = "foswiki";

/// A configuration layer, in precedence order (lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    User,
    Project,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Layer::User => "user",
            Layer::Project => "project",
        })
    }
}

/// One layer that was looked for.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub layer: Layer,
    pub path: PathBuf,
    /// Whether the file existed and was merged.
    pub loaded: bool,
}

/// The merged configuration and what went into it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: FoswikiConfig,
    /// Every layer looked for, lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// Layers that existed but could not be used.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Paths of the layers that were merged.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter_map(|s| s.loaded.then_some(s.path.as_path()))
            .collect()
    }
}

/// Locations of both layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    user: Option<PathBuf>,
    project: PathBuf,
}

impl ConfigPaths {
    /// Resolve layer paths.
    ///
    /// `project_dir` defaults to the working directory; `config_dir` takes
    /// precedence over `FOSWIKI_CONFIG_DIR` and the platform default.
    pub fn discover(project_dir: Option<&Path>, config_dir: Option<&Path>) -> Self {
        let user = config_dir.map(Path::to_path_buf).or_else(user_config_dir);
        Self {
            user: user.map(|dir| dir.join(USER_CONFIG_FILE)),
            project: project_dir.unwrap_or(Path::new("")).join(PROJECT_CONFIG_FILE),
        }
    }

    /// Path of `layer`; the user layer is unknown without a config directory.
    pub fn path(&self, layer: Layer) -> Option<&Path> {
        match layer {
            Layer::User => self.user.as_deref(),
            Layer::Project => Some(&self.project),
        }
    }

    /// Read and merge every layer. Missing files are skipped silently,
    /// unusable ones with a warning.
    pub fn load(&self) -> LoadedConfig {
        let mut loaded = LoadedConfig {
            config: FoswikiConfig::new(),
            sources: Vec::new(),
            warnings: Vec::new(),
        };

        for layer in [Layer::User, Layer::Project] {
            let Some(path) = self.path(layer) else {
                continue;
            };
            let merged = match read_layer(path) {
                Ok(Some(config)) => {
                    loaded.config.merge(config);
                    true
                }
                Ok(None) => false,
                Err(e) => {
                    loaded
                        .warnings
                        .push(format!("ignoring {} config {}: {}", layer, path.display(), e));
                    false
                }
            };
            loaded.sources.push(ConfigSource {
                layer,
                path: path.to_path_buf(),
                loaded: merged,
            });
        }

        loaded
    }
}

fn read_layer(path: &Path) -> Result<Option<FoswikiConfig>> {
    if path.is_file() {
        load_config_file(path).map(Some)
    } else {
        Ok(None)
    }
}

/// Discover and merge configuration for `project_dir`.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Like [`load_config`], with an explicit user config directory.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    Ok(ConfigPaths::discover(project_dir, config_dir).load())
}

/// Parse a single config file.
pub fn load_config_file(path: &Path) -> Result<FoswikiConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    FoswikiConfig::from_toml(&text)
}

/// Write `config` to `path`, creating missing parent directories.
pub fn save_config(config: &FoswikiConfig, path: &Path) -> Result<()> {
    let write_err = |p: &Path| {
        let path = p.display().to_string();
        move |source: std::io::Error| ConfigError::WriteFile { path, source }
    };

    let text = config.to_toml()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err(parent))?;
    }
    std::fs::write(path, text).map_err(write_err(path))
}

/// The user config directory.
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join(APP_NAME)),
    }
}

/// The user layer's file.
pub fn user_config_path() -> Option<PathBuf> {
    ConfigPaths::discover(None, None)
        .path(Layer::User)
        .map(Path::to_path_buf)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) {
        fs::write(dir.path().join(name), text).unwrap();
    }

    #[test]
    fn test_discover_paths() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let paths = ConfigPaths::discover(Some(project.path()), Some(user.path()));

        assert_eq!(
            paths.path(Layer::User),
            Some(user.path().join("config.toml").as_path())
        );
        assert_eq!(
            paths.path(Layer::Project),
            Some(project.path().join("foswiki.toml").as_path())
        );
    }

    #[test]
    fn test_project_defaults_to_working_directory() {
        let user = TempDir::new().unwrap();
        let paths = ConfigPaths::discover(None, Some(user.path()));
        assert_eq!(paths.path(Layer::Project), Some(Path::new("foswiki.toml")));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_config_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "config.toml", "this is not valid toml {{{{");

        let err = load_config_file(&dir.path().join("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_no_layers_present() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let loaded = load_config_with_options(Some(project.path()), Some(user.path())).unwrap();

        assert_eq!(loaded.config, FoswikiConfig::default());
        assert!(loaded.loaded_from().is_empty());
        let layers: Vec<Layer> = loaded.sources.iter().map(|s| s.layer).collect();
        assert_eq!(layers, vec![Layer::User, Layer::Project]);
    }

    #[test]
    fn test_project_layer_overrides_user_layer() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        write(
            &user,
            "config.toml",
            r#"
[server]
base_url = "https://wiki.example.org"

[preferences]
SYSTEMWEB = "System"
SKIN = "pattern"
"#,
        );
        write(
            &project,
            "foswiki.toml",
            r#"
[session]
page = "/bin/view/Sandbox/WebHome"

[preferences]
SKIN = "natedit"
"#,
        );

        let loaded = load_config_with_options(Some(project.path()), Some(user.path())).unwrap();
        let config = &loaded.config;

        assert_eq!(config.server().base_url, "https://wiki.example.org");
        assert_eq!(config.page(), Some("/bin/view/Sandbox/WebHome"));
        assert_eq!(config.preferences.get("SKIN").map(String::as_str), Some("natedit"));
        assert_eq!(config.preferences.get("SYSTEMWEB").map(String::as_str), Some("System"));
        assert_eq!(loaded.loaded_from().len(), 2);
    }

    #[test]
    fn test_malformed_layer_warns_and_is_skipped() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        write(&user, "config.toml", "[preferences]\nSKIN = \"pattern\"\n");
        write(&project, "foswiki.toml", "[server\n");

        let loaded = load_config_with_options(Some(project.path()), Some(user.path())).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].starts_with("ignoring project config"));
        assert_eq!(
            loaded.loaded_from(),
            vec![user.path().join("config.toml").as_path()]
        );
        assert_eq!(loaded.config.preferences.len(), 1);
    }

    #[test]
    fn test_save_creates_parents_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = FoswikiConfig::starter();
        config.preferences.insert("SCRIPTURLPATH".into(), "/bin".into());
        save_config(&config, &path).unwrap();

        assert_eq!(load_config_file(&path).unwrap(), config);
    }
}
