//! Runtime configuration.
//!
//! The configuration is a JSON file looked up in the working directory first and in the
//! user's config directory second. Every field has a default, so a partial file is fine
//! and a missing file means "all defaults".

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    abs::{DepthFunc, Face},
    error::ConfigError,
};

pub const CONFIG_FILE_NAME: &str = "glab.json";

/// Graphics API the GUI harness renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicsFramework {
    #[default]
    OpenGl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "glab".to_string(),
            width: 1200,
            height: 900,
            fullscreen: false,
            vsync: true,
        }
    }
}

impl WindowConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub framework: GraphicsFramework,
    pub gl_major: u8,
    pub gl_minor: u8,
    pub depth_test: bool,
    pub depth_func: DepthFunc,
    pub cull_face: bool,
    pub cull_face_mode: Face,
    /// Log vendor, renderer and version strings at startup.
    pub log_driver_info: bool,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            framework: GraphicsFramework::OpenGl,
            gl_major: 3,
            gl_minor: 3,
            depth_test: true,
            depth_func: DepthFunc::Less,
            cull_face: true,
            cull_face_mode: Face::Back,
            log_driver_info: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlabConfig {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    /// Root directory of shaders and images.
    pub assets_dir: PathBuf,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Default for GlabConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            graphics: GraphicsConfig::default(),
            assets_dir: PathBuf::from("assets"),
            log_level: "info".to_string(),
        }
    }
}

impl GlabConfig {
    /// Places a config file may live in, most specific first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("glab").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Loads the first config file found, or the defaults when there is none.
    pub fn load() -> Result<(Self, Option<PathBuf>), ConfigError> {
        match Self::search_paths().into_iter().find(|path| path.is_file()) {
            Some(path) => Ok((Self::load_from(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The configured log level, falling back to `info` for unknown names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Resolves a path relative to the assets directory.
    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.assets_dir.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("glab-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_file(
            "partial.json",
            r#"{ "window": { "title": "sandbox", "width": 800 }, "log_level": "debug" }"#,
        );
        let config = GlabConfig::load_from(&path).unwrap();
        assert_eq!(config.window.title, "sandbox");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 900);
        assert_eq!(config.graphics, GraphicsConfig::default());
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_graphics_section() {
        let path = temp_file(
            "graphics.json",
            r#"{ "graphics": { "framework": "opengl", "cull_face": false, "depth_func": "less_equal" } }"#,
        );
        let config = GlabConfig::load_from(&path).unwrap();
        assert_eq!(config.graphics.framework, GraphicsFramework::OpenGl);
        assert!(!config.graphics.cull_face);
        assert_eq!(config.graphics.depth_func, DepthFunc::LessEqual);
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let path = temp_file("broken.json", "{ \"window\": ");
        let err = GlabConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: p, .. } if p == path));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = GlabConfig::load_from(Path::new("/nonexistent/glab.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let config = GlabConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
        assert_eq!(
            config.asset("shaders/phong/vert.glsl"),
            PathBuf::from("assets/shaders/phong/vert.glsl")
        );
    }
}
