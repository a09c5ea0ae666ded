use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::Tolerance;
use crate::error::ConfigError;
use crate::mapper::Rotation;

/// How pointer input on a page is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorMode {
    #[default]
    TextSelection,
    /// Pointer events are left to the host for panning.
    Pan,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    pub factor: f64,
}

impl ZoomConfig {
    /// Limits usable for clamping: finite, `0 < min <= max`, and a positive
    /// step factor.
    pub fn validate(&self) -> Result<(), String> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(format!(
                "zoom limits must be finite (min = {}, max = {})",
                self.min, self.max
            ));
        }
        if self.min <= 0.0 || self.min > self.max {
            return Err(format!(
                "zoom limits must satisfy 0 < min <= max (min = {}, max = {})",
                self.min, self.max
            ));
        }
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(format!(
                "zoom factor must be finite and positive (factor = {})",
                self.factor
            ));
        }
        Ok(())
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 5.0,
            factor: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub cursor_mode: CursorMode,
    pub follow_links: bool,
    pub tolerance: Tolerance,
    /// Pixels the pointer must travel with the button held on an existing
    /// selection before a drag starts.
    pub drag_threshold: f32,
    pub rotation: Rotation,
    pub zoom: ZoomConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            cursor_mode: CursorMode::TextSelection,
            follow_links: true,
            tolerance: Tolerance::default(),
            drag_threshold: 0.0,
            rotation: Rotation::None,
            zoom: ZoomConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .zoom
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                path: path.to_path_buf(),
                reason,
            })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = ViewerConfig::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "cursor_mode = \"pan\"\nrotation = \"rotate90\"\n\n[tolerance]\nx = 2.0\ny = 6.0\n\n[zoom]\nmax = 8.0\n",
        )
        .unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config.cursor_mode, CursorMode::Pan);
        assert_eq!(config.rotation, Rotation::Rotate90);
        assert_eq!(config.tolerance, Tolerance { x: 2.0, y: 6.0 });
        assert_eq!(config.zoom.max, 8.0);
        assert_eq!(config.zoom.min, 0.1);
        assert!(config.follow_links);
    }

    #[test]
    fn inverted_zoom_limits_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[zoom]\nmin = 5.0\nmax = 0.5\n").unwrap();

        let err = ViewerConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("min <= max"));
    }

    #[test]
    fn nan_zoom_limits_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        for body in ["[zoom]\nmin = nan\n", "[zoom]\nmax = inf\n", "[zoom]\nfactor = nan\n"] {
            fs::write(&path, body).unwrap();
            let err = ViewerConfig::load(&path).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{body}: {err}");
        }
    }

    #[test]
    fn non_positive_zoom_values_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        for body in ["[zoom]\nmin = 0.0\n", "[zoom]\nfactor = -1.2\n"] {
            fs::write(&path, body).unwrap();
            let err = ViewerConfig::load(&path).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{body}: {err}");
        }
    }

    #[test]
    fn equal_zoom_limits_are_accepted() {
        let zoom = ZoomConfig {
            min: 2.0,
            max: 2.0,
            ..ZoomConfig::default()
        };
        assert_eq!(zoom.validate(), Ok(()));
        assert!(ZoomConfig::default().validate().is_ok());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "follow_links = \"sometimes\"").unwrap();

        let err = ViewerConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
