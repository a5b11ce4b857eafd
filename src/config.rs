//! Server configuration

use crate::error::Result;
use crate::overlay::{BoundaryPolicy, ParameterSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an optional JSON configuration file
pub const CONFIG_ENV: &str = "PDF_SHADE_CONFIG";

/// Resource limits and overlay defaults for the PDF shade server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Maximum number of tabs kept in the session store (default: 256)
    pub max_tabs: usize,
    /// How side-boundary changes derive the pdf width (default: recompute)
    pub boundary_policy: BoundaryPolicy,
    /// Parameters a newly recognized PDF tab starts with. Keys left out of
    /// the file keep their built-in values.
    #[serde(deserialize_with = "merge_with_defaults")]
    pub defaults: ParameterSet,
    /// Maximum pixel count of a page bitmap for previews (default: 40_000_000)
    pub max_preview_pixels: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_tabs: 256,
            boundary_policy: BoundaryPolicy::default(),
            defaults: ParameterSet::default(),
            max_preview_pixels: 40_000_000,
        }
    }
}

/// Lay a possibly partial parameter object over the built-in defaults
fn merge_with_defaults<'de, D>(deserializer: D) -> std::result::Result<ParameterSet, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let partial = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
    let mut merged = match serde_json::to_value(ParameterSet::default()) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    merged.extend(partial);
    serde_json::from_value(serde_json::Value::Object(merged)).map_err(serde::de::Error::custom)
}

impl ServerConfig {
    /// Load a configuration file; absent keys keep their defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Configuration named by `PDF_SHADE_CONFIG`, or the defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                tracing::info!(path = %Path::new(&path).display(), "loading configuration");
                Self::load_from_path(Path::new(&path))
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::overlay::ToggleState;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.max_tabs, 256);
        assert_eq!(config.boundary_policy, BoundaryPolicy::Recompute);
        assert_eq!(config.defaults, ParameterSet::default());
        assert_eq!(config.max_preview_pixels, 40_000_000);
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"max_tabs": 8, "boundary_policy": "rendered_sibling"}}"#
        )
        .unwrap();

        let config = ServerConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.max_tabs, 8);
        assert_eq!(config.boundary_policy, BoundaryPolicy::RenderedSibling);
        assert_eq!(config.defaults, ParameterSet::default());
    }

    #[test]
    fn test_load_custom_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"defaults": {{
                "header_color": 20, "header_contrast": 60,
                "pdf_color": 240, "pdf_contrast": 90,
                "side_color": 20, "side_contrast": 60,
                "top_boundary": "5%", "left_boundary": "20%", "right_boundary": "80%"
            }}}}"#
        )
        .unwrap();

        let config = ServerConfig::load_from_path(file.path()).unwrap();
        let expected = ParameterSet {
            toggle: ToggleState::On,
            header_color: 20,
            header_contrast: 60,
            pdf_color: 240,
            pdf_contrast: 90,
            side_color: 20,
            side_contrast: 60,
            top_boundary: 5.0,
            left_boundary: 20.0,
            right_boundary: 80.0,
        };
        assert_eq!(config.defaults, expected);
    }

    #[test]
    fn test_load_partial_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"defaults": {{"pdf_color": 230, "left_boundary": "20%"}}}}"#
        )
        .unwrap();

        let config = ServerConfig::load_from_path(file.path()).unwrap();
        let expected = ParameterSet {
            pdf_color: 230,
            left_boundary: 20.0,
            ..ParameterSet::default()
        };
        assert_eq!(config.defaults, expected);
    }

    #[test]
    fn test_load_invalid_default_value() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"defaults": {{"pdf_color": "bright"}}}}"#).unwrap();
        let result = ServerConfig::load_from_path(file.path());
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ServerConfig::load_from_path(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ max_tabs: ").unwrap();
        let result = ServerConfig::load_from_path(file.path());
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
