use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::explore::Direction;
use crate::layout::LayoutConfig;
use crate::network::{LoadOptions, RoleRule};
use crate::refine::RefineOptions;
use crate::session::SessionError;
use crate::view::ViewStyle;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config {}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: SessionError,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplorerDefaults {
    pub max_depth: u32,
    pub direction: Direction,
}

impl Default for ExplorerDefaults {
    fn default() -> Self {
        Self {
            max_depth: 2,
            direction: Direction::Both,
        }
    }
}

/// Everything a session is built from. Every section may be omitted from the
/// file and falls back to its defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub roles: RoleRule,
    pub layout: LayoutConfig,
    pub style: ViewStyle,
    pub explorer: ExplorerDefaults,
    pub refine: RefineOptions,
    pub load: LoadOptions,
}

impl SessionConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        self.layout.validate()?;
        self.refine.validate()?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate().map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "loaded session config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::layout::OffsetPolicy;
    use crate::network::IntegrityPolicy;
    use crate::view::NodeColoring;

    #[test]
    fn empty_object_is_all_defaults() {
        assert_eq!(SessionConfig::from_json("{}").unwrap(), SessionConfig::default());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = SessionConfig::from_json(
            r#"{
                "roles": { "input_prefix": "sensor-" },
                "layout": { "fanout": 4, "offset_policy": "monotonic" },
                "style": { "node_coloring": "polarity", "edge_curve": "curvedArrow" },
                "explorer": { "max_depth": 5, "direction": "forward" },
                "refine": { "worker": true },
                "load": { "integrity": "prune" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.roles.input_prefix, "sensor-");
        assert_eq!(config.layout.fanout, 4.0);
        assert_eq!(config.layout.wrap_width, LayoutConfig::default().wrap_width);
        assert_eq!(config.layout.offset_policy, OffsetPolicy::Monotonic);
        assert_eq!(config.style.node_coloring, NodeColoring::Polarity);
        assert!(config.style.edge_curve.is_some());
        assert_eq!(config.explorer.max_depth, 5);
        assert_eq!(config.explorer.direction, Direction::Forward);
        assert!(config.refine.worker);
        assert_eq!(config.refine.gravity, RefineOptions::default().gravity);
        assert_eq!(config.load.integrity, IntegrityPolicy::Prune);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(SessionConfig::from_json(r#"{ "colour": "red" }"#).is_err());
        assert!(SessionConfig::from_json(r#"{ "explorer": { "depth": 3 } }"#).is_err());
    }

    #[test]
    fn load_reports_io_and_parse_failures() {
        let missing = SessionConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let broken = SessionConfig::load(file.path()).unwrap_err();
        assert!(matches!(broken, ConfigError::Parse { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "layout": {{ "fanout": 0 }} }}"#).unwrap();
        let invalid = SessionConfig::load(file.path()).unwrap_err();
        assert!(
            matches!(
                invalid,
                ConfigError::Invalid {
                    source: SessionError::Layout(_),
                    ..
                }
            ),
            "{invalid:?}"
        );
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "explorer": {{ "max_depth": 7 }} }}"#).unwrap();
        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.explorer.max_depth, 7);
    }
}
