//! Panel configuration, read from a TOML file.
//!
//! Every field is optional; a missing file section falls back to
//! [`PanelConfig::default`].
//!
//! ```toml
//! show_advanced = true
//! backend = "network-manager"
//! settings_dir = "/data/params/d"
//! scan_interval_secs = 5
//! log_level = 1
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_SETTINGS_DIR: &str = "/data/params/d";

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    #[default]
    NetworkManager,
    Mock,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// Whether the Advanced screen can be opened at all.
    pub show_advanced: bool,
    pub backend: BackendKind,
    pub settings_dir: PathBuf,
    pub scan_interval_secs: u64,
    /// Default verbosity, same scale as repeated `-v`.
    pub log_level: u8,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            show_advanced: true,
            backend: BackendKind::default(),
            settings_dir: PathBuf::from(DEFAULT_SETTINGS_DIR),
            scan_interval_secs: 5,
            log_level: 0,
        }
    }
}

impl PanelConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.scan_interval_secs == 0 {
            errors.push("scan_interval_secs must be at least 1".to_string());
        }
        if self.settings_dir.as_os_str().is_empty() {
            errors.push("settings_dir must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigValidation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        let config = PanelConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.show_advanced);
        assert_eq!(config.backend, BackendKind::NetworkManager);
        assert_eq!(config.settings_dir, PathBuf::from(DEFAULT_SETTINGS_DIR));
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(PanelConfig::parse("").unwrap(), PanelConfig::default());
    }

    #[test]
    fn parse_overrides() {
        let config = PanelConfig::parse(
            r#"
            show_advanced = false
            backend = "mock"
            settings_dir = "/tmp/params"
            scan_interval_secs = 10
            "#,
        )
        .unwrap();

        assert!(!config.show_advanced);
        assert_eq!(config.backend, BackendKind::Mock);
        assert_eq!(config.settings_dir, PathBuf::from("/tmp/params"));
        assert_eq!(config.scan_interval_secs, 10);
        assert_eq!(config.log_level, 0);
    }

    #[test]
    fn zero_scan_interval_is_rejected() {
        let err = PanelConfig::parse("scan_interval_secs = 0").unwrap_err();
        match err {
            Error::ConfigValidation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("scan_interval_secs"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        assert!(matches!(
            PanelConfig::parse("backend = \"wicd\""),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend = \"mock\"\nlog_level = 2").unwrap();

        let config = PanelConfig::load(file.path()).unwrap();
        assert_eq!(config.backend, BackendKind::Mock);
        assert_eq!(config.log_level, 2);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netpanel.toml");
        assert!(matches!(
            PanelConfig::load(&path),
            Err(Error::ConfigNotFound(p)) if p == path
        ));
    }
}
