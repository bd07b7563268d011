//! Configuration file management for livecard.
//!
//! Provides a TOML config file at `~/.config/livecard/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use livecard_core::{CapabilityConfig, HostVersion};

/// Env var overriding the simulated host version.
pub const HOST_VERSION_ENV: &str = "LIVECARD_HOST_VERSION";
/// Env var overriding the simulated host platform.
pub const HOST_PLATFORM_ENV: &str = "LIVECARD_HOST_PLATFORM";

/// Host version assumed when nothing else is configured.
pub const DEFAULT_HOST_VERSION: HostVersion = HostVersion::new(17, 0);

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub host: HostSection,
    #[serde(default)]
    pub capability: CapabilityConfig,
}

/// The host the simulated bridge pretends to run on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSection {
    pub platform: String,
    pub version: HostVersion,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            host: HostSection {
                platform: CapabilityConfig::DEFAULT_PLATFORM.to_string(),
                version: DEFAULT_HOST_VERSION,
            },
            capability: CapabilityConfig::default(),
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the livecard config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/livecard` or `~/.config/livecard`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("livecard");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("livecard")
}

/// Return the path to the livecard config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse a config file. Returns an error if it does not exist.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write a config file, creating parent dirs as needed.
pub fn save_config(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(())
}

/// Write a default config file at `path`, refusing to clobber one unless
/// `force` is set.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "config file already exists at {}; pass --force to overwrite",
            path.display()
        );
    }
    save_config(path, &ConfigFile::default())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides<'a> {
    pub host_version: Option<&'a str>,
    pub host_platform: Option<&'a str>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq)]
pub struct LivecardConfig {
    pub host_platform: String,
    pub host_version: HostVersion,
    pub capability: CapabilityConfig,
}

impl LivecardConfig {
    /// Resolve from the default config path and the process environment.
    pub fn resolve(overrides: Overrides<'_>) -> Result<Self> {
        let path = config_path();
        let file = if path.exists() {
            Some(load_config(&path)?)
        } else {
            None
        };
        Self::resolve_with(overrides, |key| std::env::var(key).ok(), file)
    }

    /// Resolve using the chain: CLI flag > env var > config file > default.
    pub fn resolve_with(
        overrides: Overrides<'_>,
        env: impl Fn(&str) -> Option<String>,
        file: Option<ConfigFile>,
    ) -> Result<Self> {
        let file = file.unwrap_or_default();

        let host_version = match overrides.host_version.map(str::to_string) {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid --host-version {v:?}"))?,
            None => match env(HOST_VERSION_ENV) {
                Some(v) => v
                    .parse()
                    .with_context(|| format!("{HOST_VERSION_ENV} is not a valid version"))?,
                None => file.host.version,
            },
        };

        let host_platform = overrides
            .host_platform
            .map(str::to_string)
            .or_else(|| env(HOST_PLATFORM_ENV))
            .unwrap_or(file.host.platform);

        Ok(Self {
            host_platform,
            host_version,
            capability: file.capability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_file_or_env() {
        let cfg = LivecardConfig::resolve_with(Overrides::default(), no_env, None).unwrap();
        assert_eq!(cfg.host_platform, "ios");
        assert_eq!(cfg.host_version, DEFAULT_HOST_VERSION);
        assert_eq!(cfg.capability, CapabilityConfig::default());
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let mut file = ConfigFile::default();
        file.host.version = HostVersion::new(16, 0);
        let env = |key: &str| (key == HOST_VERSION_ENV).then(|| "16.1".to_string());

        let cfg = LivecardConfig::resolve_with(Overrides::default(), no_env, Some(file.clone()))
            .unwrap();
        assert_eq!(cfg.host_version, HostVersion::new(16, 0));

        let cfg =
            LivecardConfig::resolve_with(Overrides::default(), env, Some(file.clone())).unwrap();
        assert_eq!(cfg.host_version, HostVersion::new(16, 1));

        let overrides = Overrides {
            host_version: Some("18.2"),
            host_platform: Some("android"),
        };
        let cfg = LivecardConfig::resolve_with(overrides, env, Some(file)).unwrap();
        assert_eq!(cfg.host_version, HostVersion::new(18, 2));
        assert_eq!(cfg.host_platform, "android");
    }

    #[test]
    fn bad_env_version_is_an_error() {
        let env = |_: &str| Some("sixteen".to_string());
        let err = LivecardConfig::resolve_with(Overrides::default(), env, None).unwrap_err();
        assert!(format!("{err:#}").contains(HOST_VERSION_ENV));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = ConfigFile::default();
        config.capability.after_grace_secs = 60;
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn capability_section_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[host]\nplatform = \"ios\"\nversion = \"16.4\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.host.version, HostVersion::new(16, 4));
        assert_eq!(config.capability, CapabilityConfig::default());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        init_config(&path, false).unwrap();
        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
        assert_eq!(load_config(&path).unwrap(), ConfigFile::default());
    }
}
