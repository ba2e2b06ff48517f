//! Configuration file management for the `timeline` binary.
//!
//! Provides a TOML-based config file at `~/.config/timeline-plus/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use timeline_db::config::DbConfig;

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Default HTTP port, matching what the web frontend expects.
pub const DEFAULT_PORT: u16 = 8000;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_owned()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/timeline-plus` or
/// `~/.config/timeline-plus`, on every platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("timeline-plus");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("timeline-plus")
}

/// Return the path to the config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

/// Load and parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(config, &config_path())
}

/// Serialize and write a config file to an explicit path.
/// Sets file permissions to 0600 on Unix; the file holds the database URL,
/// which may carry a password.
pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Where the HTTP server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct TimelineConfig {
    pub db_config: DbConfig,
    pub server: ServerConfig,
}

impl TimelineConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `TIMELINE_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Bind: `TIMELINE_BIND` > `server.bind` > `127.0.0.1`
    /// - Port: `TIMELINE_PORT` > `server.port` > `8000`
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        Self::resolve_with(cli_db_url, load_config().ok())
    }

    /// Like [`Self::resolve`] but with an already-loaded (or absent) config file.
    pub fn resolve_with(cli_db_url: Option<&str>, file_config: Option<ConfigFile>) -> Result<Self> {
        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let file_server = file_config.map(|cfg| cfg.server).unwrap_or_default();

        let bind = std::env::var("TIMELINE_BIND").unwrap_or(file_server.bind);
        let port = match std::env::var("TIMELINE_PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("TIMELINE_PORT is not a valid port: {raw:?}"))?,
            Err(_) => file_server.port,
        };

        Ok(Self {
            db_config: DbConfig::new(db_url),
            server: ServerConfig { bind, port },
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_env() {
        unsafe { std::env::remove_var("TIMELINE_DATABASE_URL") };
        unsafe { std::env::remove_var("TIMELINE_BIND") };
        unsafe { std::env::remove_var("TIMELINE_PORT") };
    }

    fn file_config() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "postgresql://file:5432/filedb".to_string(),
            },
            server: ServerSection {
                bind: "0.0.0.0".to_string(),
                port: 9100,
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("timeline-plus").join("config.toml");

        save_config_to(&file_config(), &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.database.url, "postgresql://file:5432/filedb");
        assert_eq!(loaded.server.bind, "0.0.0.0");
        assert_eq!(loaded.server.port, 9100);
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        save_config_to(&file_config(), &path).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn server_section_is_optional() {
        let cfg: ConfigFile = toml::from_str("[database]\nurl = \"postgresql://h/db\"\n").unwrap();
        assert_eq!(cfg.server.bind, DEFAULT_BIND);
        assert_eq!(cfg.server.port, DEFAULT_PORT);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var("TIMELINE_DATABASE_URL", "postgresql://env:5432/envdb") };

        let config =
            TimelineConfig::resolve_with(Some("postgresql://cli:5432/clidb"), Some(file_config()))
                .unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");

        clear_env();
    }

    #[test]
    fn resolve_env_beats_config_file() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var("TIMELINE_DATABASE_URL", "postgresql://env:5432/envdb") };
        unsafe { std::env::set_var("TIMELINE_PORT", "8123") };

        let config = TimelineConfig::resolve_with(None, Some(file_config())).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://env:5432/envdb");
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.server.bind, "0.0.0.0");

        clear_env();
    }

    #[test]
    fn resolve_falls_back_to_defaults() {
        let _lock = lock_env();
        clear_env();

        let config = TimelineConfig::resolve_with(None, None).unwrap();
        assert_eq!(config.db_config.database_url, DbConfig::DEFAULT_URL);
        assert_eq!(
            config.server,
            ServerConfig {
                bind: DEFAULT_BIND.to_string(),
                port: DEFAULT_PORT,
            }
        );
    }

    #[test]
    fn resolve_rejects_bad_port() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var("TIMELINE_PORT", "eighty") };

        let result = TimelineConfig::resolve_with(None, None);
        clear_env();

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("TIMELINE_PORT"), "unexpected error: {msg}");
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("timeline-plus/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
