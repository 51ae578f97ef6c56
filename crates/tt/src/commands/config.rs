//! Config command implementation.
//!
//! View configuration settings and resolve the paths derived from them.
//! Config file is located at ~/.config/tally/config.toml.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tally_store::JsonDirStore;
use tracing::debug;

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Directory name under the config home.
const CONFIG_DIR_NAME: &str = "tally";

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "TALLY_CONFIG";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TALLY_DATA_DIR";

/// Environment variable pointing at the silence file.
pub const SILENCE_FILE_ENV: &str = "TALLY_SILENCE_FILE";

/// Notification server used when none is configured.
pub const DEFAULT_NOTIFY_SERVER: &str = "https://ntfy.sh";

/// Configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding the record files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// File listing silenced result names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silence_file: Option<PathBuf>,

    /// Queries run by `tt when` when none are given.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<String>,

    /// Notification settings.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Per-category settings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, CategoryConfig>,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data_dir: None,
            silence_file: None,
            queries: Vec::new(),
            notify: NotifyConfig::default(),
            categories: BTreeMap::new(),
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Server base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// Topic to publish to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// Settings for one category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Attribute holding the record timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_field: Option<String>,
}

impl Config {
    /// Resolves the data directory: `TALLY_DATA_DIR`, then `data_dir`, then
    /// the XDG data directory.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = env_path(DATA_DIR_ENV) {
            return Ok(dir);
        }
        if let Some(dir) = &self.data_dir {
            return Ok(expand_home(dir));
        }
        Ok(JsonDirStore::default_dir()?)
    }

    /// Resolves the silence file: `TALLY_SILENCE_FILE`, then `silence_file`.
    pub fn resolve_silence_file(&self) -> Option<PathBuf> {
        env_path(SILENCE_FILE_ENV).or_else(|| self.silence_file.as_deref().map(expand_home))
    }

    /// Builds the record store described by this config.
    pub fn open_store(&self) -> Result<JsonDirStore> {
        let dir = self.resolve_data_dir()?;
        debug!(dir = %dir.display(), "opening record store");

        let store = self
            .categories
            .iter()
            .filter_map(|(name, category)| {
                category
                    .timestamp_field
                    .as_ref()
                    .map(|field| (name, field))
            })
            .fold(JsonDirStore::with_dir(dir), |store, (name, field)| {
                store.with_timestamp_field(name.clone(), field.clone())
            });
        Ok(store)
    }
}

/// Reads a path from a non-empty environment variable.
fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Expands a leading `~` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/tally/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join(CONFIG_DIR_NAME));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join(CONFIG_DIR_NAME))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(path) = env_path(CONFIG_ENV) {
        return Ok(path);
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
///
/// A missing file yields the default configuration.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    migrate_config(config)
}

/// Migrates config to current version if needed.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "Config version {} is newer than supported version {}",
            config.version, CONFIG_VERSION
        )));
    }

    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = &ctx.config;
    let path = get_config_path()?;
    let data_dir = config.resolve_data_dir()?;
    let silence_file = config.resolve_silence_file();

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "data_dir": data_dir.display().to_string(),
            "silence_file": silence_file.as_ref().map(|p| p.display().to_string()),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        println!("Settings:");
        println!("  data_dir: {}", data_dir.display());
        match &silence_file {
            Some(file) => println!("  silence_file: {}", file.display()),
            None => println!("  silence_file: (none)"),
        }
        if !config.queries.is_empty() {
            println!("  queries:");
            for query in &config.queries {
                println!("    {}", query);
            }
        }

        println!("\n[notify]");
        println!(
            "  server: {}",
            config.notify.server.as_deref().unwrap_or(DEFAULT_NOTIFY_SERVER)
        );
        if let Some(ref topic) = config.notify.topic {
            println!("  topic: {}", topic);
        }

        for (name, category) in &config.categories {
            println!("\n[categories.{}]", name);
            if let Some(ref field) = category.timestamp_field {
                println!("  timestamp_field: {}", field);
            }
        }
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    /// Runs `f` with the given environment variables set, restoring them after.
    fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
        let saved: Vec<(String, Option<std::ffi::OsString>)> = vars
            .iter()
            .map(|(name, _)| (name.to_string(), env::var_os(name)))
            .collect();
        for (name, value) in vars {
            match value {
                Some(v) => env::set_var(name, v),
                None => env::remove_var(name),
            }
        }

        let result = f();

        for (name, value) in saved {
            match value {
                Some(v) => env::set_var(&name, v),
                None => env::remove_var(&name),
            }
        }
        result
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.data_dir.is_none());
        assert!(config.silence_file.is_none());
        assert!(config.queries.is_empty());
        assert!(config.notify.topic.is_none());
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
version = 1
data_dir = "/srv/tally"
silence_file = "/srv/tally/silenced"
queries = ["food => food ~ 'vitamin' every 1d as vitamins", "weight => every 1w"]

[notify]
server = "https://notify.example.com"
topic = "habits"

[categories.weight]
timestamp_field = "measured_at"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/tally")));
        assert_eq!(config.queries.len(), 2);
        assert_eq!(
            config.notify.server.as_deref(),
            Some("https://notify.example.com")
        );
        assert_eq!(config.notify.topic.as_deref(), Some("habits"));
        assert_eq!(
            config.categories["weight"].timestamp_field.as_deref(),
            Some("measured_at")
        );
    }

    #[test]
    fn test_config_deserialization_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.queries.is_empty());
    }

    #[test]
    fn test_config_serialization_skips_unset() {
        let config = Config {
            queries: vec!["food =>".to_string()],
            ..Config::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("version = 1"));
        assert!(toml_str.contains("queries"));
        assert!(!toml_str.contains("data_dir"));
        assert!(!toml_str.contains("categories"));
    }

    #[test]
    fn test_migrate_rejects_future_version() {
        let config = Config {
            version: CONFIG_VERSION + 1,
            ..Config::default()
        };
        assert!(matches!(
            migrate_config(config),
            Err(CommandError::Config(_))
        ));
    }

    #[test]
    fn test_expand_home() {
        let absolute = Path::new("/var/lib/tally");
        assert_eq!(expand_home(absolute), absolute);

        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(
                expand_home(Path::new("~/tally")),
                dirs.home_dir().join("tally")
            );
        }
    }

    #[test]
    #[serial]
    fn test_load_config_from_env_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "queries = [\"food =>\"]\n").unwrap();

        let config = with_env(&[(CONFIG_ENV, path.to_str())], load_config).unwrap();
        assert_eq!(config.queries, vec!["food =>"]);
    }

    #[test]
    #[serial]
    fn test_load_config_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.toml");

        let config = with_env(&[(CONFIG_ENV, path.to_str())], load_config).unwrap();
        assert!(config.queries.is_empty());
    }

    #[test]
    #[serial]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "queries = [").unwrap();

        let result = with_env(&[(CONFIG_ENV, path.to_str())], load_config);
        assert!(matches!(result, Err(CommandError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_config_path_uses_xdg_config_home() {
        let path = with_env(
            &[(CONFIG_ENV, None), ("XDG_CONFIG_HOME", Some("/tmp/xdg"))],
            get_config_path,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/xdg/tally/config.toml"));
    }

    #[test]
    #[serial]
    fn test_data_dir_env_overrides_config() {
        let config = Config {
            data_dir: Some(PathBuf::from("/from/config")),
            ..Config::default()
        };

        let dir = with_env(&[(DATA_DIR_ENV, Some("/from/env"))], || {
            config.resolve_data_dir()
        })
        .unwrap();
        assert_eq!(dir, PathBuf::from("/from/env"));

        let dir = with_env(&[(DATA_DIR_ENV, None)], || config.resolve_data_dir()).unwrap();
        assert_eq!(dir, PathBuf::from("/from/config"));
    }

    #[test]
    #[serial]
    fn test_silence_file_resolution() {
        let config = Config {
            silence_file: Some(PathBuf::from("/from/config")),
            ..Config::default()
        };

        let file = with_env(&[(SILENCE_FILE_ENV, Some("/from/env"))], || {
            config.resolve_silence_file()
        });
        assert_eq!(file, Some(PathBuf::from("/from/env")));

        let file = with_env(&[(SILENCE_FILE_ENV, None)], || {
            Config::default().resolve_silence_file()
        });
        assert_eq!(file, None);
    }
}
