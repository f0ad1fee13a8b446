// Configuration loading and parsing (app.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable that overrides the token in credentials.toml.
pub const ACCESS_TOKEN_ENV: &str = "DYNASTY_ACCESS_TOKEN";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to set up {path}: {source}")]
    Setup {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub yahoo: YahooConfig,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    pub report: ReportConfig,
    pub credentials: CredentialsConfig,
}

impl Config {
    pub fn access_token(&self) -> Option<&str> {
        self.credentials
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Cache database location. A relative configured path is taken relative
    /// to `base_dir`; with none configured the platform cache directory is
    /// used.
    pub fn cache_path(&self, base_dir: &Path) -> PathBuf {
        if let Some(path) = &self.cache.path {
            return base_dir.join(path);
        }
        match directories::ProjectDirs::from("", "", "dynasty") {
            Some(dirs) => dirs.cache_dir().join("responses.db"),
            None => base_dir.join("cache").join("responses.db"),
        }
    }

    /// Resolve the cache database path and create its directory.
    pub fn prepare_cache_dir(&self, base_dir: &Path) -> Result<PathBuf, ConfigError> {
        let path = self.cache_path(base_dir);
        if let Some(parent) = path.parent() {
            create_dir(parent)?;
        }
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// app.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct AppFile {
    yahoo: YahooConfig,
    fetch: FetchConfig,
    cache: CacheConfig,
    #[serde(default)]
    report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YahooConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Pause between league-list requests.
    pub request_delay_ms: u64,
    /// Pause between weekly scoreboard requests.
    pub week_delay_ms: u64,
    /// Last week to probe when a league reports no end week.
    pub default_end_week: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    #[serde(default)]
    pub path: Option<String>,
    /// Entries older than this are refetched; 0 keeps them forever.
    pub max_age_hours: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// League lineage to analyze; the command-line argument wins over this.
    #[serde(default)]
    pub league_name: Option<String>,
    #[serde(default)]
    pub csv_path: Option<String>,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub access_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/app.toml` and (optionally)
/// `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults or read the environment; see `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- app.toml (required) ---
    let app_path = config_dir.join("app.toml");
    let app_text = read_file(&app_path)?;
    let app_file: AppFile = toml::from_str(&app_text).map_err(|e| ConfigError::ParseError {
        path: app_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        yahoo: app_file.yahoo,
        fetch: app_file.fetch,
        cache: app_file.cache,
        report: app_file.report,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/app.toml` from the shipped `defaults/app.toml` on first run.
///
/// Returns whether a file was written. An existing app.toml is never touched,
/// and credentials are never seeded; with no shipped default nothing happens
/// and loading reports the missing file.
pub fn seed_app_config(base_dir: &Path) -> Result<bool, ConfigError> {
    let target = base_dir.join("config").join("app.toml");
    let shipped = base_dir.join("defaults").join("app.toml");
    if target.exists() || !shipped.is_file() {
        return Ok(false);
    }
    create_dir(target.parent().unwrap_or(base_dir))?;
    std::fs::copy(&shipped, &target).map_err(|source| ConfigError::Setup {
        path: target.clone(),
        source,
    })?;
    Ok(true)
}

/// Loads config relative to the current working directory, copying defaults
/// first and applying the access token environment override.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if seed_app_config(&cwd)? {
        info!("Seeded config/app.toml from defaults");
    }
    let mut config = load_config_from(&cwd)?;
    apply_token_override(&mut config, std::env::var(ACCESS_TOKEN_ENV).ok());
    Ok(config)
}

/// A non-blank override replaces whatever token credentials.toml supplied.
pub fn apply_token_override(config: &mut Config, token: Option<String>) {
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        config.credentials.access_token = Some(token);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn create_dir(dir: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(dir).map_err(|source| ConfigError::Setup {
        path: dir.to_path_buf(),
        source,
    })
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.yahoo.base_url.trim();
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        return Err(ConfigError::ValidationError {
            field: "yahoo.base_url".into(),
            message: format!("must be an http(s) URL, got {base_url:?}"),
        });
    }

    let end_week = config.fetch.default_end_week;
    if !(1..=25).contains(&end_week) {
        return Err(ConfigError::ValidationError {
            field: "fetch.default_end_week".into(),
            message: format!("must be between 1 and 25, got {end_week}"),
        });
    }

    if let Some(path) = &config.cache.path {
        if path.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "cache.path".into(),
                message: "must not be empty when set".into(),
            });
        }
    }

    if let Some(path) = &config.report.csv_path {
        if path.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "report.csv_path".into(),
                message: "must not be empty when set".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: returns the dynasty-app crate root
    /// (works whether `cargo test` runs from the crate root or repo root).
    fn crate_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/dynasty-app/defaults").exists() {
            cwd.join("crates/dynasty-app")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Fresh temp dir holding `config/app.toml` with the given contents.
    fn config_dir_with(name: &str, app_toml: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/app.toml"), app_toml).unwrap();
        tmp
    }

    fn default_app_toml() -> String {
        fs::read_to_string(crate_root().join("defaults/app.toml")).unwrap()
    }

    #[test]
    fn load_valid_config_from_defaults() {
        let tmp = config_dir_with("dynasty_config_defaults", &default_app_toml());

        let config = load_config_from(&tmp).expect("defaults should be valid");
        assert_eq!(config.yahoo.base_url, crate::client::YAHOO_API_BASE);
        assert_eq!(config.fetch.request_delay_ms, 100);
        assert_eq!(config.fetch.week_delay_ms, 50);
        assert_eq!(config.fetch.default_end_week, 17);
        assert!(config.cache.enabled);
        assert!(config.access_token().is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn credentials_toml_supplies_token() {
        let tmp = config_dir_with("dynasty_config_credentials", &default_app_toml());
        fs::write(tmp.join("config/credentials.toml"), "access_token = \"abc123\"\n").unwrap();

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.access_token(), Some("abc123"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn env_token_overrides_file_token() {
        let tmp = config_dir_with("dynasty_config_override", &default_app_toml());
        fs::write(tmp.join("config/credentials.toml"), "access_token = \"file\"\n").unwrap();

        let mut config = load_config_from(&tmp).unwrap();
        apply_token_override(&mut config, Some("  ".into()));
        assert_eq!(config.access_token(), Some("file"));
        apply_token_override(&mut config, Some("env".into()));
        assert_eq!(config.access_token(), Some("env"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn relative_cache_path_resolves_against_base_dir() {
        let app = default_app_toml().replace("enabled = true", "enabled = true\npath = \"cache/test.db\"");
        let tmp = config_dir_with("dynasty_config_cache_path", &app);

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.cache_path(&tmp), tmp.join("cache/test.db"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_end_week_out_of_range() {
        let app = default_app_toml().replace("default_end_week = 17", "default_end_week = 0");
        let tmp = config_dir_with("dynasty_config_bad_week", &app);

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "fetch.default_end_week");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let app = default_app_toml().replace(crate::client::YAHOO_API_BASE, "ftp://yahoo");
        let tmp = config_dir_with("dynasty_config_bad_url", &app);

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "yahoo.base_url"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_app_toml() {
        let tmp = std::env::temp_dir().join("dynasty_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("app.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = config_dir_with("dynasty_config_invalid", "[yahoo\nbase_url = ");

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("app.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn seeds_app_toml_but_not_credentials() {
        let tmp = std::env::temp_dir().join("dynasty_config_seed");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::copy(crate_root().join("defaults/app.toml"), tmp.join("defaults/app.toml")).unwrap();
        fs::write(tmp.join("defaults/credentials.toml.example"), "access_token = \"...\"\n").unwrap();

        assert!(seed_app_config(&tmp).unwrap());
        assert!(tmp.join("config/app.toml").exists());
        assert!(!tmp.join("config/credentials.toml").exists());
        assert!(!tmp.join("config/credentials.toml.example").exists());
        assert!(load_config_from(&tmp).is_ok());

        // An edited app.toml survives the next run.
        fs::write(tmp.join("config/app.toml"), "# custom\n").unwrap();
        assert!(!seed_app_config(&tmp).unwrap());
        assert_eq!(fs::read_to_string(tmp.join("config/app.toml")).unwrap(), "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn nothing_to_seed_leaves_missing_app_toml_to_loading() {
        let tmp = std::env::temp_dir().join("dynasty_config_nothing_to_seed");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        assert!(!seed_app_config(&tmp).unwrap());
        assert!(!tmp.join("config").exists());
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("config/app.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn prepare_cache_dir_creates_parent() {
        let app = default_app_toml().replace("enabled = true", "enabled = true\npath = \"state/http/responses.db\"");
        let tmp = config_dir_with("dynasty_config_cache_dir", &app);

        let config = load_config_from(&tmp).unwrap();
        let path = config.prepare_cache_dir(&tmp).unwrap();
        assert_eq!(path, tmp.join("state/http/responses.db"));
        assert!(tmp.join("state/http").is_dir());
        assert!(!path.exists());

        let _ = fs::remove_dir_all(&tmp);
    }
}
