// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading and processing for warden.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick the format from its extension
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders
//! 3. Parse YAML/TOML/JSON into [`WardenConfig`]
//! 4. Apply environment variable overrides
//! 5. Resolve the token path against the config file's directory
//! 6. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! WARDEN_ROLES=admin,manager,user
//! WARDEN_DEFAULT_ROLE=user
//! WARDEN_ROLES_CLAIM_PATH=realm_access.roles
//! WARDEN_TOKEN_PATH=/var/lib/warden/session.json
//! WARDEN_LEEWAY_SECS=5
//! WARDEN_REFRESH_LEAD_SECS=120
//! WARDEN_EXPIRY_CHECK_INTERVAL_SECS=30
//! WARDEN_DATA_REFRESH_INTERVAL_SECS=300
//! WARDEN_LOG_LEVEL=debug
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogFormat, LogLevel, WardenConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "WARDEN";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for warden.
///
/// # Examples
///
/// ```no_run
/// use warden_config::loader::ConfigLoader;
///
/// let config = ConfigLoader::new().load("warden.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Base directory for resolving relative paths.
    base_path: Option<PathBuf>,

    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve environment variables.
    resolve_env_vars: bool,

    /// Whether to resolve relative paths.
    resolve_paths: bool,
}

impl ConfigLoader {
    /// Creates a loader with default settings.
    pub fn new() -> Self {
        Self {
            base_path: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            resolve_paths: true,
        }
    }

    /// Sets the directory relative paths resolve against.
    ///
    /// Files default to their own directory. String and default-only loads
    /// resolve nothing unless a base path is set.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables relative path resolution.
    pub fn with_path_resolution(mut self, enabled: bool) -> Self {
        self.resolve_paths = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format follows the extension: `.yaml`/`.yml`, `.toml` or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<WardenConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let base_path = self.base_path.clone().unwrap_or_else(|| {
            path.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let mut config = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        self.resolve_relative_paths(&mut config, Some(&base_path));
        config.validate()?;

        for warning in config.warnings() {
            warn!("{}", warning);
        }

        info!("Configuration loaded successfully");
        debug!(
            "Loaded {} route groups with {} pages and {} element rules",
            config.catalog.groups().len(),
            config.catalog.page_count(),
            config.elements.len()
        );

        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<WardenConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };
        let mut config: WardenConfig = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        self.resolve_relative_paths(&mut config, self.base_path.as_deref());
        config.validate()?;
        Ok(config)
    }

    /// Loads a file if given, otherwise the built-in defaults with environment
    /// overrides applied.
    pub fn load_or_default(&self, path: Option<&Path>) -> ConfigResult<WardenConfig> {
        match path {
            Some(path) => self.load(path),
            None => {
                debug!("No configuration file, using defaults");
                let mut config = WardenConfig::default();
                if self.resolve_env_vars {
                    self.apply_env_overrides(&mut config)?;
                }
                self.resolve_relative_paths(&mut config, self.base_path.as_deref());
                config.validate()?;
                Ok(config)
            }
        }
    }

    fn resolve_relative_paths(&self, config: &mut WardenConfig, base: Option<&Path>) {
        let Some(base) = base.filter(|_| self.resolve_paths) else {
            return;
        };
        if config.session.token_path.is_relative() {
            config.session.token_path = base.join(&config.session.token_path);
        }
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<WardenConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    ///
    /// Unknown variables without a default are left as written.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find('}') else {
                result.push_str(&rest[start..]);
                return result;
            };

            let inner = &after[..end];
            let (name, default) = match inner.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (inner, None),
            };

            match (env::var(name), default) {
                (Ok(value), _) => result.push_str(&value),
                (Err(_), Some(default)) => result.push_str(default),
                (Err(_), None) => {
                    warn!("Environment variable '{}' not found", name);
                    result.push_str(&rest[start..start + 2 + end + 1]);
                }
            }

            rest = &after[end + 1..];
        }

        result.push_str(rest);
        result
    }

    fn var(&self, suffix: &str) -> (String, Option<String>) {
        let name = format!("{}_{}", self.env_prefix, suffix);
        let value = env::var(&name).ok();
        (name, value)
    }

    fn apply_env_overrides(&self, config: &mut WardenConfig) -> ConfigResult<()> {
        if let (_, Some(value)) = self.var("ROLES") {
            config.access.available_roles = parse_list(&value);
        }
        if let (_, Some(value)) = self.var("DEFAULT_ROLE") {
            config.access.default_role = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        }
        if let (_, Some(value)) = self.var("ROLES_CLAIM_PATH") {
            config.access.roles_claim_path = value;
        }

        if let (_, Some(value)) = self.var("TOKEN_PATH") {
            config.session.token_path = PathBuf::from(value);
        }
        if let (name, Some(value)) = self.var("LEEWAY_SECS") {
            config.session.leeway_secs = parse_number(&name, &value)?;
        }
        if let (name, Some(value)) = self.var("REFRESH_LEAD_SECS") {
            config.session.refresh_lead_secs = parse_number(&name, &value)?;
        }
        if let (name, Some(value)) = self.var("EXPIRY_CHECK_INTERVAL_SECS") {
            config.session.expiry_check_interval_secs = parse_number(&name, &value)?;
        }
        if let (name, Some(value)) = self.var("DATA_REFRESH_INTERVAL_SECS") {
            config.session.data_refresh_interval_secs = parse_number(&name, &value)?;
        }

        if let (_, Some(value)) = self.var("SIGN_IN_PATH") {
            config.navigation.sign_in_path = value;
        }
        if let (_, Some(value)) = self.var("FORBIDDEN_PATH") {
            config.navigation.forbidden_path = value;
        }

        if let (name, Some(value)) = self.var("LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected trace|debug|info|warn|error"))?;
        }
        if let (name, Some(value)) = self.var("LOG_FORMAT") {
            config.logging.format = match value.trim().to_lowercase().as_str() {
                "text" | "pretty" => LogFormat::Text,
                "compact" => LogFormat::Compact,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::invalid_env_var(name, "expected text|compact|json")),
            };
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => parse_yaml(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

/// YAML goes through the `config` crate.
fn parse_yaml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number(name: &str, value: &str) -> ConfigResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid_env_var(name, "expected a non-negative integer"))
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<WardenConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<WardenConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DEFAULT_TOKEN_PATH;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn test_yaml() -> &'static str {
        r#"
access:
  available_roles: [admin, manager, user, areamanager]
  default_role: user

session:
  token_path: session.json
  refresh_lead_secs: 120

navigation:
  sidebar_layouts: [dashboard]

catalog:
  - layout: dashboard
    pages:
      - name: home
        path: /home
        required_roles: [admin, user]
        content: Home
      - name: energy
        path: /energy
        required_roles: [manager]
  - layout: auth
    title: auth pages
    pages:
      - name: sign in
        path: /sign-in
        required_roles: ["*"]

elements:
  - id: energyMeters
    required_roles: [manager]

logging:
  level: debug
  format: json
"#
    }

    // Prefix no test environment sets, so ambient WARDEN_* never leaks in.
    fn isolated() -> ConfigLoader {
        ConfigLoader::new().with_env_prefix("WARDEN_LOADER_TEST_UNSET")
    }

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(test_yaml().as_bytes()).unwrap();

        let config = isolated().load(file.path()).unwrap();

        assert_eq!(config.access.default_role.as_deref(), Some("user"));
        assert_eq!(config.catalog.page_count(), 3);
        assert!(config.catalog.find("/auth/sign-in").unwrap().route.required_roles.is_any());
        assert_eq!(config.elements.len(), 1);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.session.refresh_lead_secs, 120);
        assert_eq!(
            config.session.token_path,
            file.path().parent().unwrap().join("session.json")
        );
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
[access]
available_roles = ["admin", "user"]
default_role = "user"

[session]
leeway_secs = 5
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = isolated().load(file.path()).unwrap();
        assert_eq!(config.session.leeway_secs, 5);
        assert_eq!(config.catalog, warden_core::RouteCatalog::dashboard_default());
    }

    #[test]
    fn test_load_json_from_str() {
        let config = isolated()
            .load_from_str(r#"{"access": {"default_role": "guest"}}"#, ConfigFormat::Json)
            .unwrap();
        assert_eq!(config.role_resolver().default_role(), Some("guest"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = isolated()
            .load_from_str(r#"{"acess": {}}"#, ConfigFormat::Json)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Serialization { .. }));
    }

    #[test]
    fn test_invalid_default_role_rejected() {
        let err = isolated()
            .load_from_str(
                r#"{"access": {"available_roles": ["admin"], "default_role": "user"}}"#,
                ConfigFormat::Json,
            )
            .unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")).unwrap(), ConfigFormat::Json);
        assert!(ConfigFormat::from_path(Path::new("a.ini")).is_err());
        assert!(ConfigFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_env_placeholder_with_default() {
        let loader = ConfigLoader::new();
        assert_eq!(
            loader.resolve_env_placeholders("role: ${WARDEN_LOADER_TEST_NONEXISTENT:guest}"),
            "role: guest"
        );
        assert_eq!(
            loader.resolve_env_placeholders("a ${WARDEN_LOADER_TEST_NONEXISTENT} b"),
            "a ${WARDEN_LOADER_TEST_NONEXISTENT} b"
        );
        assert_eq!(loader.resolve_env_placeholders("open ${never"), "open ${never");
    }

    #[test]
    fn test_env_overrides() {
        let prefix = "WARDEN_LOADER_TEST_OVERRIDE";
        env::set_var(format!("{prefix}_ROLES"), " Admin, user ,,manager");
        env::set_var(format!("{prefix}_DEFAULT_ROLE"), "user");
        env::set_var(format!("{prefix}_REFRESH_LEAD_SECS"), "90");

        let config = ConfigLoader::new()
            .with_env_prefix(prefix)
            .load_or_default(None)
            .unwrap();

        assert_eq!(config.access.available_roles, vec!["Admin", "user", "manager"]);
        assert_eq!(config.access.default_role.as_deref(), Some("user"));
        assert_eq!(config.session.refresh_lead_secs, 90);

        env::set_var(format!("{prefix}_REFRESH_LEAD_SECS"), "soon");
        let err = ConfigLoader::new()
            .with_env_prefix(prefix)
            .load_or_default(None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { .. }));

        for suffix in ["ROLES", "DEFAULT_ROLE", "REFRESH_LEAD_SECS"] {
            env::remove_var(format!("{prefix}_{suffix}"));
        }
    }

    #[test]
    fn test_base_path_resolves_string_config() {
        let json = r#"{"session": {"token_path": "state/session.json"}}"#;

        let unresolved = isolated().load_from_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(unresolved.session.token_path, PathBuf::from("state/session.json"));

        let resolved = isolated()
            .with_base_path("/srv/warden")
            .load_from_str(json, ConfigFormat::Json)
            .unwrap();
        assert_eq!(resolved.session.token_path, PathBuf::from("/srv/warden/state/session.json"));

        let absolute = isolated()
            .with_base_path("/srv/warden")
            .load_from_str(r#"{"session": {"token_path": "/var/lib/session.json"}}"#, ConfigFormat::Json)
            .unwrap();
        assert_eq!(absolute.session.token_path, PathBuf::from("/var/lib/session.json"));
    }

    #[test]
    fn test_base_path_overrides_file_directory() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(test_yaml().as_bytes()).unwrap();

        let config = isolated().with_base_path("/opt/warden").load(file.path()).unwrap();
        assert_eq!(config.session.token_path, PathBuf::from("/opt/warden/session.json"));

        let defaults = isolated().with_base_path("/opt/warden").load_or_default(None).unwrap();
        assert_eq!(defaults.session.token_path, Path::new("/opt/warden").join(DEFAULT_TOKEN_PATH));
    }

    #[test]
    fn test_path_resolution_disabled() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(test_yaml().as_bytes()).unwrap();

        let config = isolated()
            .with_base_path("/opt/warden")
            .with_path_resolution(false)
            .load(file.path())
            .unwrap();
        assert_eq!(config.session.token_path, PathBuf::from("session.json"));
    }

    #[test]
    fn test_env_vars_disabled() {
        let prefix = "WARDEN_LOADER_TEST_NOENV";
        env::set_var(format!("{prefix}_LEEWAY_SECS"), "9");
        let json = r#"{"access": {"roles_claim_path": "${WARDEN_LOADER_TEST_NONEXISTENT:realm_access.roles}"}}"#;

        let config = ConfigLoader::new()
            .with_env_prefix(prefix)
            .with_env_vars(false)
            .load_from_str(json, ConfigFormat::Json)
            .unwrap();
        assert_eq!(
            config.access.roles_claim_path,
            "${WARDEN_LOADER_TEST_NONEXISTENT:realm_access.roles}"
        );
        assert_eq!(config.session.leeway_secs, 0);

        let config = ConfigLoader::new()
            .with_env_prefix(prefix)
            .load_from_str(json, ConfigFormat::Json)
            .unwrap();
        assert_eq!(config.access.roles_claim_path, "realm_access.roles");
        assert_eq!(config.session.leeway_secs, 9);

        env::remove_var(format!("{prefix}_LEEWAY_SECS"));
    }

    #[test]
    fn test_file_not_found() {
        let result = ConfigLoader::new().load("/nonexistent/path/warden.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }
}
