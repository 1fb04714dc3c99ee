// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for warden.
//!
//! # Schema Structure
//!
//! ```text
//! WardenConfig
//! ├── access: AccessConfig
//! ├── session: SessionConfig
//! ├── navigation: NavigationConfig
//! ├── catalog: RouteCatalog
//! ├── elements: Vec<ElementRule>
//! └── logging: LoggingConfig
//! ```
//!
//! Every section has defaults matching the stock operator dashboard, so an
//! empty file is a valid configuration.

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use warden_core::{
    normalize_role, AccessPolicy, ElementRule, RequiredRoles, RoleResolver, RouteCatalog,
    RouteGuard, TokenValidator, DEFAULT_FORBIDDEN_PATH, DEFAULT_ROLES_CLAIM_PATH,
    DEFAULT_SIGN_IN_PATH,
};
use warden_session::{
    AuthService, FileTokenStore, PeriodicTask, SessionController, TokenPersistence,
    DEFAULT_DATA_REFRESH_INTERVAL,
};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default token file.
pub const DEFAULT_TOKEN_PATH: &str = "./data/session.json";

/// Default lead time before expiry at which a refresh is attempted.
pub const DEFAULT_REFRESH_LEAD_SECS: u64 = 60;

/// Default period of the expiry check.
pub const DEFAULT_EXPIRY_CHECK_SECS: u64 = 30;

/// Default period of dashboard data reloads (5 minutes).
pub const DEFAULT_DATA_REFRESH_SECS: u64 = DEFAULT_DATA_REFRESH_INTERVAL.as_secs();

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for warden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    /// Role settings.
    #[serde(default)]
    pub access: AccessConfig,

    /// Session lifecycle settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Redirect targets and layout visibility.
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// The route catalog.
    #[serde(default = "RouteCatalog::dashboard_default")]
    pub catalog: RouteCatalog,

    /// Visibility rules for dashboard cards and KPI tiles.
    #[serde(default = "default_elements")]
    pub elements: Vec<ElementRule>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WardenConfig {
    /// Validates the entire configuration.
    ///
    /// Checks that the default role is one of the available roles (when that
    /// list is given), that every route path and redirect target starts with
    /// `/`, that no two routes share a full path, that element ids are unique,
    /// and that intervals are positive.
    pub fn validate(&self) -> ConfigResult<()> {
        self.access.validate()?;
        self.session.validate()?;
        self.navigation.validate()?;

        for group in self.catalog.groups() {
            if group.layout.trim().is_empty() {
                return Err(ConfigError::validation("catalog.layout", "layout must not be empty"));
            }
            for page in &group.pages {
                if !page.path.starts_with('/') {
                    return Err(ConfigError::validation(
                        format!("catalog.{}.{}", group.layout, page.name),
                        format!("path '{}' must start with '/'", page.path),
                    ));
                }
            }
        }

        if let Some(path) = self.catalog.duplicate_paths().into_iter().next() {
            return Err(ConfigError::duplicate_route(path));
        }

        let policy = self.access_policy();
        if let Some(id) = policy.duplicate_element_ids().first() {
            return Err(ConfigError::duplicate_element(*id));
        }

        Ok(())
    }

    /// Non-fatal observations, e.g. roles referenced by routes but not listed
    /// in `available_roles`.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.access.available_roles.is_empty() {
            return warnings;
        }

        let available: HashSet<String> = self
            .access
            .available_roles
            .iter()
            .filter_map(|r| normalize_role(r))
            .collect();

        let required = self
            .catalog
            .routes()
            .map(|r| (r.full_path(), &r.route.required_roles))
            .chain(self.elements.iter().map(|e| (e.id.clone(), &e.required_roles)));

        for (subject, roles) in required {
            if let RequiredRoles::Roles(roles) = roles {
                for role in roles.iter().filter(|r| !available.contains(*r)) {
                    warnings.push(format!("'{}' requires unlisted role '{}'", subject, role));
                }
            }
        }
        warnings
    }

    /// Builds the role resolver described by the `access` section.
    pub fn role_resolver(&self) -> RoleResolver {
        RoleResolver::new()
            .with_default_role(self.access.default_role.as_deref())
            .with_roles_claim_path(self.access.roles_claim_path.clone())
    }

    /// Builds the token validator described by the `session` section.
    pub fn token_validator(&self) -> TokenValidator {
        TokenValidator::new().with_leeway(self.session.leeway_secs)
    }

    /// Builds the access policy from the catalog, elements and sidebar layouts.
    pub fn access_policy(&self) -> AccessPolicy {
        let policy = AccessPolicy::new(self.catalog.clone()).with_elements(self.elements.clone());
        if self.navigation.sidebar_layouts.is_empty() {
            policy
        } else {
            policy.with_sidebar_layouts(self.navigation.sidebar_layouts.clone())
        }
    }

    /// Builds the route guard from the `navigation` section.
    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new()
            .with_sign_in_path(self.navigation.sign_in_path.clone())
            .with_forbidden_path(self.navigation.forbidden_path.clone())
            .with_public_layouts(self.navigation.public_layouts.clone())
    }

    /// File-backed token store at `session.token_path`.
    pub fn token_store(&self) -> FileTokenStore {
        FileTokenStore::new(&self.session.token_path)
    }

    /// Builds a session controller with this configuration's resolver and
    /// validator, restoring whatever `persistence` holds.
    pub fn session_controller(
        &self,
        auth: Arc<dyn AuthService>,
        persistence: Arc<dyn TokenPersistence>,
    ) -> Arc<SessionController> {
        SessionController::builder(auth, persistence)
            .resolver(self.role_resolver())
            .validator(self.token_validator())
            .build()
    }

    /// Starts the expiry check on `session.expiry_check_interval_secs`,
    /// refreshing within `session.refresh_lead_secs` of expiry.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_expiry_refresh(&self, controller: &Arc<SessionController>) -> PeriodicTask {
        controller.spawn_expiry_refresh(
            self.session.expiry_check_interval(),
            self.session.refresh_lead(),
        )
    }

    /// Runs `reload` now and then every `session.data_refresh_interval_secs`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_data_refresh<F, Fut>(&self, reload: F) -> PeriodicTask
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        PeriodicTask::spawn_immediate("data-refresh", self.session.data_refresh_interval(), reload)
    }
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            access: AccessConfig::default(),
            session: SessionConfig::default(),
            navigation: NavigationConfig::default(),
            catalog: RouteCatalog::dashboard_default(),
            elements: default_elements(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Stock element rules: the three domain cards and four KPI tiles.
pub fn default_elements() -> Vec<ElementRule> {
    let analysts = ["areamanager", "admin", "manager"];
    let mobility = ["areamanager", "user", "admin"];

    vec![
        ElementRule::new("energy", RequiredRoles::roles(analysts)),
        ElementRule::new("environment", RequiredRoles::roles(analysts)),
        ElementRule::new("mobility", RequiredRoles::roles(mobility)),
        ElementRule::new("environmentSensors", RequiredRoles::roles(analysts)),
        ElementRule::new("energyMeters", RequiredRoles::roles(analysts)),
        ElementRule::new("trafficLights", RequiredRoles::roles(mobility)),
        ElementRule::new("trafficSensors", RequiredRoles::roles(mobility)),
    ]
}

// =============================================================================
// Access Configuration
// =============================================================================

/// Role settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessConfig {
    /// Known roles, in display order. Informational.
    #[serde(default)]
    pub available_roles: Vec<String>,

    /// Role assumed when claims carry none.
    #[serde(default)]
    pub default_role: Option<String>,

    /// Dotted path of the nested roles list in the claims.
    #[serde(default = "default_roles_claim_path")]
    pub roles_claim_path: String,
}

fn default_roles_claim_path() -> String {
    DEFAULT_ROLES_CLAIM_PATH.to_string()
}

impl AccessConfig {
    /// Validates the access configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.roles_claim_path.trim().is_empty() {
            return Err(ConfigError::validation(
                "access.roles_claim_path",
                "must not be empty",
            ));
        }

        let Some(default_role) = self.default_role.as_deref() else {
            return Ok(());
        };
        let Some(default_role) = normalize_role(default_role) else {
            return Err(ConfigError::validation("access.default_role", "must not be blank"));
        };

        if !self.available_roles.is_empty()
            && !self
                .available_roles
                .iter()
                .any(|r| normalize_role(r).as_deref() == Some(default_role.as_str()))
        {
            return Err(ConfigError::validation(
                "access.default_role",
                format!("'{}' is not one of available_roles", default_role),
            ));
        }

        Ok(())
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            available_roles: Vec::new(),
            default_role: None,
            roles_claim_path: default_roles_claim_path(),
        }
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

/// Session lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Token file used by the file-backed store.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    /// Clock-skew leeway applied to `exp`, in seconds.
    #[serde(default)]
    pub leeway_secs: u64,

    /// Refresh when the token expires within this many seconds.
    #[serde(default = "default_refresh_lead_secs")]
    pub refresh_lead_secs: u64,

    /// How often to check for upcoming expiry.
    #[serde(default = "default_expiry_check_secs")]
    pub expiry_check_interval_secs: u64,

    /// Period of dashboard data reloads.
    #[serde(default = "default_data_refresh_secs")]
    pub data_refresh_interval_secs: u64,
}

fn default_token_path() -> PathBuf {
    PathBuf::from(DEFAULT_TOKEN_PATH)
}

fn default_refresh_lead_secs() -> u64 {
    DEFAULT_REFRESH_LEAD_SECS
}

fn default_expiry_check_secs() -> u64 {
    DEFAULT_EXPIRY_CHECK_SECS
}

fn default_data_refresh_secs() -> u64 {
    DEFAULT_DATA_REFRESH_SECS
}

impl SessionConfig {
    /// Validates the session configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.expiry_check_interval_secs == 0 {
            return Err(ConfigError::validation(
                "session.expiry_check_interval_secs",
                "must be greater than 0",
            ));
        }
        if self.data_refresh_interval_secs == 0 {
            return Err(ConfigError::validation(
                "session.data_refresh_interval_secs",
                "must be greater than 0",
            ));
        }
        if self.token_path.as_os_str().is_empty() {
            return Err(ConfigError::validation("session.token_path", "must not be empty"));
        }
        Ok(())
    }

    /// Refresh lead as a duration.
    pub fn refresh_lead(&self) -> Duration {
        Duration::from_secs(self.refresh_lead_secs)
    }

    /// Expiry check period as a duration.
    pub fn expiry_check_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_check_interval_secs)
    }

    /// Data reload period as a duration.
    pub fn data_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.data_refresh_interval_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
            leeway_secs: 0,
            refresh_lead_secs: DEFAULT_REFRESH_LEAD_SECS,
            expiry_check_interval_secs: DEFAULT_EXPIRY_CHECK_SECS,
            data_refresh_interval_secs: DEFAULT_DATA_REFRESH_SECS,
        }
    }
}

// =============================================================================
// Navigation Configuration
// =============================================================================

/// Redirect targets and layout visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavigationConfig {
    /// Where unauthenticated users are sent.
    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,

    /// The "not authorized" page.
    #[serde(default = "default_forbidden_path")]
    pub forbidden_path: String,

    /// Layouts reachable without a session.
    #[serde(default = "default_public_layouts")]
    pub public_layouts: Vec<String>,

    /// Layouts shown in the sidebar. Empty means all.
    #[serde(default = "default_sidebar_layouts")]
    pub sidebar_layouts: Vec<String>,
}

fn default_sign_in_path() -> String {
    DEFAULT_SIGN_IN_PATH.to_string()
}

fn default_forbidden_path() -> String {
    DEFAULT_FORBIDDEN_PATH.to_string()
}

fn default_public_layouts() -> Vec<String> {
    vec!["auth".to_string()]
}

fn default_sidebar_layouts() -> Vec<String> {
    vec!["dashboard".to_string(), "documentation".to_string()]
}

impl NavigationConfig {
    /// Validates the navigation configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, path) in [
            ("navigation.sign_in_path", &self.sign_in_path),
            ("navigation.forbidden_path", &self.forbidden_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::validation(
                    field,
                    format!("'{}' must start with '/'", path),
                ));
            }
        }
        Ok(())
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            sign_in_path: default_sign_in_path(),
            forbidden_path: default_forbidden_path(),
            public_layouts: default_public_layouts(),
            sidebar_layouts: default_sidebar_layouts(),
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Filter directive string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name. Accepts `warning` for `warn`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON lines.
    Json,
}

impl LogFormat {
    /// Format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
