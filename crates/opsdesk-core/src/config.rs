//! Configuration resolution for opsdesk.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/opsdesk/access.json)
//! 3. Project config (.opsdesk/access.json)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::rbac::{AccessPolicy, AccountMode, EffectiveRoleResolver, RoleRegistry, RouteTable};

/// Complete opsdesk configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Access-control configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccessConfig {
    /// Honour the testing role override. Keep off in production.
    #[serde(default)]
    pub allow_role_override: bool,
    /// Account mode assumed when a caller does not supply one.
    #[serde(default)]
    pub default_mode: AccountMode,
    /// JSON role registry replacing the builtin one.
    #[serde(default)]
    pub registry_path: Option<PathBuf>,
}

impl AccessConfig {
    /// Policy described by this config: the builtin one unless a registry
    /// file is configured.
    pub fn build_policy(&self) -> Result<AccessPolicy> {
        match &self.registry_path {
            None => Ok(AccessPolicy::builtin()),
            Some(path) => {
                let registry = RoleRegistry::load(path)?;
                tracing::info!(path = %path.display(), "Loaded role registry");
                Ok(AccessPolicy::new(registry, RouteTable::builtin()))
            }
        }
    }

    pub const fn resolver(&self) -> EffectiveRoleResolver {
        EffectiveRoleResolver::new(self.allow_role_override)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON log lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path()
        && global_path.exists()
    {
        let global = load_config_file(&global_path)?;
        merge_config(&mut config, global);
    }

    if let Some(dir) = project_dir {
        let project_path = project_config_path(dir);
        if project_path.exists() {
            let project = load_config_file(&project_path)?;
            merge_config(&mut config, project);
        }
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    Ok(config)
}

/// Project config location below `dir`.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(".opsdesk").join("access.json")
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".opsdesk").join("access.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/opsdesk/access.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("opsdesk").join("access.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// One config file. Only the fields a file sets override lower layers.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    access: AccessLayer,
    logging: LoggingLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AccessLayer {
    allow_role_override: Option<bool>,
    default_mode: Option<AccountMode>,
    registry_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoggingLayer {
    level: Option<String>,
    json: Option<bool>,
}

fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    let mut layer: ConfigLayer = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })?;

    // Relative registry paths are relative to the file that names them.
    if let (Some(registry), Some(parent)) = (&layer.access.registry_path, path.parent())
        && registry.is_relative()
    {
        layer.access.registry_path = Some(parent.join(registry));
    }
    Ok(layer)
}

fn merge_config(base: &mut Config, overlay: ConfigLayer) {
    if let Some(path) = overlay.access.registry_path {
        base.access.registry_path = Some(path);
    }
    if let Some(allow) = overlay.access.allow_role_override {
        base.access.allow_role_override = allow;
    }
    if let Some(mode) = overlay.access.default_mode {
        base.access.default_mode = mode;
    }
    if let Some(level) = overlay.logging.level {
        base.logging.level = level;
    }
    if let Some(json) = overlay.logging.json {
        base.logging.json = json;
    }
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(val) = var("OPSDESK_ALLOW_ROLE_OVERRIDE") {
        config.access.allow_role_override = parse_flag("OPSDESK_ALLOW_ROLE_OVERRIDE", &val)?;
    }
    if let Some(val) = var("OPSDESK_DEFAULT_MODE") {
        config.access.default_mode = val.parse()?;
    }
    if let Some(val) = var("OPSDESK_ROLE_REGISTRY") {
        config.access.registry_path = Some(PathBuf::from(val));
    }
    if let Some(val) = var("OPSDESK_LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Some(val) = var("OPSDESK_LOG_JSON") {
        config.logging.json = parse_flag("OPSDESK_LOG_JSON", &val)?;
    }
    Ok(())
}

fn parse_flag(key: &str, val: &str) -> Result<bool> {
    match val.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{key} must be a boolean, got '{val}'"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_config_disallows_override() {
        let config = Config::default();
        assert!(!config.access.allow_role_override);
        assert!(!config.access.resolver().allows_override());
    }

    #[test]
    fn default_config_uses_commerce_mode() {
        let config = Config::default();
        assert_eq!(config.access.default_mode, AccountMode::Commerce);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("OPSDESK_ALLOW_ROLE_OVERRIDE", "true"),
                ("OPSDESK_DEFAULT_MODE", "internal"),
                ("OPSDESK_LOG_LEVEL", "debug"),
                ("OPSDESK_LOG_JSON", "1"),
            ]),
        )
        .unwrap();
        assert!(config.access.allow_role_override);
        assert_eq!(config.access.default_mode, AccountMode::Internal);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn env_rejects_bad_values() {
        let mut config = Config::default();
        let err = apply_env_overrides(&mut config, env(&[("OPSDESK_LOG_JSON", "maybe")]));
        assert!(matches!(err, Err(Error::Config(_))));

        let err = apply_env_overrides(&mut config, env(&[("OPSDESK_DEFAULT_MODE", "retail")]));
        assert!(matches!(err, Err(Error::UnknownMode(_))));
    }

    #[test]
    fn project_file_is_merged_and_resolves_registry_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = project_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"access":{"allow_role_override":true,"default_mode":"internal",
                "registry_path":"roles.json"}}"#,
        )
        .unwrap();

        let mut config = Config::default();
        merge_config(&mut config, load_config_file(&path).unwrap());

        assert!(config.access.allow_role_override);
        assert_eq!(config.access.default_mode, AccountMode::Internal);
        assert_eq!(
            config.access.registry_path,
            Some(dir.path().join(".opsdesk").join("roles.json"))
        );
    }

    #[test]
    fn sparse_project_file_keeps_global_settings() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.json");
        std::fs::write(
            &global,
            r#"{"access":{"allow_role_override":true,"default_mode":"internal"},
                "logging":{"level":"debug","json":true}}"#,
        )
        .unwrap();
        let project = project_config_path(dir.path());
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, r#"{"access":{"registry_path":"roles.json"}}"#).unwrap();

        let mut config = Config::default();
        merge_config(&mut config, load_config_file(&global).unwrap());
        merge_config(&mut config, load_config_file(&project).unwrap());

        assert!(config.access.allow_role_override);
        assert_eq!(config.access.default_mode, AccountMode::Internal);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(
            config.access.registry_path,
            Some(dir.path().join(".opsdesk").join("roles.json"))
        );
    }

    #[test]
    fn later_layer_can_switch_settings_back() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.json");
        std::fs::write(&global, r#"{"access":{"default_mode":"internal"}}"#).unwrap();
        let project = dir.path().join("project.json");
        std::fs::write(
            &project,
            r#"{"access":{"default_mode":"commerce"},"logging":{"json":false}}"#,
        )
        .unwrap();

        let mut config = Config::default();
        merge_config(&mut config, load_config_file(&global).unwrap());
        merge_config(&mut config, load_config_file(&project).unwrap());

        assert_eq!(config.access.default_mode, AccountMode::Commerce);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_config_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn build_policy_defaults_to_builtin() {
        let policy = AccessConfig::default().build_policy().unwrap();
        assert!(policy.can_use_pos(crate::rbac::RoleId::Staff, AccountMode::Commerce));
    }

    #[test]
    fn build_policy_surfaces_missing_registry() {
        let access = AccessConfig {
            registry_path: Some(PathBuf::from("/nonexistent/roles.json")),
            ..AccessConfig::default()
        };
        assert!(matches!(access.build_policy(), Err(Error::Config(_))));
    }
}
