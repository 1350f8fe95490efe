//! opsdesk CLI
//!
//! Inspect the role registry and evaluate access decisions for a role and
//! account mode.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use opsdesk_cli::access_cmd::{self, AccessAction, AccessContext};
use opsdesk_core::config::{self, Config};
use opsdesk_core::tracing_init;

#[derive(Parser, Debug)]
#[command(name = "opsdesk")]
#[command(version, about = "opsdesk access-control inspector", long_about = None)]
struct Cli {
    /// Project directory holding .opsdesk/access.json
    #[arg(short = 'd', long, global = true, env = "OPSDESK_PROJECT_DIR")]
    project_dir: Option<PathBuf>,

    /// JSON role registry replacing the builtin one
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Honour --as-role testing overrides
    #[arg(long, global = true)]
    allow_role_override: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    action: AccessAction,
}

/// Layer CLI arguments over file and environment configuration.
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config =
        config::load_config(cli.project_dir.as_deref()).context("Failed to load configuration")?;
    if let Some(registry) = &cli.registry {
        config.access.registry_path = Some(registry.clone());
    }
    if cli.allow_role_override {
        config.access.allow_role_override = true;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    tracing_init::init_tracing(&config.logging)?;
    debug!(version = env!("CARGO_PKG_VERSION"), "Starting opsdesk CLI");

    let policy = config
        .access
        .build_policy()
        .context("Failed to build access policy")?;
    let ctx = AccessContext {
        policy: &policy,
        resolver: config.access.resolver(),
        default_mode: config.access.default_mode,
        json: cli.json,
    };

    let stdout = io::stdout();
    access_cmd::run(&ctx, cli.action, &mut stdout.lock())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use opsdesk_core::rbac::{AccountMode, Capability, RoleRegistry};

    #[test]
    fn parses_capability_and_mode() {
        let cli = Cli::try_parse_from([
            "opsdesk",
            "can",
            "--role",
            "staff",
            "--mode",
            "internal",
            "create_pos_sale",
        ])
        .unwrap();
        assert!(matches!(
            cli.action,
            AccessAction::Can {
                mode: Some(AccountMode::Internal),
                capability: Capability::CreatePosSale,
                ..
            }
        ));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "opsdesk",
            "can",
            "--role",
            "owner",
            "view_sales",
            "--json",
            "--log-level",
            "debug",
            "--allow-role-override",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(cli.allow_role_override);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn rejects_unknown_capability() {
        let result = Cli::try_parse_from(["opsdesk", "can", "--role", "staff", "fly"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "opsdesk",
            "--project-dir",
            dir.path().to_str().unwrap(),
            "--allow-role-override",
            "--log-level",
            "trace",
            "roles",
        ])
        .unwrap();

        let config = resolve_config(&cli).unwrap();
        assert!(config.access.allow_role_override);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn project_registry_feeds_the_policy() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join(".opsdesk");
        std::fs::create_dir_all(&project).unwrap();

        let roles: Vec<_> = RoleRegistry::builtin()
            .roles()
            .cloned()
            .map(|mut r| {
                r.capabilities.remove(&Capability::InviteUsers);
                r
            })
            .collect();
        std::fs::write(
            project.join("roles.json"),
            serde_json::to_string(&roles).unwrap(),
        )
        .unwrap();
        std::fs::write(
            project.join("access.json"),
            r#"{"access":{"registry_path":"roles.json"}}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "opsdesk",
            "--project-dir",
            dir.path().to_str().unwrap(),
            "roles",
        ])
        .unwrap();
        let policy = resolve_config(&cli).unwrap().access.build_policy().unwrap();
        assert!(!policy.can_invite_users("owner"));
    }
}
