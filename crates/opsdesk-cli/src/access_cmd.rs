//! CLI access subcommands.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::Write;

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;

use opsdesk_core::rbac::{
    AccessPolicy, AccountMode, Capability, CapabilityDecision, EffectiveRoleResolver, ModuleId,
    RoleId, RoleRef,
};

/// Access subcommand actions.
#[derive(Subcommand, Debug)]
pub enum AccessAction {
    /// List every role in the registry
    Roles,
    /// Modules a role can open
    Modules {
        /// Role id (unknown ids have no access)
        #[arg(long)]
        role: String,
        /// Account mode: commerce or internal
        #[arg(long)]
        mode: Option<AccountMode>,
    },
    /// Whether a role can use a capability
    Can {
        #[arg(long)]
        role: String,
        #[arg(long)]
        mode: Option<AccountMode>,
        /// Capability, e.g. create_pos_sale
        capability: Capability,
    },
    /// Whether a role can open a route
    Route {
        #[arg(long)]
        role: String,
        #[arg(long)]
        mode: Option<AccountMode>,
        /// Application path, e.g. /commerce/pos
        path: String,
    },
    /// Full access snapshot for the effective role
    Profile {
        /// Assigned role (defaults to viewer when absent)
        #[arg(long)]
        role: Option<RoleId>,
        /// Testing override, honoured only when overrides are allowed
        #[arg(long = "as-role")]
        as_role: Option<RoleId>,
        #[arg(long)]
        mode: Option<AccountMode>,
    },
    /// Whether one member can change another's role
    Manage {
        #[arg(long)]
        acting: String,
        #[arg(long)]
        target: String,
        #[arg(long = "new")]
        new_role: String,
    },
    /// Whether a member can remove others
    Remove {
        #[arg(long)]
        acting: String,
    },
}

/// Shared inputs for every access command.
pub struct AccessContext<'a> {
    pub policy: &'a AccessPolicy,
    pub resolver: EffectiveRoleResolver,
    pub default_mode: AccountMode,
    pub json: bool,
}

#[derive(Serialize)]
struct CapabilityReport<'a> {
    role: &'a str,
    mode: AccountMode,
    capability: Capability,
    allowed: bool,
    decision: CapabilityDecision,
}

#[derive(Serialize)]
struct RouteReport<'a> {
    role: &'a str,
    mode: AccountMode,
    path: &'a str,
    module: Option<ModuleId>,
    allowed: bool,
}

/// Run an access subcommand, writing its result to `out`.
pub fn run(ctx: &AccessContext<'_>, action: AccessAction, out: &mut impl Write) -> Result<()> {
    let policy = ctx.policy;
    match action {
        AccessAction::Roles => {
            let roles: Vec<_> = policy.registry().roles().collect();
            if ctx.json {
                return write_json(out, &roles);
            }
            for role in roles {
                writeln!(out, "{:<8} {} - {}", role.id, role.name, role.description)?;
                writeln!(out, "  modules:      {}", join(role.modules.iter()))?;
                writeln!(out, "  capabilities: {}", join(role.capabilities.iter()))?;
            }
        }
        AccessAction::Modules { role, mode } => {
            let mode = mode.unwrap_or(ctx.default_mode);
            let modules = policy.accessible_modules(role.as_str(), mode);
            if ctx.json {
                return write_json(out, &modules);
            }
            if modules.is_empty() {
                writeln!(out, "(none)")?;
            } else {
                writeln!(out, "{}", join(modules.iter()))?;
            }
        }
        AccessAction::Can {
            role,
            mode,
            capability,
        } => {
            let mode = mode.unwrap_or(ctx.default_mode);
            let decision = policy.capability_decision(role.as_str(), mode, capability);
            if ctx.json {
                return write_json(
                    out,
                    &CapabilityReport {
                        role: &role,
                        mode,
                        capability,
                        allowed: decision.is_allowed(),
                        decision,
                    },
                );
            }
            writeln!(
                out,
                "{}: {capability} for {role} in {mode} mode ({})",
                verdict(decision.is_allowed()),
                describe(decision)
            )?;
        }
        AccessAction::Route { role, mode, path } => {
            let mode = mode.unwrap_or(ctx.default_mode);
            let module = policy.module_for_route(&path);
            let allowed = policy.can_access_route(role.as_str(), mode, &path);
            if ctx.json {
                return write_json(
                    out,
                    &RouteReport {
                        role: &role,
                        mode,
                        path: &path,
                        module,
                        allowed,
                    },
                );
            }
            let gate = module.map_or_else(|| "ungated".to_string(), |m| format!("module {m}"));
            writeln!(out, "{}: {path} ({gate}) for {role}", verdict(allowed))?;
        }
        AccessAction::Profile {
            role,
            as_role,
            mode,
        } => {
            let mode = mode.unwrap_or(ctx.default_mode);
            let effective = ctx.resolver.resolve(role, as_role);
            tracing::debug!(
                role = %effective.role,
                source = ?effective.source,
                "Resolved effective role"
            );
            let profile = policy.profile(effective.role, mode);
            if ctx.json {
                return write_json(
                    out,
                    &serde_json::json!({ "effective": effective, "profile": profile }),
                );
            }
            writeln!(
                out,
                "role:         {} ({:?})",
                effective.role, effective.source
            )?;
            writeln!(out, "mode:         {mode}")?;
            writeln!(out, "modules:      {}", join(profile.modules.iter()))?;
            writeln!(out, "capabilities: {}", join(profile.capabilities.iter()))?;
            writeln!(out, "pos:          {}", yes_no(profile.can_use_pos))?;
            writeln!(out, "storefront:   {}", yes_no(profile.can_use_storefront))?;
            writeln!(out, "invite users: {}", yes_no(profile.can_invite_users))?;
            writeln!(out, "remove users: {}", yes_no(profile.can_remove_users))?;
        }
        AccessAction::Manage {
            acting,
            target,
            new_role,
        } => {
            let allowed =
                policy.can_manage_user_role(acting.as_str(), target.as_str(), new_role.as_str());
            if ctx.json {
                return write_json(out, &serde_json::json!({ "allowed": allowed }));
            }
            writeln!(
                out,
                "{}: {acting} changing {target} to {new_role}",
                verdict(allowed)
            )?;
        }
        AccessAction::Remove { acting } => {
            let allowed = policy.can_remove_user(acting.as_str());
            if ctx.json {
                return write_json(out, &serde_json::json!({ "allowed": allowed }));
            }
            writeln!(out, "{}: {acting} removing members", verdict(allowed))?;
            if acting.as_str().role_id().is_none() {
                writeln!(out, "note: '{acting}' is not a known role")?;
            }
        }
    }
    Ok(())
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("Failed to serialize output")?;
    writeln!(out)?;
    Ok(())
}

fn join<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    let joined: Vec<String> = items.map(|i| i.to_string()).collect();
    if joined.is_empty() {
        "(none)".to_string()
    } else {
        joined.join(", ")
    }
}

const fn verdict(allowed: bool) -> &'static str {
    if allowed { "allowed" } else { "denied" }
}

const fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

const fn describe(decision: CapabilityDecision) -> &'static str {
    match decision {
        CapabilityDecision::Granted => "granted",
        CapabilityDecision::UnknownRole => "unknown role",
        CapabilityDecision::NotGranted => "not granted to role",
        CapabilityDecision::BlockedByMode => "blocked by account mode",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn render(action: AccessAction, json: bool, allow_override: bool) -> String {
        let policy = AccessPolicy::builtin();
        let ctx = AccessContext {
            policy: &policy,
            resolver: EffectiveRoleResolver::new(allow_override),
            default_mode: AccountMode::Commerce,
            json,
        };
        let mut out = Vec::new();
        run(&ctx, action, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn can_explains_mode_block() {
        let out = render(
            AccessAction::Can {
                role: "owner".into(),
                mode: Some(AccountMode::Internal),
                capability: Capability::CreatePosSale,
            },
            false,
            false,
        );
        assert_eq!(
            out,
            "denied: create_pos_sale for owner in internal mode (blocked by account mode)\n"
        );
    }

    #[test]
    fn can_json_reports_decision() {
        let out = render(
            AccessAction::Can {
                role: "ghost".into(),
                mode: None,
                capability: Capability::ViewProducts,
            },
            true,
            false,
        );
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["allowed"], false);
        assert_eq!(value["decision"], "unknown_role");
        assert_eq!(value["mode"], "commerce");
    }

    #[test]
    fn route_reports_gate() {
        let out = render(
            AccessAction::Route {
                role: "staff".into(),
                mode: None,
                path: "/finance/budgets".into(),
            },
            false,
            false,
        );
        assert_eq!(out, "denied: /finance/budgets (module finance) for staff\n");

        let out = render(
            AccessAction::Route {
                role: "staff".into(),
                mode: None,
                path: "/settings".into(),
            },
            false,
            false,
        );
        assert_eq!(out, "allowed: /settings (ungated) for staff\n");
    }

    #[test]
    fn modules_for_unknown_role() {
        let out = render(
            AccessAction::Modules {
                role: "ghost".into(),
                mode: None,
            },
            false,
            false,
        );
        assert_eq!(out, "(none)\n");
    }

    #[test]
    fn profile_honours_override_only_when_allowed() {
        let action = || AccessAction::Profile {
            role: Some(RoleId::Staff),
            as_role: Some(RoleId::Owner),
            mode: None,
        };

        let value: serde_json::Value =
            serde_json::from_str(&render(action(), true, false)).unwrap();
        assert_eq!(value["effective"]["role"], "staff");
        assert_eq!(value["effective"]["source"], "assigned");

        let value: serde_json::Value =
            serde_json::from_str(&render(action(), true, true)).unwrap();
        assert_eq!(value["effective"]["role"], "owner");
        assert_eq!(value["profile"]["can_remove_users"], true);
    }

    #[test]
    fn manage_and_remove() {
        let out = render(
            AccessAction::Manage {
                acting: "admin".into(),
                target: "owner".into(),
                new_role: "viewer".into(),
            },
            false,
            false,
        );
        assert_eq!(out, "denied: admin changing owner to viewer\n");

        let out = render(
            AccessAction::Remove {
                acting: "ghost".into(),
            },
            false,
            false,
        );
        assert!(out.starts_with("denied: ghost removing members\n"));
        assert!(out.contains("not a known role"));
    }

    #[test]
    fn roles_json_lists_registry() {
        let value: serde_json::Value =
            serde_json::from_str(&render(AccessAction::Roles, true, false)).unwrap();
        assert_eq!(value.as_array().unwrap().len(), RoleId::ALL.len());
    }
}
