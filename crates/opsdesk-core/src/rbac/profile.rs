//! One-call access snapshot for UI guards.

use std::collections::BTreeSet;

use serde::Serialize;

use super::engine::AccessPolicy;
use super::types::{AccountMode, Capability, ModuleId, RoleId, RoleRef};

/// Everything a client needs to render navigation and action buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessProfile {
    /// Resolved role, `None` when the input named no known role.
    pub role: Option<RoleId>,
    pub mode: AccountMode,
    pub modules: BTreeSet<ModuleId>,
    /// Capabilities after the account-mode mask.
    pub capabilities: BTreeSet<Capability>,
    pub can_use_pos: bool,
    pub can_use_storefront: bool,
    pub can_invite_users: bool,
    pub can_remove_users: bool,
}

impl AccessPolicy {
    /// Snapshot every decision for `role` under `mode`.
    pub fn profile(&self, role: impl RoleRef, mode: AccountMode) -> AccessProfile {
        let role = self.registry().get(role).map(|r| r.id);
        AccessProfile {
            role,
            mode,
            modules: self.accessible_modules(role, mode),
            capabilities: self.available_capabilities(role, mode),
            can_use_pos: self.can_use_pos(role, mode),
            can_use_storefront: self.can_use_storefront(role, mode),
            can_invite_users: self.can_invite_users(role),
            can_remove_users: self.can_remove_user(role),
        }
    }
}
