//! Access decision engine.
//!
//! Evaluates a role and account mode against a [`RoleRegistry`] and
//! [`RouteTable`]. Every decision is a pure function of its arguments and
//! the immutable policy; unknown roles degrade to zero privilege.
//!
//! Account mode never changes which modules a role can open. It only masks
//! capabilities inside those modules (see [`BLOCKED_IN_INTERNAL`]).

use std::collections::BTreeSet;

use serde::Serialize;

use super::registry::RoleRegistry;
use super::routes::RouteTable;
use super::types::{AccountMode, BLOCKED_IN_INTERNAL, Capability, ModuleId, RoleId, RoleRef};

/// Why a capability check came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityDecision {
    /// The role holds the capability and the mode does not mask it.
    Granted,
    /// The role is not in the registry.
    UnknownRole,
    /// The role exists but was never granted the capability.
    NotGranted,
    /// The role holds the capability but the account mode masks it.
    BlockedByMode,
}

impl CapabilityDecision {
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Role registry plus route table: everything a decision depends on besides
/// the caller's arguments.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    registry: RoleRegistry,
    routes: RouteTable,
}

impl AccessPolicy {
    pub const fn new(registry: RoleRegistry, routes: RouteTable) -> Self {
        Self { registry, routes }
    }

    /// Policy over the builtin registry and route table.
    pub fn builtin() -> Self {
        Self::new(RoleRegistry::builtin(), RouteTable::builtin())
    }

    pub const fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    /// Modules the role may open. The mode is accepted for symmetry with the
    /// other checks but never narrows the result.
    pub fn accessible_modules(&self, role: impl RoleRef, _mode: AccountMode) -> BTreeSet<ModuleId> {
        self.registry
            .get(role)
            .map(|r| r.modules.clone())
            .unwrap_or_default()
    }

    pub fn can_access_module(
        &self,
        role: impl RoleRef,
        mode: AccountMode,
        module: ModuleId,
    ) -> bool {
        self.accessible_modules(role, mode).contains(&module)
    }

    /// Raw registry grant, ignoring account mode.
    pub fn has_capability(&self, role: impl RoleRef, capability: Capability) -> bool {
        self.registry
            .get(role)
            .is_some_and(|r| r.capabilities.contains(&capability))
    }

    /// Explain whether `capability` is usable by `role` under `mode`.
    pub fn capability_decision(
        &self,
        role: impl RoleRef,
        mode: AccountMode,
        capability: Capability,
    ) -> CapabilityDecision {
        let Some(role) = self.registry.get(role) else {
            return CapabilityDecision::UnknownRole;
        };
        if !role.capabilities.contains(&capability) {
            return CapabilityDecision::NotGranted;
        }
        if capability.is_blocked_in(mode) {
            return CapabilityDecision::BlockedByMode;
        }
        CapabilityDecision::Granted
    }

    /// Role grant first, then the account-mode mask.
    pub fn is_capability_available(
        &self,
        role: impl RoleRef,
        mode: AccountMode,
        capability: Capability,
    ) -> bool {
        self.capability_decision(role, mode, capability).is_allowed()
    }

    /// Granted capabilities with the mode mask applied.
    pub fn available_capabilities(
        &self,
        role: impl RoleRef,
        mode: AccountMode,
    ) -> BTreeSet<Capability> {
        let Some(role) = self.registry.get(role) else {
            return BTreeSet::new();
        };
        match mode {
            AccountMode::Commerce => role.capabilities.clone(),
            AccountMode::Internal => role
                .capabilities
                .iter()
                .copied()
                .filter(|c| !BLOCKED_IN_INTERNAL.contains(c))
                .collect(),
        }
    }

    /// Module gating `path`, or `None` for ungated routes.
    pub fn module_for_route(&self, path: &str) -> Option<ModuleId> {
        self.routes.module_for(path)
    }

    /// Ungated routes are open to everyone; gated ones defer to module access.
    pub fn can_access_route(&self, role: impl RoleRef, mode: AccountMode, path: &str) -> bool {
        match self.module_for_route(path) {
            None => true,
            Some(module) => self.can_access_module(role, mode, module),
        }
    }

    pub fn can_use_pos(&self, role: impl RoleRef, mode: AccountMode) -> bool {
        self.is_capability_available(role, mode, Capability::CreatePosSale)
    }

    pub fn can_use_storefront(&self, role: impl RoleRef, mode: AccountMode) -> bool {
        self.is_capability_available(role, mode, Capability::PublishStorefront)
    }

    pub fn can_invite_users(&self, role: impl RoleRef) -> bool {
        self.has_capability(role, Capability::InviteUsers)
    }

    /// Whether `acting` may change `target`'s role to `new_role`.
    ///
    /// Anything touching ownership (granting it or changing an owner) needs
    /// an owner. Other changes need an owner or admin.
    #[allow(clippy::unused_self)]
    pub fn can_manage_user_role(
        &self,
        acting: impl RoleRef,
        target: impl RoleRef,
        new_role: impl RoleRef,
    ) -> bool {
        let acting = acting.role_id();
        let touches_owner =
            target.role_id() == Some(RoleId::Owner) || new_role.role_id() == Some(RoleId::Owner);
        if touches_owner {
            return acting == Some(RoleId::Owner);
        }
        matches!(acting, Some(RoleId::Owner | RoleId::Admin))
    }

    /// Only owners remove members.
    #[allow(clippy::unused_self)]
    pub fn can_remove_user(&self, acting: impl RoleRef) -> bool {
        acting.role_id() == Some(RoleId::Owner)
    }
}
