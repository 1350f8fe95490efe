//! Role-based access control.
//!
//! [`AccessPolicy`] owns the decision logic. The free functions in this
//! module evaluate against the builtin policy, which is built on first use
//! and read-only for the rest of the process.

pub mod effective;
pub mod engine;
pub mod profile;
pub mod registry;
pub mod routes;
pub mod types;

use std::collections::BTreeSet;
use std::sync::LazyLock;

pub use effective::{
    DEFAULT_ROLE, EffectiveRole, EffectiveRoleResolver, RoleSource, resolve_effective_role,
};
pub use engine::{AccessPolicy, CapabilityDecision};
pub use profile::AccessProfile;
pub use registry::{Role, RoleRegistry};
pub use routes::{RouteEntry, RouteTable};
pub use types::{AccountMode, BLOCKED_IN_INTERNAL, Capability, ModuleId, RoleId, RoleRef};

static BUILTIN: LazyLock<AccessPolicy> = LazyLock::new(AccessPolicy::builtin);

/// The process-wide builtin policy.
pub fn builtin_policy() -> &'static AccessPolicy {
    &BUILTIN
}

pub fn accessible_modules(role: impl RoleRef, mode: AccountMode) -> BTreeSet<ModuleId> {
    BUILTIN.accessible_modules(role, mode)
}

pub fn can_access_module(role: impl RoleRef, mode: AccountMode, module: ModuleId) -> bool {
    BUILTIN.can_access_module(role, mode, module)
}

pub fn has_capability(role: impl RoleRef, capability: Capability) -> bool {
    BUILTIN.has_capability(role, capability)
}

pub fn is_capability_available(
    role: impl RoleRef,
    mode: AccountMode,
    capability: Capability,
) -> bool {
    BUILTIN.is_capability_available(role, mode, capability)
}

pub fn available_capabilities(role: impl RoleRef, mode: AccountMode) -> BTreeSet<Capability> {
    BUILTIN.available_capabilities(role, mode)
}

pub fn module_for_route(path: &str) -> Option<ModuleId> {
    BUILTIN.module_for_route(path)
}

pub fn can_access_route(role: impl RoleRef, mode: AccountMode, path: &str) -> bool {
    BUILTIN.can_access_route(role, mode, path)
}

pub fn can_use_pos(role: impl RoleRef, mode: AccountMode) -> bool {
    BUILTIN.can_use_pos(role, mode)
}

pub fn can_use_storefront(role: impl RoleRef, mode: AccountMode) -> bool {
    BUILTIN.can_use_storefront(role, mode)
}

pub fn can_manage_user_role(
    acting: impl RoleRef,
    target: impl RoleRef,
    new_role: impl RoleRef,
) -> bool {
    BUILTIN.can_manage_user_role(acting, target, new_role)
}

pub fn can_remove_user(acting: impl RoleRef) -> bool {
    BUILTIN.can_remove_user(acting)
}

pub fn can_invite_users(role: impl RoleRef) -> bool {
    BUILTIN.can_invite_users(role)
}
