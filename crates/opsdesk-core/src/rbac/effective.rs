//! Effective role resolution.
//!
//! The role used for a decision is the testing override when one is given,
//! otherwise the member's assigned role, otherwise [`DEFAULT_ROLE`]. The
//! override is always an explicit argument and only shapes UI guards; server
//! handlers re-derive the assigned role from the session and never pass one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::RoleId;

/// Role used when no user is present.
pub const DEFAULT_ROLE: RoleId = RoleId::Viewer;

/// Which input supplied the effective role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSource {
    /// Testing override.
    Override,
    /// The member's assigned role.
    Assigned,
    /// Fallback when no user is present.
    Default,
}

/// Role selected for a decision, with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveRole {
    pub role: RoleId,
    pub source: RoleSource,
}

/// Apply the override → assigned → default precedence.
pub fn resolve_effective_role(
    assigned: Option<RoleId>,
    override_role: Option<RoleId>,
) -> EffectiveRole {
    if let Some(role) = override_role {
        return EffectiveRole {
            role,
            source: RoleSource::Override,
        };
    }
    assigned.map_or(
        EffectiveRole {
            role: DEFAULT_ROLE,
            source: RoleSource::Default,
        },
        |role| EffectiveRole {
            role,
            source: RoleSource::Assigned,
        },
    )
}

/// Effective-role resolution gated on whether overrides are permitted in
/// this deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectiveRoleResolver {
    allow_override: bool,
}

impl EffectiveRoleResolver {
    pub const fn new(allow_override: bool) -> Self {
        Self { allow_override }
    }

    pub const fn allows_override(&self) -> bool {
        self.allow_override
    }

    /// Resolve the effective role, dropping the override when not permitted.
    pub fn resolve(
        &self,
        assigned: Option<RoleId>,
        override_role: Option<RoleId>,
    ) -> EffectiveRole {
        if !self.allow_override {
            if let Some(ignored) = override_role {
                debug!(%ignored, "Role override not permitted, ignoring");
            }
            return resolve_effective_role(assigned, None);
        }
        resolve_effective_role(assigned, override_role)
    }
}
