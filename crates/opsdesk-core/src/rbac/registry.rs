//! Role registry: the fixed mapping from every [`RoleId`] to its [`Role`].
//!
//! A registry is built once (either the builtin table or an injected one)
//! and exposes no mutation afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{Capability, ModuleId, RoleId, RoleRef};
use crate::error::{Error, Result};

/// Predefined role record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    /// Display label.
    pub name: String,
    pub description: String,
    /// Modules this role may open.
    #[serde(default)]
    pub modules: BTreeSet<ModuleId>,
    /// Capabilities granted to this role.
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

/// Immutable mapping from every role id to exactly one role.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: BTreeMap<RoleId, Role>,
}

impl RoleRegistry {
    /// The registry shipped with the application.
    pub fn builtin() -> Self {
        let roles = RoleId::ALL
            .iter()
            .map(|&id| (id, builtin_role(id)))
            .collect();
        Self { roles }
    }

    /// Build a registry from externally supplied roles.
    ///
    /// Every [`RoleId`] must appear exactly once.
    pub fn from_roles(roles: Vec<Role>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for role in roles {
            let id = role.id;
            if map.insert(id, role).is_some() {
                return Err(Error::Registry(format!("role '{id}' is defined more than once")));
            }
        }

        let missing: Vec<&str> = RoleId::ALL
            .iter()
            .filter(|id| !map.contains_key(*id))
            .map(|id| id.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Registry(format!(
                "missing role definitions: {}",
                missing.join(", ")
            )));
        }

        debug!(roles = map.len(), "Role registry built");
        Ok(Self { roles: map })
    }

    /// Load a registry from a JSON array of roles.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read role registry {}: {}", path.display(), e))
        })?;
        let roles: Vec<Role> = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse role registry {}: {}", path.display(), e))
        })?;
        Self::from_roles(roles)
    }

    /// Look up a role. Unknown ids yield `None`.
    pub fn get(&self, role: impl RoleRef) -> Option<&Role> {
        let found = role.role_id().and_then(|id| self.roles.get(&id));
        if found.is_none() {
            tracing::trace!("Role lookup missed, treating as zero privilege");
        }
        found
    }

    /// All roles, ordered by id.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_role(id: RoleId) -> Role {
    use Capability as C;
    use ModuleId as M;

    match id {
        RoleId::Owner => role(
            id,
            "Owner",
            "Full control of the account, including billing and ownership",
            M::ALL,
            C::ALL,
        ),
        RoleId::Admin => role(
            id,
            "Administrator",
            "Manages every module and the team, except billing",
            M::ALL,
            &[
                C::ViewProducts,
                C::EditProducts,
                C::ManageInventory,
                C::CreatePosSale,
                C::ViewSales,
                C::RefundSales,
                C::ManageCustomers,
                C::PublishStorefront,
                C::ViewFinance,
                C::EditTransactions,
                C::ManageBudgets,
                C::ExportReports,
                C::ViewRecipes,
                C::EditRecipes,
                C::PlanMeals,
                C::ManageShoppingLists,
                C::ManageUsers,
                C::InviteUsers,
                C::ManageSettings,
            ],
        ),
        RoleId::Manager => role(
            id,
            "Manager",
            "Runs day-to-day commerce, finance and meal planning",
            &[M::Commerce, M::Finance, M::Mealflow],
            &[
                C::ViewProducts,
                C::EditProducts,
                C::ManageInventory,
                C::CreatePosSale,
                C::ViewSales,
                C::RefundSales,
                C::ManageCustomers,
                C::PublishStorefront,
                C::ViewFinance,
                C::EditTransactions,
                C::ManageBudgets,
                C::ExportReports,
                C::ViewRecipes,
                C::EditRecipes,
                C::PlanMeals,
                C::ManageShoppingLists,
            ],
        ),
        RoleId::Staff => role(
            id,
            "Staff",
            "Rings up sales and helps with meal planning",
            &[M::Commerce, M::Mealflow],
            &[
                C::ViewProducts,
                C::CreatePosSale,
                C::ViewSales,
                C::ManageCustomers,
                C::ViewRecipes,
                C::PlanMeals,
                C::ManageShoppingLists,
            ],
        ),
        RoleId::Viewer => role(
            id,
            "Viewer",
            "Read-only access to products, sales, finance and recipes",
            &[M::Commerce, M::Finance, M::Mealflow],
            &[C::ViewProducts, C::ViewSales, C::ViewFinance, C::ViewRecipes],
        ),
    }
}

fn role(
    id: RoleId,
    name: &str,
    description: &str,
    modules: &[ModuleId],
    capabilities: &[Capability],
) -> Role {
    Role {
        id,
        name: name.to_string(),
        description: description.to_string(),
        modules: modules.iter().copied().collect(),
        capabilities: capabilities.iter().copied().collect(),
    }
}
