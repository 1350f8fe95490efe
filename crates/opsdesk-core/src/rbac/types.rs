//! Closed identifier types for the access-control engine.
//!
//! Every identifier is a fieldless enum serialised as its `snake_case` name.
//! Adding a variant forces every `match` over it to be revisited.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Generates a closed identifier enum with its wire name, `ALL` listing,
/// `Display` and `FromStr`.
///
/// `$err` is the [`Error`] variant returned when parsing an unknown name.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $err:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant ),+ ];

            /// Wire name of this identifier.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(Error::$err(other.to_string())),
                }
            }
        }
    };
}

closed_enum! {
    /// Predefined role a tenant member can hold.
    RoleId, UnknownRole {
        /// Tenant owner. The only role that can grant or revoke ownership.
        Owner => "owner",
        Admin => "admin",
        Manager => "manager",
        Staff => "staff",
        /// Read-only member; also the fallback when no user is present.
        Viewer => "viewer",
    }
}

closed_enum! {
    /// Top-level feature area.
    ModuleId, UnknownModule {
        Commerce => "commerce",
        Finance => "finance",
        Mealflow => "mealflow",
        System => "system",
    }
}

closed_enum! {
    /// Fine-grained action a role may be granted.
    Capability, UnknownCapability {
        // commerce
        ViewProducts => "view_products",
        EditProducts => "edit_products",
        ManageInventory => "manage_inventory",
        CreatePosSale => "create_pos_sale",
        ViewSales => "view_sales",
        RefundSales => "refund_sales",
        ManageCustomers => "manage_customers",
        PublishStorefront => "publish_storefront",
        // finance
        ViewFinance => "view_finance",
        EditTransactions => "edit_transactions",
        ManageBudgets => "manage_budgets",
        ExportReports => "export_reports",
        // mealflow
        ViewRecipes => "view_recipes",
        EditRecipes => "edit_recipes",
        PlanMeals => "plan_meals",
        ManageShoppingLists => "manage_shopping_lists",
        // system
        ManageUsers => "manage_users",
        InviteUsers => "invite_users",
        ManageSettings => "manage_settings",
        ManageBilling => "manage_billing",
    }
}

closed_enum! {
    /// Per-tenant operating mode.
    #[derive(Default)]
    AccountMode, UnknownMode {
        /// Full feature set.
        #[default]
        Commerce => "commerce",
        /// No point-of-sale or storefront publishing.
        Internal => "internal",
    }
}

/// Capabilities suppressed for every role while the account is in
/// [`AccountMode::Internal`].
pub const BLOCKED_IN_INTERNAL: &[Capability] =
    &[Capability::CreatePosSale, Capability::PublishStorefront];

impl Capability {
    /// Whether `mode` masks this capability regardless of role grants.
    pub fn is_blocked_in(self, mode: AccountMode) -> bool {
        match mode {
            AccountMode::Commerce => false,
            AccountMode::Internal => BLOCKED_IN_INTERNAL.contains(&self),
        }
    }
}

/// Anything that can name a role in a lookup.
///
/// Membership records hand roles over as raw strings, so lookups accept both
/// typed ids and strings. A string that does not name a role resolves to
/// `None`, which every decision treats as zero privilege.
pub trait RoleRef {
    /// The role this value names, if any.
    fn role_id(&self) -> Option<RoleId>;
}

impl RoleRef for RoleId {
    fn role_id(&self) -> Option<RoleId> {
        Some(*self)
    }
}

impl RoleRef for Option<RoleId> {
    fn role_id(&self) -> Option<RoleId> {
        *self
    }
}

impl RoleRef for str {
    fn role_id(&self) -> Option<RoleId> {
        self.parse().ok()
    }
}

impl RoleRef for String {
    fn role_id(&self) -> Option<RoleId> {
        self.as_str().role_id()
    }
}

impl<T: RoleRef + ?Sized> RoleRef for &T {
    fn role_id(&self) -> Option<RoleId> {
        (**self).role_id()
    }
}
