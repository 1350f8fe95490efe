//! `opsdesk` Core Library
//!
//! Access control for the opsdesk business suite:
//! - Role registry and closed role/module/capability identifiers
//! - Pure decision functions over role, account mode and route
//! - Effective-role resolution for testing overrides
//! - Configuration resolution and hierarchy
//! - Common error types

pub mod config;
pub mod error;
pub mod rbac;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use rbac::{AccessPolicy, AccountMode, Capability, ModuleId, RoleId};
