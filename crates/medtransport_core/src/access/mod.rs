//! Authorization seam for scheduling reads.
//!
//! # Responsibility
//! - Define the contract the scheduling service calls before every read.
//! - Provide an in-process, default-deny grant table for tools and tests.
//!
//! # Invariants
//! - A user/permission pair without an explicit grant is denied.
//! - Checks are side-effect free from the caller's point of view.

pub mod permission;

use permission::Permission;
use std::collections::{BTreeMap, BTreeSet};

/// Identifier of an application user.
pub type UserId = i64;

/// Answers whether a user holds a named permission.
pub trait PermissionChecker {
    fn check_permission(&self, user_id: UserId, permission: Permission) -> bool;
}

impl<F> PermissionChecker for F
where
    F: Fn(UserId, Permission) -> bool,
{
    fn check_permission(&self, user_id: UserId, permission: Permission) -> bool {
        self(user_id, permission)
    }
}

/// Explicit user grants held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantTable {
    grants: BTreeMap<UserId, BTreeSet<Permission>>,
}

impl GrantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `permission` to `user_id`. Granting twice is a no-op.
    pub fn grant(&mut self, user_id: UserId, permission: Permission) {
        self.grants.entry(user_id).or_default().insert(permission);
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl PermissionChecker for GrantTable {
    fn check_permission(&self, user_id: UserId, permission: Permission) -> bool {
        self.grants
            .get(&user_id)
            .is_some_and(|permissions| permissions.contains(&permission))
    }
}
