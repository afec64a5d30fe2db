//! Role gate: a pure membership check of the caller's role against the role
//! set an endpoint allows.

use crate::errors::AppError;
use crate::models::user::Role;

/// Compact set of roles, built at compile time per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const fn empty() -> Self {
        RoleSet(0)
    }

    pub const fn with(self, role: Role) -> Self {
        RoleSet(self.0 | Self::bit(role))
    }

    pub const fn contains(&self, role: Role) -> bool {
        self.0 & Self::bit(role) != 0
    }

    const fn bit(role: Role) -> u8 {
        match role {
            Role::User => 0b001,
            Role::Recruiter => 0b010,
            Role::Admin => 0b100,
        }
    }

    fn describe(&self) -> String {
        Role::ALL
            .iter()
            .filter(|r| self.contains(**r))
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

pub const APPLICANTS: RoleSet = RoleSet::empty().with(Role::User);
pub const RECRUITERS: RoleSet = RoleSet::empty().with(Role::Recruiter);
pub const ADMINS: RoleSet = RoleSet::empty().with(Role::Admin);
pub const APPLICATION_PARTIES: RoleSet = RoleSet::empty().with(Role::User).with(Role::Recruiter);

/// Permits `role` only if it belongs to `allowed`.
pub fn authorize(role: Role, allowed: RoleSet) -> Result<(), AppError> {
    if allowed.contains(role) {
        Ok(())
    } else {
        tracing::warn!("role '{role}' rejected, requires {}", allowed.describe());
        Err(AppError::forbidden("Unauthorized to access this route"))
    }
}
