//! The verified identity on whose behalf an operation runs.

use super::{Error, UserId, UserRole};

/// Authenticated caller resolved from the request's verified identity.
///
/// Every service operation that needs an identity takes an `Actor`
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    role: UserRole,
}

impl Actor {
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub const fn role(&self) -> UserRole {
        self.role
    }

    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Fail with [`crate::domain::ErrorCode::Forbidden`] unless the actor is
    /// an administrator.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("admin access required"))
        }
    }
}
