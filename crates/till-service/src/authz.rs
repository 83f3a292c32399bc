//! Actor identity and authorization gating.
//!
//! The core never checks who is calling; the facade gates staff-only
//! commands here before any state is touched.

use serde::{Deserialize, Serialize};
use till_core::error::ShopError;
use till_core::ids::UserId;

/// What an actor is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Role {
    /// A regular server member: browse, manage their own cart, check
    /// out, close their own ticket.
    #[default]
    Member,
    /// Shop staff: everything a member can, plus catalog management and
    /// closing any ticket.
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Staff => "staff",
        }
    }
}

/// The identity behind a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Who is acting.
    pub user: UserId,
    /// Their role.
    pub role: Role,
}

impl Actor {
    /// A regular member.
    pub fn member(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            role: Role::Member,
        }
    }

    /// A staff actor.
    pub fn staff(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            role: Role::Staff,
        }
    }

    /// Check that this actor is staff; names the refused action.
    pub fn require_staff(&self, action: &str) -> Result<(), ShopError> {
        if self.role == Role::Staff {
            Ok(())
        } else {
            Err(ShopError::Unauthorized(format!(
                "{} requires staff",
                action
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_staff() {
        let staff = Actor::staff("admin");
        assert!(staff.require_staff("add item").is_ok());

        let member = Actor::member("u1");
        let err = member.require_staff("add item").unwrap_err();
        assert_eq!(
            err,
            ShopError::Unauthorized("add item requires staff".to_string())
        );
    }
}
