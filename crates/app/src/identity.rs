//! Identity
//!
//! The engine never authenticates. Callers hand it an already validated
//! [`Actor`], and services use it for ownership and staff checks.

use std::{fmt, str::FromStr};

use fulfilment::parse::UnknownValue;

use crate::uuids::TypedUuid;

/// User Record
#[derive(Debug)]
pub struct UserRecord;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// Role of the acting user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    User,
    Manager,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Managers and admins may act on other users' orders and payments.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownValue::new("role", value)),
        }
    }
}

/// The user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user: UserUuid,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(user: UserUuid, role: Role) -> Self {
        Self { user, role }
    }

    /// Whether the actor owns a resource or is staff.
    #[must_use]
    pub fn can_access(&self, owner: UserUuid) -> bool {
        self.user == owner || self.role.is_staff()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn roles_parse_case_insensitively() -> TestResult {
        assert_eq!("Admin".parse::<Role>()?, Role::Admin);
        assert_eq!("manager".parse::<Role>()?, Role::Manager);
        assert!("root".parse::<Role>().is_err());

        Ok(())
    }

    #[test]
    fn staff_can_access_other_users_resources() {
        let owner = UserUuid::new();

        assert!(Actor::new(owner, Role::User).can_access(owner));
        assert!(!Actor::new(UserUuid::new(), Role::User).can_access(owner));
        assert!(Actor::new(UserUuid::new(), Role::Manager).can_access(owner));
        assert!(Actor::new(UserUuid::new(), Role::Admin).can_access(owner));
    }
}
