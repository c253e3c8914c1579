//! Account roles.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role attached to a user profile.
///
/// Customers book services, technicians carry out jobs, admins run the
/// operations console. Roles this client does not know decode as
/// `Unknown` and get customer-level access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Customer,
    Technician,
    Admin,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    /// Wire representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Technician => "technician",
            Self::Admin => "admin",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the role may use the operations console.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Technician | Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UserRoleParseError(pub String);

impl FromStr for UserRole {
    type Err = UserRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "technician" => Ok(Self::Technician),
            "admin" => Ok(Self::Admin),
            _ => Err(UserRoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [UserRole::Customer, UserRole::Technician, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_wire_form() {
        let role: UserRole = serde_json::from_str("\"technician\"").unwrap();
        assert_eq!(role, UserRole::Technician);
        assert!(role.is_staff());
        assert!(!UserRole::Customer.is_staff());
    }

    #[test]
    fn test_unrecognised_role_decodes_as_unknown() {
        let role: UserRole = serde_json::from_str("\"super_admin\"").unwrap();
        assert_eq!(role, UserRole::Unknown);
        assert!(!role.is_staff());
        assert!("super_admin".parse::<UserRole>().is_err());

        let stored = serde_json::to_string(&role).unwrap();
        assert_eq!(serde_json::from_str::<UserRole>(&stored).unwrap(), UserRole::Unknown);
    }
}
