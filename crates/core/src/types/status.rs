//! Status and role enums.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Order lifecycle status.
///
/// The API reports statuses as free-form strings; the known values are
/// matched case-insensitively and anything else is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    /// Placed, awaiting fulfilment. Only pending orders can be cancelled.
    #[default]
    Pending,
    /// Fulfilled.
    Completed,
    /// Cancelled by the customer or an admin.
    Cancelled,
    /// Closed by an admin.
    Closed,
    /// A status this client does not know about.
    Other(String),
}

impl OrderStatus {
    /// Parse a status string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            "closed" => Self::Closed,
            _ => Self::Other(s.to_owned()),
        }
    }

    /// The wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Closed => "closed",
            Self::Other(s) => s,
        }
    }

    /// Whether the order can still be cancelled.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// User role discriminator.
///
/// Only `admin` grants access to the admin panel; every other value is a
/// regular customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum UserRole {
    /// Store administrator.
    Admin,
    /// Any non-admin role, keeping the original string.
    Customer(String),
    /// No role reported.
    #[default]
    Unspecified,
}

impl UserRole {
    /// Whether this role grants admin access.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::Customer(role) => f.write_str(role),
            Self::Unspecified => Ok(()),
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "admin" => Self::Admin,
            "" => Self::Unspecified,
            _ => Self::Customer(s),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_case_insensitive() {
        assert_eq!(OrderStatus::parse("Pending"), OrderStatus::Pending);
        assert_eq!(OrderStatus::parse("CANCELLED"), OrderStatus::Cancelled);
        assert_eq!(
            OrderStatus::parse("shipped"),
            OrderStatus::Other("shipped".to_string())
        );
    }

    #[test]
    fn test_order_status_serde() {
        let status: OrderStatus = serde_json::from_str("\"Completed\"").unwrap();
        assert_eq!(status, OrderStatus::Completed);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"completed\"");
    }

    #[test]
    fn test_only_pending_is_cancellable() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(!OrderStatus::Closed.is_cancellable());
        assert!(!OrderStatus::Other("x".into()).is_cancellable());
    }

    #[test]
    fn test_user_role() {
        let admin: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert!(admin.is_admin());

        let user: UserRole = serde_json::from_str("\"user\"").unwrap();
        assert!(!user.is_admin());
        assert_eq!(serde_json::to_string(&user).unwrap(), "\"user\"");
    }
}
