//! User accounts and authentication payloads.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::{Email, UserId, UserRole};

/// A user profile as returned by the API and cached alongside the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

impl User {
    /// Whether this user may use the admin panel.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Response body of the login and signup endpoints.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(deserialize_with = "super::secret::deserialize")]
    pub token: SecretString,
    pub user: User,
}

/// Login credentials.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    #[serde(serialize_with = "super::secret::serialize")]
    pub password: SecretString,
}

/// Signup details.
#[derive(Debug, Serialize)]
pub struct SignupRequest {
    pub email: Email,
    #[serde(serialize_with = "super::secret::serialize")]
    pub password: SecretString,
    pub name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_login_request_serializes_password_but_redacts_debug() {
        let req = LoginRequest {
            email: Email::parse("user@example.com").unwrap(),
            password: SecretString::from("user123"),
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["email"], "user@example.com");
        assert_eq!(json["password"], "user123");
        assert!(!format!("{req:?}").contains("user123"));
    }

    #[test]
    fn test_auth_response() {
        let json = r#"{"token":"abc.def","user":{"id":"u1","name":"Ada","email":"ada@example.com","role":"admin"}}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token.expose_secret(), "abc.def");
        assert!(resp.user.is_admin());
    }

    #[test]
    fn test_user_without_role_is_not_admin() {
        let json = r#"{"id":"u2","name":"Bo","email":"bo@example.com"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.is_admin());
    }
}
