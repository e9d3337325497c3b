use serde::{Deserialize, Serialize};

use crate::auth::repo::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial self-profile update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Bearer token issued on login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

/// Public part of the user returned to clients. Never carries the hash.
#[derive(Debug, Serialize)]
pub struct UserRead {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user() -> User {
        User {
            id: 7,
            name: "Alice".into(),
            email: "alice@x.com".into(),
            password_hash: "$argon2id$...".into(),
            is_active: true,
            is_superuser: false,
            is_verified: false,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn user_read_never_exposes_hash() {
        let read = UserRead::from(sample_user());
        let json = serde_json::to_string(&read).unwrap();
        assert!(json.contains("alice@x.com"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn token_response_is_bearer() {
        let json = serde_json::to_string(&TokenResponse::bearer("abc".into())).unwrap();
        assert!(json.contains(r#""token_type":"bearer""#));
        assert!(json.contains(r#""access_token":"abc""#));
    }
}
