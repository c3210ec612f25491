use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::{AccessToken, Credentials, Role, UserId, UserProfile};

const MIN_PASSWORD_LEN: usize = 8;

/// Body of `POST /auth/login`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub user_id: UserId,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl LoginResponse {
    #[must_use]
    pub fn into_credentials(self) -> Credentials {
        Credentials::new(
            AccessToken::new(self.access_token),
            UserProfile {
                id: self.user_id,
                email: self.email,
                role: self.role,
                full_name: self.full_name,
            },
        )
    }
}

/// JSON body sent to `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub full_name: Option<String>,
}

/// Body of a successful `POST /auth/register`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    pub user_id: UserId,
    pub email: String,
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
}

impl RegisterResponse {
    /// Registration never reports a role; new accounts are students.
    #[must_use]
    pub fn into_credentials(self, full_name: Option<String>) -> Credentials {
        Credentials::new(
            AccessToken::new(self.access_token),
            UserProfile {
                id: self.user_id,
                email: self.email,
                role: Role::Student,
                full_name,
            },
        )
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub success: bool,
}

/// Error payload returned by the backend on non-success statuses.
///
/// `detail` is usually a string; validation failures send a list of
/// `{ "msg": ... }` objects instead.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
            Value::Array(items) => {
                let parts: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("; "))
                }
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegisterError {
    #[error("email is required")]
    MissingEmail,
    #[error("password must be at least 8 characters")]
    PasswordTooShort,
    #[error("passwords do not match")]
    PasswordMismatch,
}

/// Registration form input before normalization.
#[derive(Clone, Debug, Default)]
pub struct RegisterDraft {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub full_name: Option<String>,
}

impl RegisterDraft {
    /// Normalize the form into a request body.
    ///
    /// # Errors
    ///
    /// Returns `RegisterError` for a blank email, a short password, or a
    /// confirmation that differs from the password.
    pub fn validate(self) -> Result<RegisterRequest, RegisterError> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(RegisterError::MissingEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegisterError::PasswordTooShort);
        }
        if self.password != self.password_confirm {
            return Err(RegisterError::PasswordMismatch);
        }
        let full_name = self
            .full_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(RegisterRequest {
            email,
            password: self.password,
            password_confirm: self.password_confirm,
            full_name,
        })
    }
}

fn bearer() -> String {
    "bearer".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_body_prefers_string_detail() {
        let body: ErrorBody = serde_json::from_value(json!({"detail": "Invalid email"})).unwrap();
        assert_eq!(body.message().as_deref(), Some("Invalid email"));
    }

    #[test]
    fn error_body_joins_validation_messages() {
        let body: ErrorBody = serde_json::from_value(json!({
            "detail": [
                {"loc": ["body", "email"], "msg": "bad email"},
                {"loc": ["body", "password"], "msg": "too short"}
            ]
        }))
        .unwrap();
        assert_eq!(body.message().as_deref(), Some("bad email; too short"));
    }

    #[test]
    fn error_body_without_detail_has_no_message() {
        let body: ErrorBody = serde_json::from_value(json!({"error": "nope"})).unwrap();
        assert!(body.message().is_none());
        let body: ErrorBody = serde_json::from_value(json!({"detail": 12})).unwrap();
        assert!(body.message().is_none());
    }

    #[test]
    fn login_response_maps_to_credentials() {
        let resp: LoginResponse = serde_json::from_value(json!({
            "access_token": "tok",
            "token_type": "bearer",
            "user_id": 9,
            "email": "s@x.io",
            "role": "Admin",
            "full_name": "Sam"
        }))
        .unwrap();
        let creds = resp.into_credentials();
        assert_eq!(creds.token.as_str(), "tok");
        assert_eq!(creds.user.id, UserId::new(9));
        assert!(creds.user.role.is_admin());
    }

    #[test]
    fn register_draft_normalizes_and_checks_confirmation() {
        let draft = RegisterDraft {
            email: "  New@Mail.COM ".into(),
            password: "Passw0rd!".into(),
            password_confirm: "Passw0rd!".into(),
            full_name: Some("   ".into()),
        };
        let req = draft.validate().unwrap();
        assert_eq!(req.email, "new@mail.com");
        assert_eq!(req.full_name, None);

        let mismatch = RegisterDraft {
            email: "a@b.io".into(),
            password: "Passw0rd!".into(),
            password_confirm: "Passw0rd?".into(),
            full_name: None,
        };
        assert_eq!(mismatch.validate(), Err(RegisterError::PasswordMismatch));

        let short = RegisterDraft {
            email: "a@b.io".into(),
            password: "short".into(),
            password_confirm: "short".into(),
            full_name: None,
        };
        assert_eq!(short.validate(), Err(RegisterError::PasswordTooShort));
    }
}
