//! User profile and login payloads.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Cached profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    #[serde(alias = "id")]
    pub uid: UserId,
    /// Display name.
    #[serde(rename = "nome", default)]
    pub name: String,
    /// E-mail address.
    #[serde(default)]
    pub email: String,
}

/// Body of `POST /users/login/`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    /// E-mail address.
    pub email: String,
    /// Password.
    #[serde(serialize_with = "expose_password")]
    pub password: SecretString,
}

/// Body of `POST /users/register/`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    /// Display name.
    #[serde(rename = "nome")]
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// Password.
    #[serde(serialize_with = "expose_password")]
    pub password: SecretString,
}

/// Writes the password in clear text into the request body.
fn expose_password<S>(password: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(password.expose_secret())
}

/// Response of `POST /users/login/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Whether the credentials were accepted.
    #[serde(default)]
    pub success: bool,
    /// Status or error message.
    #[serde(default)]
    pub message: Option<String>,
    /// Bearer token for subsequent requests.
    #[serde(default)]
    pub token: Option<String>,
    /// Profile of the signed-in user.
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Response of `POST /users/register/` and `GET /users/perfil/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserResponse {
    /// Whether the request was accepted.
    #[serde(default)]
    pub success: bool,
    /// Status or error message.
    #[serde(default)]
    pub message: Option<String>,
    /// The account.
    #[serde(default, alias = "perfil", alias = "usuario")]
    pub user: Option<UserProfile>,
}
