//! Client for the hosted identity provider.
//!
//! The provider issues an ID token on sign-in which authorizes database
//! requests. The session is cached in browser local storage and restored
//! from there on startup; signing out drops the cached session.

use gloo_net::http::Request;
use gloo_storage::Storage as GlooStorage;
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::json;
use vigor_domain as domain;

const KEY_SESSION: &str = "session";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub uid: String,
    pub id_token: String,
    pub display_name: String,
    pub email: String,
}

impl AuthSession {
    pub fn to_user(&self) -> Result<domain::User, domain::ReadError> {
        let name = if self.display_name.trim().is_empty() {
            self.email.split('@').next().unwrap_or("Account")
        } else {
            self.display_name.as_str()
        };
        Ok(domain::User {
            id: self.uid.clone().into(),
            name: domain::Name::new(name).map_err(|err| domain::ReadError::Other(err.into()))?,
            email: self.email.clone(),
        })
    }
}

#[must_use]
pub fn cached_session() -> Option<AuthSession> {
    gloo_storage::LocalStorage::get(KEY_SESSION).ok()
}

pub fn store_session(session: &AuthSession) {
    if let Err(err) = gloo_storage::LocalStorage::set(KEY_SESSION, session) {
        error!("failed to store session: {err}");
    }
}

pub fn clear_session() {
    gloo_storage::LocalStorage::delete(KEY_SESSION);
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    email: String,
}

#[derive(Deserialize, Default)]
struct ErrorResponse {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

pub async fn sign_in(
    api_key: &str,
    credentials: domain::Credentials,
) -> Result<AuthSession, domain::ReadError> {
    let url = format!(
        "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key={api_key}"
    );
    let response = Request::post(&url)
        .json(&json!({
            "email": credentials.email,
            "password": credentials.password,
            "returnSecureToken": true,
        }))
        .map_err(|err| domain::ReadError::Other(err.to_string().into()))?
        .send()
        .await
        .map_err(|_| domain::ReadError::Storage(domain::StorageError::NoConnection))?;

    if !response.ok() {
        let message = response
            .json::<ErrorResponse>()
            .await
            .unwrap_or_default()
            .error
            .message;
        return Err(match message.as_str() {
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
                domain::ReadError::Other("invalid email or password".into())
            }
            _ => domain::ReadError::Storage(domain::StorageError::Other(
                format!("sign-in failed with status {}", response.status()).into(),
            )),
        });
    }

    let body = response
        .json::<SignInResponse>()
        .await
        .map_err(|err| domain::ReadError::Other(err.to_string().into()))?;
    Ok(AuthSession {
        uid: body.local_id,
        id_token: body.id_token,
        display_name: body.display_name,
        email: if body.email.is_empty() {
            credentials.email
        } else {
            body.email
        },
    })
}
