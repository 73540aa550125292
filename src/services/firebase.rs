// src/services/firebase.rs
//! Firebase Identity Toolkit over REST.

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::auth_gateway::{AuthError, AuthUser, FederatedConsent, IdentityProvider, POPUP_CLOSED_CODE};

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Error)]
pub enum FirebaseInitError {
    #[error("FIREBASE_API_KEY is not set")]
    MissingApiKey,
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug)]
pub struct FirebaseIdentity {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    request_uri: String,
    id_token: Mutex<Option<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: String,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseIdentity {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FirebaseInitError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(FirebaseInitError::MissingApiKey)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            request_uri: "http://localhost".to_string(),
            id_token: Mutex::new(None),
        })
    }

    async fn call<B: Serialize + Sync>(&self, method: &str, body: &B) -> Result<AuthUser, AuthError> {
        let url = format!("{}/accounts:{}", self.base_url, method);
        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|env| map_error_code(&env.error.message))
                .unwrap_or_else(|_| "auth/internal-error".to_string());
            tracing::warn!(%status, method, code = %code, "identity toolkit rejected request");
            return Err(AuthError::provider(code));
        }

        let account: AccountResponse = res
            .json()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        *self.id_token.lock().unwrap_or_else(|e| e.into_inner()) = account.id_token;
        Ok(AuthUser { uid: account.local_id, email: account.email })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let body = PasswordRequest { email, password, return_secure_token: true };
        self.call("signInWithPassword", &body).await
    }

    async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let body = PasswordRequest { email, password, return_secure_token: true };
        self.call("signUp", &body).await
    }

    async fn sign_in_federated(&self, consent: FederatedConsent) -> Result<AuthUser, AuthError> {
        let id_token = match consent {
            FederatedConsent::Granted { id_token } => id_token,
            FederatedConsent::Dismissed => return Err(AuthError::provider(POPUP_CLOSED_CODE)),
        };
        let body = IdpRequest {
            post_body: format!("id_token={}&providerId=google.com", id_token),
            request_uri: self.request_uri.clone(),
            return_idp_credential: true,
            return_secure_token: true,
        };
        self.call("signInWithIdp", &body).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // Tokens are client-held; dropping them is the whole sign-out.
        self.id_token.lock().unwrap_or_else(|e| e.into_inner()).take();
        Ok(())
    }
}

/// Translate Identity Toolkit error strings ("WEAK_PASSWORD : ...") to `auth/...` codes.
pub fn map_error_code(message: &str) -> String {
    let key = message.split([' ', ':']).next().unwrap_or_default();
    let code = match key {
        "EMAIL_NOT_FOUND" => "auth/user-not-found",
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => "auth/wrong-password",
        "EMAIL_EXISTS" => "auth/email-already-in-use",
        "WEAK_PASSWORD" => "auth/weak-password",
        "INVALID_EMAIL" => "auth/invalid-email",
        "USER_DISABLED" => "auth/user-disabled",
        "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => "auth/requires-recent-login",
        _ => return format!("auth/{}", key.to_lowercase().replace('_', "-")),
    };
    code.to_string()
}
