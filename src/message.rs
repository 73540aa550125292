// src/message.rs
use serde::{Deserialize, Serialize};

use crate::services::{
    auth_gateway::{AuthUser, FederatedConsent},
    chat_session::MessageId,
    session_store::{Role, Theme},
    view_router::{NavLink, ViewId},
    views::ViewDescription,
};

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    /// Register form only; not sent to the provider.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct FederatedRequest {
    #[serde(flatten)]
    pub consent: FederatedConsent,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Serialize, Deserialize)]
pub struct RedirectResponse {
    pub redirect: String,
}

#[derive(Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

#[derive(Serialize, Deserialize)]
pub struct ThemeResponse {
    pub theme: Theme,
    pub dark: bool,
}

#[derive(Serialize)]
pub struct AuthStatusResponse {
    pub available: bool,
    pub banner: Option<String>,
    pub user: Option<AuthUser>,
    pub alerts: Vec<String>,
}

#[derive(Serialize)]
pub struct NavResponse {
    pub role: Role,
    pub active: ViewId,
    pub links: Vec<NavLink>,
}

#[derive(Serialize)]
pub struct ViewResponse {
    pub active: ViewId,
    #[serde(flatten)]
    pub view: ViewDescription,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatAccepted {
    pub placeholder_id: MessageId,
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

#[derive(Deserialize)]
pub struct HireRequestBody {
    pub confirmer_id: u32,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct AlertResponse {
    pub alert: String,
}
