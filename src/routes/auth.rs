use axum::{Json, extract::State};

use crate::{
    error::AppError,
    message::{AuthStatusResponse, CredentialsRequest, FederatedRequest, RedirectResponse},
    services::{
        auth_gateway::{AuthError, AuthUser},
        navigation,
        session_store::Role,
    },
    state::SharedState,
};

pub const FEDERATED_LOGIN_FAILED: &str = "فشل تسجيل الدخول باستخدام جوجل. يرجى المحاولة مرة أخرى.";

fn selected_role(role: Option<Role>) -> Result<Role, AppError> {
    match role.unwrap_or(Role::Marketer) {
        Role::Admin => Err(AppError::BadRequest("role must be marketer or confirmer".to_string())),
        role => Ok(role),
    }
}

fn redirect_after(state: &SharedState, user: &AuthUser, role: Role) -> Json<RedirectResponse> {
    let to = navigation::after_sign_in(user, role, &state.config.admin_emails, &state.store);
    Json(RedirectResponse { redirect: to.to_string() })
}

pub async fn login_handler(
    State(state): State<SharedState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<RedirectResponse>, AppError> {
    let role = selected_role(payload.role)?;
    let user = state
        .auth
        .sign_in_with_password(&payload.email, &payload.password)
        .await?;
    tracing::info!(uid = %user.uid, role = role.as_str(), "signed in");
    Ok(redirect_after(&state, &user, role))
}

pub async fn register_handler(
    State(state): State<SharedState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<RedirectResponse>, AppError> {
    let role = selected_role(payload.role)?;
    let user = state
        .auth
        .sign_up_with_password(&payload.email, &payload.password)
        .await?;
    tracing::info!(uid = %user.uid, role = role.as_str(), name = ?payload.name, "registered");
    Ok(redirect_after(&state, &user, role))
}

pub async fn federated_handler(
    State(state): State<SharedState>,
    Json(payload): Json<FederatedRequest>,
) -> Result<Json<RedirectResponse>, AppError> {
    let role = selected_role(payload.role)?;
    let user = state
        .auth
        .sign_in_with_federated_provider(payload.consent)
        .await
        .map_err(|e| match e {
            AuthError::Unavailable => AppError::AuthUnavailable,
            other => AppError::Auth {
                message: FEDERATED_LOGIN_FAILED.to_string(),
                code: other.code().to_string(),
            },
        })?;
    Ok(redirect_after(&state, &user, role))
}

pub async fn logout_handler(State(state): State<SharedState>) -> Json<RedirectResponse> {
    let to = navigation::sign_out(&state.auth, &state.store, &state.router).await;
    Json(RedirectResponse { redirect: to.to_string() })
}

pub async fn status_handler(State(state): State<SharedState>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        available: state.auth.is_available(),
        banner: state.auth.banner().map(str::to_string),
        user: state.auth.current_user(),
        alerts: state.auth.take_alerts(),
    })
}
