use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    error::AppError,
    message::{AlertResponse, HireRequestBody, NavResponse, ThemeRequest, ThemeResponse, ViewResponse},
    services::{
        navigation::{self, Page, PageAccess},
        session_store::{Role, Session, Theme},
        views,
    },
    state::SharedState,
};

fn theme_response(theme: Theme, state: &SharedState) -> Json<ThemeResponse> {
    Json(ThemeResponse { theme, dark: state.store.is_dark() })
}

fn current_role(state: &SharedState) -> Result<Role, AppError> {
    state
        .session()
        .role
        .ok_or_else(|| AppError::Unauthorized("no role selected for this session".to_string()))
}

pub async fn session_handler(State(state): State<SharedState>) -> Json<Session> {
    Json(state.session())
}

pub async fn set_theme_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ThemeRequest>,
) -> Json<ThemeResponse> {
    state.store.set_theme(payload.theme);
    theme_response(payload.theme, &state)
}

pub async fn toggle_theme_handler(State(state): State<SharedState>) -> Json<ThemeResponse> {
    let theme = state.store.toggle_theme();
    theme_response(theme, &state)
}

pub async fn page_handler(
    State(state): State<SharedState>,
    Path(page): Path<String>,
) -> Result<Json<PageAccess>, AppError> {
    let page: Page = page
        .parse()
        .map_err(|_| AppError::NotFound(format!("unknown page: {}", page)))?;
    Ok(Json(navigation::check_page(page, &state.store, &state.auth).await))
}

pub async fn nav_handler(State(state): State<SharedState>) -> Result<Json<NavResponse>, AppError> {
    let role = current_role(&state)?;
    Ok(Json(NavResponse {
        role,
        active: state.router.active_view(),
        links: state.router.nav_links(role),
    }))
}

pub async fn view_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<ViewResponse>, AppError> {
    let role = current_role(&state)?;
    let active = state.router.navigate(role, &name);
    let view = views::render(active, role, &state.catalog);
    Ok(Json(ViewResponse { active, view }))
}

pub async fn hire_handler(
    State(state): State<SharedState>,
    Json(payload): Json<HireRequestBody>,
) -> Result<Json<AlertResponse>, AppError> {
    let alert = state
        .hire
        .submit(&state.catalog, payload.confirmer_id, &payload.message)
        .await?;
    Ok(Json(AlertResponse { alert: alert.to_string() }))
}
