// src/services/navigation.rs
//! Page guards and post-auth redirects. Guards re-read storage on every load.

use std::str::FromStr;

use serde::Serialize;

use super::{
    auth_gateway::{AuthGateway, AuthUser},
    session_store::{Role, SessionStore},
    view_router::ViewRouter,
};

pub const HOME_PAGE: &str = "/";
pub const LOGIN_PAGE: &str = "/login.html";
pub const DASHBOARD_PAGE: &str = "/dashboard.html";
pub const ADMIN_PAGE: &str = "/admin.html";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Login,
    Register,
    Dashboard,
    Admin,
}

impl FromStr for Page {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(Page::Login),
            "register" => Ok(Page::Register),
            "dashboard" => Ok(Page::Dashboard),
            "admin" => Ok(Page::Admin),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum PageAccess {
    Granted,
    Redirect { to: &'static str },
}

pub async fn check_page(page: Page, store: &SessionStore, auth: &AuthGateway) -> PageAccess {
    match page {
        Page::Login | Page::Register => PageAccess::Granted,
        Page::Dashboard => {
            // First emission of a fresh subscription is the current user.
            let user = auth.subscribe().next().await.flatten();
            if user.is_none() {
                return PageAccess::Redirect { to: LOGIN_PAGE };
            }
            if store.role().is_none() {
                if let Err(e) = auth.sign_out().await {
                    tracing::warn!(error = %e, "sign-out during guard redirect failed");
                }
                store.mark_authenticated(false);
                return PageAccess::Redirect { to: LOGIN_PAGE };
            }
            PageAccess::Granted
        }
        Page::Admin => {
            if store.is_admin() {
                PageAccess::Granted
            } else {
                PageAccess::Redirect { to: LOGIN_PAGE }
            }
        }
    }
}

/// Record a successful sign-in and pick where to send the user.
pub fn after_sign_in(
    user: &AuthUser,
    selected_role: Role,
    admin_emails: &[String],
    store: &SessionStore,
) -> &'static str {
    // A new sign-in replaces whatever the previous one left behind.
    store.clear();
    store.mark_authenticated(true);
    let is_admin = user
        .email
        .as_deref()
        .is_some_and(|email| admin_emails.iter().any(|a| a.eq_ignore_ascii_case(email)));
    if is_admin {
        tracing::info!(uid = %user.uid, "admin signed in");
        store.set_admin(true);
        return ADMIN_PAGE;
    }
    store.set_role(selected_role);
    DASHBOARD_PAGE
}

/// Sign out, forget the stored session and send the user home.
pub async fn sign_out(auth: &AuthGateway, store: &SessionStore, router: &ViewRouter) -> &'static str {
    if let Err(e) = auth.sign_out().await {
        tracing::warn!(error = %e, "provider sign-out failed");
    }
    store.clear();
    router.reset();
    HOME_PAGE
}
