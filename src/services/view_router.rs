// src/services/view_router.rs
use std::{str::FromStr, sync::Mutex};

use serde::Serialize;

use super::session_store::Role;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewId {
    #[default]
    Dashboard,
    Confirmers,
    Accounts,
    Services,
    Wallet,
    Settings,
    Users,
}

impl ViewId {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewId::Dashboard => "dashboard",
            ViewId::Confirmers => "confirmers",
            ViewId::Accounts => "accounts",
            ViewId::Services => "services",
            ViewId::Wallet => "wallet",
            ViewId::Settings => "settings",
            ViewId::Users => "users",
        }
    }
}

impl FromStr for ViewId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "dashboard" => ViewId::Dashboard,
            "confirmers" => ViewId::Confirmers,
            "accounts" => ViewId::Accounts,
            "services" => ViewId::Services,
            "wallet" => ViewId::Wallet,
            "settings" => ViewId::Settings,
            "users" => ViewId::Users,
            _ => return Err(()),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LinkDef {
    view: ViewId,
    label: &'static str,
    icon: &'static str,
}

const fn link(view: ViewId, label: &'static str, icon: &'static str) -> LinkDef {
    LinkDef { view, label, icon }
}

const MARKETER_LINKS: &[LinkDef] = &[
    link(ViewId::Dashboard, "لوحة التحكم", "layout-dashboard"),
    link(ViewId::Confirmers, "مجتمع المؤكدين", "users"),
    link(ViewId::Accounts, "متجر الحسابات", "shopping-cart"),
    link(ViewId::Services, "خدمات المحتوى", "briefcase"),
    link(ViewId::Wallet, "المحفظة", "wallet"),
    link(ViewId::Settings, "إعدادات الحساب", "settings"),
];

const CONFIRMER_LINKS: &[LinkDef] = &[
    link(ViewId::Dashboard, "لوحة التحكم", "layout-dashboard"),
    link(ViewId::Wallet, "الأرباح والمحفظة", "wallet"),
    link(ViewId::Settings, "إعدادات الحساب", "settings"),
];

const ADMIN_LINKS: &[LinkDef] = &[
    link(ViewId::Dashboard, "لوحة التحكم", "layout-dashboard"),
    link(ViewId::Users, "إدارة المستخدمين", "users"),
    link(ViewId::Settings, "إعدادات الموقع", "settings"),
];

fn links_for(role: Role) -> &'static [LinkDef] {
    match role {
        Role::Marketer => MARKETER_LINKS,
        Role::Confirmer => CONFIRMER_LINKS,
        Role::Admin => ADMIN_LINKS,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub view: ViewId,
    pub label: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

/// Tracks the active content view and resolves navigation requests per role.
#[derive(Debug, Default)]
pub struct ViewRouter {
    active: Mutex<ViewId>,
}

impl ViewRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_view(&self) -> ViewId {
        *self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Resolve `view_name` against the role's table; anything else lands on the dashboard.
    pub fn navigate(&self, role: Role, view_name: &str) -> ViewId {
        let view = resolve(role, view_name);
        if view.as_str() != view_name {
            tracing::debug!(role = role.as_str(), view_name, "unknown view, falling back to dashboard");
        }
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = view;
        view
    }

    pub fn nav_links(&self, role: Role) -> Vec<NavLink> {
        let active = self.active_view();
        links_for(role)
            .iter()
            .map(|l| NavLink { view: l.view, label: l.label, icon: l.icon, active: l.view == active })
            .collect()
    }

    pub fn reset(&self) {
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = ViewId::Dashboard;
    }
}

pub fn resolve(role: Role, view_name: &str) -> ViewId {
    view_name
        .parse::<ViewId>()
        .ok()
        .filter(|view| links_for(role).iter().any(|l| l.view == *view))
        .unwrap_or(ViewId::Dashboard)
}
