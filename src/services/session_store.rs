// src/services/session_store.rs
use std::{
    fmt::{self, Debug},
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::storage::DurableStorage;

pub const THEME_KEY: &str = "theme";
pub const ROLE_KEY: &str = "userRole";
pub const ADMIN_KEY: &str = "isAdmin";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Marketer,
    Confirmer,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Marketer => "marketer",
            Role::Confirmer => "confirmer",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marketer" => Ok(Role::Marketer),
            "confirmer" => Ok(Role::Confirmer),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Session {
    pub theme: Theme,
    pub role: Option<Role>,
    pub is_authenticated: bool,
}

/// Theme, role and admin flag kept in durable storage.
///
/// Nothing here enforces access; page guards re-read the stored values on
/// every load.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn DurableStorage>,
    dark_flag: Arc<watch::Sender<bool>>,
    authenticated: Arc<AtomicBool>,
}

impl Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("theme", &self.theme())
            .field("role", &self.role())
            .field("is_admin", &self.is_admin())
            .finish()
    }
}

impl SessionStore {
    /// Load from storage and apply the stored theme to the visual flag.
    pub fn load(storage: Arc<dyn DurableStorage>) -> Self {
        let theme = read_parsed::<Theme>(storage.as_ref(), THEME_KEY).unwrap_or_default();
        let (dark_flag, _) = watch::channel(theme == Theme::Dark);
        let store = Self {
            storage,
            dark_flag: Arc::new(dark_flag),
            authenticated: Arc::new(AtomicBool::new(false)),
        };
        store.set_theme(theme);
        store
    }

    pub fn theme(&self) -> Theme {
        read_parsed(self.storage.as_ref(), THEME_KEY).unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.write(THEME_KEY, theme.as_str());
        self.dark_flag.send_replace(theme == Theme::Dark);
        tracing::debug!(theme = theme.as_str(), "theme applied");
    }

    pub fn toggle_theme(&self) -> Theme {
        let next = self.theme().toggled();
        self.set_theme(next);
        next
    }

    /// Watch the visual dark-mode flag.
    pub fn theme_flag(&self) -> watch::Receiver<bool> {
        self.dark_flag.subscribe()
    }

    pub fn is_dark(&self) -> bool {
        *self.dark_flag.borrow()
    }

    pub fn role(&self) -> Option<Role> {
        read_parsed(self.storage.as_ref(), ROLE_KEY)
    }

    pub fn set_role(&self, role: Role) {
        self.write(ROLE_KEY, role.as_str());
    }

    pub fn is_admin(&self) -> bool {
        self.storage.get(ADMIN_KEY).as_deref() == Some("true")
    }

    pub fn set_admin(&self, is_admin: bool) {
        if is_admin {
            self.write(ADMIN_KEY, "true");
        } else {
            self.remove(ADMIN_KEY);
        }
    }

    pub fn mark_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }

    /// Forget role, admin flag and auth state. The theme survives logout.
    pub fn clear(&self) {
        self.remove(ROLE_KEY);
        self.remove(ADMIN_KEY);
        self.mark_authenticated(false);
    }

    pub fn session(&self) -> Session {
        let role = self.role().or_else(|| self.is_admin().then_some(Role::Admin));
        Session {
            theme: self.theme(),
            role,
            is_authenticated: self.authenticated.load(Ordering::SeqCst),
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            tracing::warn!(key, error = %e, "failed to persist session value");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            tracing::warn!(key, error = %e, "failed to remove session value");
        }
    }
}

fn read_parsed<T: FromStr>(storage: &dyn DurableStorage, key: &str) -> Option<T> {
    storage.get(key).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStorage;

    fn store() -> (SessionStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        (SessionStore::load(Arc::new(storage.clone())), storage)
    }

    #[test]
    fn theme_defaults_to_dark() {
        let (store, storage) = store();
        assert_eq!(store.theme(), Theme::Dark);
        assert!(store.is_dark());
        assert_eq!(storage.get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn stored_theme_and_flag_agree_after_every_toggle() {
        let (store, storage) = store();
        let flag = store.theme_flag();
        for _ in 0..5 {
            let theme = store.toggle_theme();
            assert_eq!(storage.get(THEME_KEY).as_deref(), Some(theme.as_str()));
            assert_eq!(*flag.borrow(), theme == Theme::Dark);
        }
        store.set_theme(Theme::Light);
        assert_eq!(store.theme(), Theme::Light);
        assert!(!*flag.borrow());
    }

    #[test]
    fn garbage_values_read_as_absent() {
        let storage = MemoryStorage::new();
        storage.set(THEME_KEY, "purple").unwrap();
        storage.set(ROLE_KEY, "superuser").unwrap();
        let store = SessionStore::load(Arc::new(storage));
        assert_eq!(store.theme(), Theme::Dark);
        assert_eq!(store.role(), None);
    }

    #[test]
    fn clear_keeps_theme() {
        let (store, _) = store();
        store.set_theme(Theme::Light);
        store.set_role(Role::Confirmer);
        store.set_admin(true);
        store.mark_authenticated(true);

        store.clear();

        let session = store.session();
        assert_eq!(session.theme, Theme::Light);
        assert_eq!(session.role, None);
        assert!(!session.is_authenticated);
        assert!(!store.is_admin());
    }

    #[test]
    fn admin_flag_reports_admin_role() {
        let (store, _) = store();
        store.set_admin(true);
        assert_eq!(store.session().role, Some(Role::Admin));
        store.set_role(Role::Marketer);
        assert_eq!(store.session().role, Some(Role::Marketer));
    }
}
