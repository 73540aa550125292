// src/services/auth_gateway.rs
use std::{
    collections::VecDeque,
    fmt::{self, Debug},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

pub const POPUP_CLOSED_CODE: &str = "auth/popup-closed-by-user";
pub const NETWORK_FAILED_CODE: &str = "auth/network-request-failed";

pub const FEDERATED_CANCELLED_ALERT: &str = "Sign-in process was cancelled. Please try again.";
pub const FEDERATED_FAILED_ALERT: &str =
    "An error occurred during Google Sign-In. Please try again later.";
/// Oldest alerts are dropped past this many unread.
pub const MAX_PENDING_ALERTS: usize = 8;
pub const UNAVAILABLE_BANNER: &str = "Configuration Error: Authentication services are currently unavailable. Please check the console for details.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FederatedConsent {
    Granted { id_token: String },
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authentication service is not available")]
    Unavailable,
    #[error("identity provider rejected the request: {code}")]
    Provider { code: String },
    #[error("identity provider unreachable: {0}")]
    Transport(String),
}

impl AuthError {
    pub fn provider(code: impl Into<String>) -> Self {
        AuthError::Provider { code: code.into() }
    }

    pub fn code(&self) -> &str {
        match self {
            AuthError::Unavailable => "auth/unavailable",
            AuthError::Provider { code } => code,
            AuthError::Transport(_) => NETWORK_FAILED_CODE,
        }
    }

    pub fn friendly_message(&self) -> &'static str {
        friendly_message(self.code())
    }
}

/// Localized text for a provider error code.
pub fn friendly_message(code: &str) -> &'static str {
    match code {
        "auth/invalid-email" => "البريد الإلكتروني الذي أدخلته غير صالح.",
        "auth/user-disabled" => "تم تعطيل هذا الحساب.",
        "auth/user-not-found" => "لا يوجد حساب بهذا البريد الإلكتروني. يرجى إنشاء حساب جديد.",
        "auth/wrong-password" => "كلمة المرور غير صحيحة. يرجى المحاولة مرة أخرى.",
        "auth/email-already-in-use" => "هذا البريد الإلكتروني مستخدم بالفعل. يرجى تسجيل الدخول.",
        "auth/weak-password" => "كلمة المرور ضعيفة جدًا. يجب أن تتكون من 6 أحرف على الأقل.",
        "auth/requires-recent-login" => {
            "هذه العملية حساسة وتتطلب مصادقة حديثة. الرجاء تسجيل الخروج ثم الدخول مرة أخرى."
        }
        _ => "حدث خطأ غير متوقع. يرجى المحاولة مرة أخرى.",
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<AuthUser, AuthError>;
    async fn sign_up_with_password(&self, email: &str, password: &str)
    -> Result<AuthUser, AuthError>;
    async fn sign_in_federated(&self, consent: FederatedConsent) -> Result<AuthUser, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Session-change feed. The first `next` yields the state at subscription time.
pub struct SessionSubscription {
    initial: Option<Option<AuthUser>>,
    rx: Option<broadcast::Receiver<Option<AuthUser>>>,
}

impl SessionSubscription {
    /// `None` once unsubscribed or the gateway is gone.
    pub async fn next(&mut self) -> Option<Option<AuthUser>> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(user) => return Some(user),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of `next`.
    pub fn try_next(&mut self) -> Option<Option<AuthUser>> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        self.rx.as_mut()?.try_recv().ok()
    }

    pub fn unsubscribe(&mut self) {
        self.initial = None;
        self.rx = None;
    }
}

pub struct AuthGateway {
    provider: Option<Arc<dyn IdentityProvider>>,
    init_error: Option<String>,
    current: Mutex<Option<AuthUser>>,
    changes: broadcast::Sender<Option<AuthUser>>,
    alerts: Mutex<VecDeque<String>>,
}

impl Debug for AuthGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGateway")
            .field("available", &self.provider.is_some())
            .field("init_error", &self.init_error)
            .finish()
    }
}

impl AuthGateway {
    /// Wrap the outcome of provider initialization. A failure disables the
    /// gateway for the rest of the process.
    pub fn new<E: fmt::Display>(init: Result<Arc<dyn IdentityProvider>, E>) -> Self {
        let (changes, _) = broadcast::channel(32);
        let (provider, init_error) = match init {
            Ok(provider) => (Some(provider), None),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "FATAL: identity provider initialization failed, auth features disabled"
                );
                (None, Some(e.to_string()))
            }
        };
        Self {
            provider,
            init_error,
            current: Mutex::new(None),
            changes,
            alerts: Mutex::new(VecDeque::new()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Persistent banner text when initialization failed.
    pub fn banner(&self) -> Option<&str> {
        self.init_error.as_ref().map(|_| UNAVAILABLE_BANNER)
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let user = self.provider()?.sign_in_with_password(email, password).await?;
        self.publish(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let user = self.provider()?.sign_up_with_password(email, password).await?;
        self.publish(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_in_with_federated_provider(
        &self,
        consent: FederatedConsent,
    ) -> Result<AuthUser, AuthError> {
        let provider = self.provider()?;
        match provider.sign_in_federated(consent).await {
            Ok(user) => {
                self.publish(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                tracing::error!(code = e.code(), error = %e, "federated sign-in failed");
                let alert = if e.code() == POPUP_CLOSED_CODE {
                    FEDERATED_CANCELLED_ALERT
                } else {
                    FEDERATED_FAILED_ALERT
                };
                self.push_alert(alert);
                Err(e)
            }
        }
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider()?.sign_out().await?;
        self.publish(None);
        Ok(())
    }

    pub fn subscribe(&self) -> SessionSubscription {
        if self.provider.is_none() {
            return SessionSubscription { initial: Some(None), rx: None };
        }
        // Subscribe before reading so no change can slip between the two.
        let rx = self.changes.subscribe();
        SessionSubscription { initial: Some(self.current_user()), rx: Some(rx) }
    }

    pub fn take_alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner()).drain(..).collect()
    }

    fn push_alert(&self, alert: &str) {
        let mut alerts = self.alerts.lock().unwrap_or_else(|e| e.into_inner());
        if alerts.len() == MAX_PENDING_ALERTS {
            alerts.pop_front();
        }
        alerts.push_back(alert.to_string());
    }

    fn provider(&self) -> Result<&Arc<dyn IdentityProvider>, AuthError> {
        self.provider.as_ref().ok_or(AuthError::Unavailable)
    }

    fn publish(&self, user: Option<AuthUser>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = user.clone();
        // No receivers is fine.
        let _ = self.changes.send(user);
    }
}
