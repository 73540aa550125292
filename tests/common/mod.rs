#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use futures_util::stream;
use marketers_hub::{
    config::AppConfig,
    services::{
        auth_gateway::{AuthError, AuthUser, FederatedConsent, IdentityProvider, POPUP_CLOSED_CODE},
        conversation::{ChatError, ChunkStream, Conversation, ConversationalProvider},
        storage::MemoryStorage,
    },
    state::AppState,
};
use tokio::sync::mpsc;

pub enum Script {
    Chunks(Vec<Result<String, ChatError>>),
    FailToOpen,
    Channel(mpsc::UnboundedReceiver<Result<String, ChatError>>),
}

pub fn chunks(parts: &[&str]) -> Script {
    Script::Chunks(parts.iter().map(|p| Ok(p.to_string())).collect())
}

/// Replays queued scripts, one per message sent.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self { scripts: Arc::new(Mutex::new(scripts.into())), seen: Arc::default() }
    }

    pub fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    /// Queue a stream whose chunks the test feeds by hand.
    pub fn push_channel(&self) -> mpsc::UnboundedSender<Result<String, ChatError>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.push(Script::Channel(rx));
        tx
    }
}

impl ConversationalProvider for ScriptedProvider {
    fn create_session(&self, _: &str, _: &str) -> Result<Box<dyn Conversation>, ChatError> {
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl Conversation for ScriptedProvider {
    async fn send_streamed(&self, message: &str) -> Result<ChunkStream, ChatError> {
        self.seen.lock().unwrap().push(message.to_string());
        let script = self.scripts.lock().unwrap().pop_front();
        match script {
            Some(Script::Chunks(items)) => Ok(Box::pin(stream::iter(items))),
            Some(Script::Channel(rx)) => Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            }))),
            Some(Script::FailToOpen) | None => Err(ChatError::Stream("provider unavailable".into())),
        }
    }
}

pub struct NoCredential;

impl ConversationalProvider for NoCredential {
    fn create_session(&self, _: &str, _: &str) -> Result<Box<dyn Conversation>, ChatError> {
        Err(ChatError::MissingCredential)
    }
}

/// In-memory identity provider with a fixed account table.
#[derive(Default)]
pub struct FakeIdentity {
    accounts: Mutex<HashMap<String, String>>,
}

impl FakeIdentity {
    pub fn with_account(email: &str, password: &str) -> Self {
        let identity = Self::default();
        identity.add_account(email, password);
        identity
    }

    pub fn add_account(&self, email: &str, password: &str) {
        self.accounts.lock().unwrap().insert(email.to_string(), password.to_string());
    }
}

fn user_for(email: &str) -> AuthUser {
    AuthUser { uid: format!("uid-{}", email), email: Some(email.to_string()) }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        match self.accounts.lock().unwrap().get(email) {
            None => Err(AuthError::provider("auth/user-not-found")),
            Some(p) if p != password => Err(AuthError::provider("auth/wrong-password")),
            Some(_) => Ok(user_for(email)),
        }
    }

    async fn sign_up_with_password(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if password.len() < 6 {
            return Err(AuthError::provider("auth/weak-password"));
        }
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::provider("auth/email-already-in-use"));
        }
        accounts.insert(email.to_string(), password.to_string());
        Ok(user_for(email))
    }

    async fn sign_in_federated(&self, consent: FederatedConsent) -> Result<AuthUser, AuthError> {
        match consent {
            FederatedConsent::Dismissed => Err(AuthError::provider(POPUP_CLOSED_CODE)),
            FederatedConsent::Granted { id_token } => Ok(user_for(&format!("{}@gmail.com", id_token))),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        hire_delay: Duration::ZERO,
        admin_emails: vec!["admin@hub.dz".to_string()],
        ..AppConfig::default()
    }
}

pub fn app_state(identity: FakeIdentity, chat: &dyn ConversationalProvider) -> Arc<AppState> {
    let identity: Arc<dyn IdentityProvider> = Arc::new(identity);
    Arc::new(AppState::new(
        test_config(),
        Arc::new(MemoryStorage::new()),
        Ok::<_, String>(identity),
        chat,
    ))
}
