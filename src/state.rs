// src/state.rs
use std::{fmt::Display, sync::Arc};

use crate::config::AppConfig;
use crate::services::{
    auth_gateway::{AuthGateway, IdentityProvider},
    catalog::Catalog,
    chat_session::ChatSessionController,
    conversation::ConversationalProvider,
    firebase::FirebaseIdentity,
    gemini::GeminiProvider,
    hire::HireDesk,
    session_store::{Session, SessionStore},
    storage::{DurableStorage, FileStorage, MemoryStorage},
    view_router::ViewRouter,
};

pub type SharedState = Arc<AppState>;

/// The single client context: created at startup, dropped at shutdown.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub store: SessionStore,
    pub auth: AuthGateway,
    pub chat: ChatSessionController,
    pub router: ViewRouter,
    pub catalog: Catalog,
    pub hire: HireDesk,
}

impl AppState {
    pub fn new<E: Display>(
        config: AppConfig,
        storage: Arc<dyn DurableStorage>,
        identity: Result<Arc<dyn IdentityProvider>, E>,
        conversational: &dyn ConversationalProvider,
    ) -> Self {
        let chat = ChatSessionController::connect(conversational, &config.system_prompt, &config.model);
        Self::assemble(config, storage, identity, chat)
    }

    fn assemble<E: Display>(
        config: AppConfig,
        storage: Arc<dyn DurableStorage>,
        identity: Result<Arc<dyn IdentityProvider>, E>,
        chat: ChatSessionController,
    ) -> Self {
        Self {
            store: SessionStore::load(storage),
            auth: AuthGateway::new(identity),
            chat,
            router: ViewRouter::new(),
            catalog: Catalog::demo(),
            hire: HireDesk::new(config.hire_delay),
            config,
        }
    }

    /// Wire the real providers. Misconfiguration disables the affected
    /// feature instead of failing startup.
    pub fn from_config(config: AppConfig) -> Self {
        let storage: Arc<dyn DurableStorage> = match FileStorage::open(&config.storage_path) {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                tracing::warn!(
                    path = %config.storage_path.display(),
                    error = %e,
                    "storage unreadable, falling back to memory"
                );
                Arc::new(MemoryStorage::new())
            }
        };
        let identity = FirebaseIdentity::new(
            config.firebase_api_key.clone(),
            config.identity_base_url.clone(),
            config.http_timeout,
        )
        .map(|provider| Arc::new(provider) as Arc<dyn IdentityProvider>);
        match GeminiProvider::new(
            config.gemini_api_key.clone(),
            config.gemini_base_url.clone(),
            config.http_timeout,
        ) {
            Ok(gemini) => Self::new(config, storage, identity, &gemini),
            Err(e) => Self::assemble(config, storage, identity, ChatSessionController::unavailable(e)),
        }
    }

    pub fn session(&self) -> Session {
        let mut session = self.store.session();
        session.is_authenticated |= self.auth.current_user().is_some();
        session
    }
}
