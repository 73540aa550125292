pub mod auth_gateway;
pub mod catalog;
pub mod chat_session;
pub mod conversation;
pub mod firebase;
pub mod gemini;
pub mod hire;
pub mod navigation;
pub mod session_store;
pub mod storage;
pub mod view_router;
pub mod views;
