//! Marketer's Hub dashboard: session store, auth gateway, support chat and
//! role-based view routing, served to a static front-end over a local API.

pub mod config;
pub mod error;
pub mod message;
pub mod routes;
pub mod services;
pub mod state;
