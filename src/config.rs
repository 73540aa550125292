// src/config.rs
use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};

use crate::services::{firebase::DEFAULT_IDENTITY_BASE_URL, gemini::DEFAULT_GEMINI_BASE_URL};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly and helpful customer support agent for 'Marketer's Hub Algeria' (also known as DZ Marketers), a platform for digital marketers in Algeria. Your goal is to assist users with their questions about the platform's services (like the confirmer marketplace, ad account store), features, and pricing in a concise and professional manner. Communicate primarily in Arabic. Keep your answers helpful but brief.";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub storage_path: PathBuf,
    pub public_dir: PathBuf,
    pub firebase_api_key: Option<String>,
    pub identity_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub model: String,
    pub system_prompt: String,
    pub http_timeout: Duration,
    pub hire_delay: Duration,
    pub admin_emails: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            storage_path: PathBuf::from("storage.json"),
            public_dir: PathBuf::from("public"),
            firebase_api_key: None,
            identity_base_url: DEFAULT_IDENTITY_BASE_URL.to_string(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            http_timeout: Duration::from_secs(60),
            hire_delay: Duration::from_millis(1500),
            admin_emails: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Read `.env` (if any) and the process environment.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(error = %e, "no .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(v.parse().context("HTTP_TIMEOUT_SECS must be an integer")?),
            None => defaults.http_timeout,
        };
        let hire_delay = match get("HIRE_DELAY_MS") {
            Some(v) => Duration::from_millis(v.parse().context("HIRE_DELAY_MS must be an integer")?),
            None => defaults.hire_delay,
        };
        let admin_emails: Vec<String> = get("ADMIN_EMAILS")
            .map(|v| {
                v.split(',')
                    .map(|e| e.trim().to_string())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            storage_path: get("STORAGE_PATH").map(PathBuf::from).unwrap_or(defaults.storage_path),
            public_dir: get("PUBLIC_DIR").map(PathBuf::from).unwrap_or(defaults.public_dir),
            firebase_api_key: get("FIREBASE_API_KEY"),
            identity_base_url: get("IDENTITY_BASE_URL").unwrap_or(defaults.identity_base_url),
            gemini_api_key: get("API_KEY"),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            model: get("GEMINI_MODEL").unwrap_or(defaults.model),
            system_prompt: get("SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
            http_timeout,
            hire_delay,
            admin_emails,
        })
    }
}
