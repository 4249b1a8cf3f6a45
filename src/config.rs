use anyhow::{Context, Result};
use std::env;

/// Hardcoded model identifier. Not configurable from the environment.
pub const MODEL_TO_USE: &str = "gemini-2.5-flash";

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    /// `GOOGLE_API_KEY`, `None` when unset or blank.
    pub api_key: Option<String>,
    pub model: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("GOOGLE_API_KEY").filter(|key| !key.trim().is_empty());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            model: MODEL_TO_USE.to_string(),
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
