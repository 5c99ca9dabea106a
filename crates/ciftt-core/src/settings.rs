//! Credential and endpoint settings.
//!
//! Values come from the process environment first, then from an `.env`-style
//! file. Keys are case-sensitive.

use crate::error::{CifttError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub const TOKEN_KEY: &str = "GITHUB_TOKEN";
pub const API_URL_KEY: &str = "GITHUB_API_URL";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_ENV_FILE: &str = ".env";

/// A string whose `Debug` output never reveals the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(\"**********\")")
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub token: Secret,
    pub api_url: String,
}

impl Settings {
    /// Load settings from the process environment and `env_file` (if it exists).
    pub fn load(env_file: &Path) -> Result<Self> {
        Self::load_from(env_file, |key| std::env::var(key).ok())
    }

    pub fn load_from(env_file: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file_vars = if env_file.is_file() {
            parse_env_file(&std::fs::read_to_string(env_file)?)
        } else {
            HashMap::new()
        };
        Self::from_sources(env, &file_vars)
    }

    pub fn from_sources(
        env: impl Fn(&str) -> Option<String>,
        file_vars: &HashMap<String, String>,
    ) -> Result<Self> {
        let lookup = |key: &str| {
            env(key)
                .or_else(|| file_vars.get(key).cloned())
                .filter(|v| !v.trim().is_empty())
        };

        let token = lookup(TOKEN_KEY).ok_or(CifttError::MissingToken)?;
        let api_url = lookup(API_URL_KEY).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Self {
            token: Secret::new(token.trim()),
            api_url,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse KEY=VALUE env content, skipping comments and blank lines.
/// Later assignments override earlier ones.
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.starts_with('#') && !l.is_empty())
        .map(|l| l.strip_prefix("export ").unwrap_or(l))
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), unquote(v.trim()).to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
