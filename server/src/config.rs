//! Server Configuration
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use wx_common::{AccountContext, TrustMode};

use crate::dispatch::DEFAULT_REPLY_TIMEOUT;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// Budget for application handlers to reply (default: 4500 ms)
    pub reply_timeout: Duration,

    /// Answer text messages with their own content (default: false)
    pub echo_text: bool,

    /// Configured platform accounts, in `WX_ACCOUNTS` order
    pub accounts: Vec<AccountContext>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let reply_timeout = match lookup("REPLY_TIMEOUT_MS") {
            Some(v) => Duration::from_millis(
                v.trim()
                    .parse()
                    .with_context(|| format!("REPLY_TIMEOUT_MS is not a number: {v:?}"))?,
            ),
            None => DEFAULT_REPLY_TIMEOUT,
        };

        let ids = lookup("WX_ACCOUNTS").context("WX_ACCOUNTS must be set")?;
        let mut accounts = Vec::new();
        for id in ids.split(',').map(str::trim).filter(|id| !id.is_empty()) {
            if accounts.iter().any(|a: &AccountContext| a.account_id() == id) {
                bail!("Account {id} is listed twice in WX_ACCOUNTS");
            }
            accounts.push(load_account(id, &lookup)?);
        }
        if accounts.is_empty() {
            bail!("WX_ACCOUNTS lists no accounts");
        }

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".into()),
            reply_timeout,
            echo_text: lookup("ECHO_TEXT").is_some_and(|v| matches!(v.trim(), "1" | "true")),
            accounts,
        })
    }

    /// Create a default configuration for testing.
    ///
    /// One plain account `demo` with token `token`.
    #[must_use]
    pub fn default_for_test() -> Self {
        let account = AccountContext::new(
            "demo",
            "wx1234567890",
            "secret",
            "token",
            None,
            TrustMode::Plain,
        );
        Self {
            bind_address: "127.0.0.1:8080".into(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            echo_text: false,
            accounts: vec![account.expect("valid test account")],
        }
    }
}

/// Read the `WX_<ID>_*` variables of one account.
fn load_account(id: &str, lookup: &impl Fn(&str) -> Option<String>) -> Result<AccountContext> {
    let prefix = format!("WX_{}_", id.to_ascii_uppercase());
    let var = |name: &str| lookup(&format!("{prefix}{name}"));

    let app_id = var("APP_ID").with_context(|| format!("{prefix}APP_ID must be set"))?;
    let token = var("TOKEN").with_context(|| format!("{prefix}TOKEN must be set"))?;
    let trust_mode: TrustMode = var("TRUST_MODE")
        .unwrap_or_default()
        .parse()
        .with_context(|| format!("{prefix}TRUST_MODE is invalid"))?;

    AccountContext::new(
        id,
        app_id,
        var("APP_SECRET").unwrap_or_default(),
        token,
        var("AES_KEY"),
        trust_mode,
    )
    .with_context(|| format!("Account {id} is misconfigured"))
}
