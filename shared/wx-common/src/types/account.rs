//! Account Types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-account message trust policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustMode {
    /// Messages arrive in plaintext; replies are never encrypted.
    #[default]
    Plain,
    /// Messages may arrive encrypted; signature mismatches are only logged.
    Permissive,
    /// Messages must arrive encrypted and signed; replies are encrypted.
    Strict,
}

impl TrustMode {
    /// Parse from a config string. Accepts the platform aliases
    /// `compatible` and `safe`; an empty string means plain.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "plain" => Some(Self::Plain),
            "permissive" | "compatible" => Some(Self::Permissive),
            "strict" | "safe" => Some(Self::Strict),
            _ => None,
        }
    }

    /// Convert to string form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Permissive => "permissive",
            Self::Strict => "strict",
        }
    }

    /// Whether a signature mismatch must reject the message.
    pub const fn rejects_mismatch(&self) -> bool {
        matches!(self, Self::Strict)
    }

    /// Whether this mode needs the account's AES key.
    pub const fn needs_key(&self) -> bool {
        !matches!(self, Self::Plain)
    }
}

impl FromStr for TrustMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s).ok_or_else(|| Error::UnknownTrustMode(s.to_string()))
    }
}

impl fmt::Display for TrustMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable configuration for one platform account.
///
/// Built once at start-up and shared behind an `Arc` by every exchange
/// for that account.
#[derive(Clone)]
pub struct AccountContext {
    account_id: String,
    app_id: String,
    app_secret: String,
    token: String,
    aes_key: Option<String>,
    trust_mode: TrustMode,
}

impl AccountContext {
    /// Create a validated account context.
    ///
    /// Non-plain trust modes require an AES key.
    pub fn new(
        account_id: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        token: impl Into<String>,
        aes_key: Option<String>,
        trust_mode: TrustMode,
    ) -> Result<Self> {
        let account_id = account_id.into();
        let app_id = app_id.into();
        let token = token.into();

        if app_id.is_empty() {
            return Err(Error::EmptyField {
                account: account_id,
                field: "app_id",
            });
        }
        if token.is_empty() {
            return Err(Error::EmptyField {
                account: account_id,
                field: "token",
            });
        }

        let aes_key = aes_key.filter(|k| !k.trim().is_empty());
        if trust_mode.needs_key() && aes_key.is_none() {
            return Err(Error::MissingAesKey(account_id));
        }

        Ok(Self {
            account_id,
            app_id,
            app_secret: app_secret.into(),
            token,
            aes_key,
            trust_mode,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }

    /// Shared token used in request signatures.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Base64 AES key, present for every non-plain account.
    pub fn aes_key(&self) -> Option<&str> {
        self.aes_key.as_deref()
    }

    pub const fn trust_mode(&self) -> TrustMode {
        self.trust_mode
    }
}

impl fmt::Debug for AccountContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountContext")
            .field("account_id", &self.account_id)
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("token", &"<redacted>")
            .field("aes_key", &self.aes_key.as_ref().map(|_| "<redacted>"))
            .field("trust_mode", &self.trust_mode)
            .finish()
    }
}
