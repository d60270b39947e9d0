//! Response Building
//!
//! Renders a reply and, for strict accounts, seals it in an encrypted,
//! signed envelope.

use std::sync::Arc;

use chrono::Utc;
use wx_common::{AccountContext, Reply, TrustMode};
use wx_crypto::{random_alphanumeric, signature, CryptoError, MessageCodec};

use crate::error::GatewayResult;
use crate::render::{render_encrypted, render_xml};

/// Nonce length used when the request carried none.
const NONCE_LEN: usize = 10;

/// Builds response bodies for one account.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    context: Arc<AccountContext>,
    codec: Option<MessageCodec>,
}

impl ResponseBuilder {
    /// `codec` is required to seal replies for strict accounts.
    pub fn new(context: Arc<AccountContext>, codec: Option<MessageCodec>) -> Self {
        Self { context, codec }
    }

    /// Produce the HTTP body for `reply`.
    ///
    /// Sentinels are never encrypted. Content replies are sealed only when
    /// the account is strict, which then requires a codec.
    pub fn build(&self, reply: &Reply, nonce: &str) -> GatewayResult<String> {
        let xml = render_xml(reply);
        if reply.is_sentinel() || self.context.trust_mode() != TrustMode::Strict {
            return Ok(xml);
        }

        let Some(codec) = &self.codec else {
            return Err(CryptoError::InvalidKey(format!(
                "account {} has no AES key",
                self.context.account_id()
            ))
            .into());
        };
        let nonce = if nonce.is_empty() {
            random_alphanumeric(NONCE_LEN)
        } else {
            nonce.to_string()
        };
        self.seal(codec, &xml, &nonce, Utc::now().timestamp())
    }

    fn seal(
        &self,
        codec: &MessageCodec,
        xml: &str,
        nonce: &str,
        timestamp: i64,
    ) -> GatewayResult<String> {
        let encrypt = codec.encrypt(xml, self.context.app_id())?;
        let timestamp_text = timestamp.to_string();
        let msg_signature =
            signature::sign(&[self.context.token(), &timestamp_text, nonce, &encrypt]);
        Ok(render_encrypted(&encrypt, &msg_signature, timestamp, nonce))
    }
}
