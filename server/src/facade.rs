//! Message Facade
//!
//! Runs one inbound exchange for an account: trust check, decryption,
//! parsing, dispatch and response building.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};
use wx_common::{AccountContext, TrustMode};
use wx_crypto::{signature, CryptoError, MessageCodec};

use crate::dispatch::Dispatcher;
use crate::error::{GatewayError, GatewayResult};
use crate::parser::{self, flatten, XmlFields, ENCRYPT};
use crate::response::ResponseBuilder;

/// Query of the server-ownership challenge.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChallengeParams {
    pub signature: String,
    pub timestamp: String,
    pub nonce: String,
    pub echostr: String,
}

/// Query of a pushed message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageParams {
    pub signature: String,
    pub timestamp: String,
    pub nonce: String,
    pub openid: Option<String>,
    pub encrypt_type: Option<String>,
    pub msg_signature: Option<String>,
}

impl MessageParams {
    fn wants_aes(&self) -> bool {
        self.encrypt_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("aes"))
    }
}

/// Entry point for one configured account.
#[derive(Debug, Clone)]
pub struct MessageFacade {
    context: Arc<AccountContext>,
    codec: Option<MessageCodec>,
    dispatcher: Arc<Dispatcher>,
    responses: ResponseBuilder,
}

impl MessageFacade {
    /// Fails when the account's AES key is not a valid 32-byte key.
    pub fn new(context: AccountContext, dispatcher: Arc<Dispatcher>) -> GatewayResult<Self> {
        let codec = context.aes_key().map(MessageCodec::new).transpose()?;
        let context = Arc::new(context);
        let responses = ResponseBuilder::new(Arc::clone(&context), codec.clone());

        Ok(Self {
            context,
            codec,
            dispatcher,
            responses,
        })
    }

    pub fn context(&self) -> &AccountContext {
        &self.context
    }

    /// Answer the server-ownership challenge with `echostr`.
    ///
    /// A bad signature is rejected in every trust mode.
    pub fn verify_challenge(&self, params: &ChallengeParams) -> GatewayResult<String> {
        let parts: [&str; 3] = [self.context.token(), &params.timestamp, &params.nonce];
        if !signature::check(&parts, &params.signature) {
            warn!(
                account = self.context.account_id(),
                "Challenge signature mismatch"
            );
            return Err(GatewayError::SignatureMismatch);
        }
        Ok(params.echostr.clone())
    }

    /// Handle a pushed message and produce the response body.
    pub async fn handle_message(&self, params: &MessageParams, body: &str) -> GatewayResult<String> {
        let fields = self.open(params, flatten(body)?)?;
        let message = Arc::new(parser::parse(&fields)?);

        debug!(
            account = self.context.account_id(),
            msg_type = message.msg_type(),
            event = message.event_type(),
            msg_id = message.msg_id(),
            from = message.from_user(),
            "Message received"
        );

        let reply = self.dispatcher.dispatch(Arc::clone(&message)).await?;
        self.responses.build(&reply, &params.nonce)
    }

    /// Check the inbound trust signature and decrypt if needed, returning
    /// the plaintext fields.
    fn open(&self, params: &MessageParams, fields: XmlFields) -> GatewayResult<XmlFields> {
        let mode = self.context.trust_mode();

        if let Some(encrypt) = fields.get(ENCRYPT) {
            let codec = self.codec.as_ref().ok_or_else(|| {
                CryptoError::InvalidKey(format!(
                    "account {} has no AES key",
                    self.context.account_id()
                ))
            })?;
            let msg_signature = params.msg_signature.as_deref().unwrap_or_default();
            self.check_trust(&self.signed_parts(params, Some(encrypt)), msg_signature)?;

            let decrypted = codec.decrypt(encrypt)?;
            if decrypted.app_id != self.context.app_id() {
                warn!(
                    account = self.context.account_id(),
                    embedded = %decrypted.app_id,
                    "Decrypted message belongs to another app"
                );
                return Err(GatewayError::AppIdMismatch);
            }
            return flatten(&decrypted.xml);
        }

        if mode == TrustMode::Strict {
            warn!(
                account = self.context.account_id(),
                "Unencrypted message rejected"
            );
            return Err(GatewayError::SignatureMismatch);
        }
        if params.wants_aes() {
            return Err(GatewayError::malformed(
                "encrypt_type=aes without an Encrypt element",
            ));
        }

        self.check_trust(&self.signed_parts(params, None), &params.signature)?;
        Ok(fields)
    }

    /// Inputs of the inbound signature. Plaintext pushes are signed over
    /// token, timestamp and nonce only; the body is never part of it.
    fn signed_parts<'a>(
        &'a self,
        params: &'a MessageParams,
        encrypt: Option<&'a str>,
    ) -> Vec<&'a str> {
        let mut parts = vec![
            self.context.token(),
            params.timestamp.as_str(),
            params.nonce.as_str(),
        ];
        parts.extend(encrypt);
        parts
    }

    fn check_trust(&self, parts: &[&str], signature: &str) -> GatewayResult<()> {
        if signature::check(parts, signature) {
            return Ok(());
        }
        let mode = self.context.trust_mode();
        if mode.rejects_mismatch() {
            return Err(GatewayError::SignatureMismatch);
        }
        warn!(
            account = self.context.account_id(),
            trust_mode = %mode,
            "Signature mismatch tolerated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facade(mode: TrustMode) -> MessageFacade {
        let key = mode
            .needs_key()
            .then(|| "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFG".to_string());
        let context = AccountContext::new("demo", "wx1234567890", "", "token", key, mode).unwrap();
        MessageFacade::new(context, Arc::new(Dispatcher::new())).unwrap()
    }

    fn challenge(signature: String) -> ChallengeParams {
        ChallengeParams {
            signature,
            timestamp: "1409304348".into(),
            nonce: "nonce".into(),
            echostr: "echo-123".into(),
        }
    }

    #[test]
    fn challenge_returns_echostr() {
        let signature = signature::sign(&["token", "1409304348", "nonce"]);
        for mode in [TrustMode::Plain, TrustMode::Permissive, TrustMode::Strict] {
            assert_eq!(
                facade(mode).verify_challenge(&challenge(signature.clone())).unwrap(),
                "echo-123"
            );
        }
    }

    #[test]
    fn challenge_mismatch_is_always_rejected() {
        for mode in [TrustMode::Plain, TrustMode::Permissive, TrustMode::Strict] {
            assert!(matches!(
                facade(mode).verify_challenge(&challenge("bad".into())),
                Err(GatewayError::SignatureMismatch)
            ));
        }
    }

    #[test]
    fn invalid_key_fails_construction() {
        let context = AccountContext::new(
            "demo",
            "wx1",
            "",
            "token",
            Some("c2hvcnQ".into()),
            TrustMode::Strict,
        )
        .unwrap();
        assert!(matches!(
            MessageFacade::new(context, Arc::new(Dispatcher::new())),
            Err(GatewayError::Crypto(CryptoError::InvalidKey(_)))
        ));
    }

    #[test]
    fn plaintext_signature_excludes_body() {
        let facade = facade(TrustMode::Permissive);
        let params = MessageParams {
            signature: signature::sign(&["token", "1409304348", "nonce"]),
            timestamp: "1409304348".into(),
            nonce: "nonce".into(),
            ..MessageParams::default()
        };

        let parts = facade.signed_parts(&params, None);
        assert_eq!(parts, ["token", "1409304348", "nonce"]);
        assert!(signature::check(&parts, &params.signature));

        let sealed = facade.signed_parts(&params, Some("CIPHERTEXT"));
        assert_eq!(sealed, ["token", "1409304348", "nonce", "CIPHERTEXT"]);
        assert!(!signature::check(&sealed, &params.signature));
    }

    #[test]
    fn aes_query_without_envelope_is_malformed() {
        let params = MessageParams {
            encrypt_type: Some("aes".into()),
            ..MessageParams::default()
        };
        let fields = XmlFields::from_pairs([("MsgType", "text")]);
        assert!(matches!(
            facade(TrustMode::Permissive).open(&params, fields),
            Err(GatewayError::MalformedPayload(_))
        ));
    }
}
