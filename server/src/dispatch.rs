//! Handler Dispatch
//!
//! Application handlers are consulted in priority order. A handler answers
//! `None` when a message is not its concern.

use std::future::Future;
use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;

use futures::future::{poll_fn, BoxFuture};
use futures::FutureExt;
use tracing::debug;
use wx_common::{Reply, RequestMessage};

use crate::error::{GatewayError, GatewayResult};

/// The platform drops a passive reply after five seconds.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(4500);

/// Application logic that may reply to an inbound message.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, message: Arc<RequestMessage>) -> BoxFuture<'static, Option<Reply>>;
}

impl<F, Fut> MessageHandler for F
where
    F: Fn(Arc<RequestMessage>) -> Fut + Send + Sync,
    Fut: Future<Output = Option<Reply>> + Send + 'static,
{
    fn handle(&self, message: Arc<RequestMessage>) -> BoxFuture<'static, Option<Reply>> {
        Box::pin(self(message))
    }
}

/// Ordered handler chain with a reply budget.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Vec<Arc<dyn MessageHandler>>,
    reply_timeout: Duration,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers.len())
            .field("reply_timeout", &self.reply_timeout)
            .finish()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_REPLY_TIMEOUT)
    }

    pub fn with_timeout(reply_timeout: Duration) -> Self {
        Self {
            handlers: Vec::new(),
            reply_timeout,
        }
    }

    /// Append a handler with lower priority than those already added.
    #[must_use]
    pub fn push(mut self, handler: impl MessageHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub const fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    /// Find the reply for `message`.
    ///
    /// Every handler is polled once in priority order and the first one
    /// ready with a reply wins without consulting the rest. Handlers still
    /// pending then race within the reply budget, earlier handlers winning
    /// ties. No reply at all is acknowledged.
    pub async fn dispatch(&self, message: Arc<RequestMessage>) -> GatewayResult<Reply> {
        let mut pending: Vec<BoxFuture<'static, Option<Reply>>> = Vec::new();

        for (index, handler) in self.handlers.iter().enumerate() {
            let mut future = handler.handle(Arc::clone(&message));
            match (&mut future).now_or_never() {
                Some(Some(reply)) => {
                    debug!(handler = index, "Handler replied immediately");
                    return Ok(reply);
                }
                Some(None) => {}
                None => pending.push(future),
            }
        }

        if pending.is_empty() {
            debug!(msg_type = message.msg_type(), "No handler replied");
            return Ok(Reply::Acknowledge);
        }

        debug!(pending = pending.len(), "Waiting for pending handlers");
        let race = poll_fn(|cx| {
            let mut i = 0;
            while i < pending.len() {
                match pending[i].as_mut().poll(cx) {
                    Poll::Ready(Some(reply)) => return Poll::Ready(Some(reply)),
                    Poll::Ready(None) => {
                        drop(pending.remove(i));
                    }
                    Poll::Pending => i += 1,
                }
            }
            if pending.is_empty() {
                Poll::Ready(None)
            } else {
                Poll::Pending
            }
        });

        match tokio::time::timeout(self.reply_timeout, race).await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => {
                debug!(msg_type = message.msg_type(), "No handler replied");
                Ok(Reply::Acknowledge)
            }
            Err(_) => Err(GatewayError::HandlerTimeout(self.reply_timeout)),
        }
    }
}
