//! Shared Types

pub mod account;
pub mod event;
pub mod media;
pub mod reply;
pub mod request;

pub use account::{AccountContext, TrustMode};
pub use event::*;
pub use media::MediaKind;
pub use reply::{Article, OutboundMessage, Reply, ReplyBody};
pub use request::*;
