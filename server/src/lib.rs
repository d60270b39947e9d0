//! Official-Account Message Gateway
//!
//! Receives platform callbacks, checks their signatures, decrypts and
//! parses pushed messages, dispatches them to application handlers and
//! builds the (optionally encrypted) passive reply.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod facade;
pub mod parser;
pub mod render;
pub mod response;
