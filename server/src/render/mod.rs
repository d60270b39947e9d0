//! Reply Rendering
//!
//! Passive replies are XML documents returned in the HTTP response.
//! Customer-service pushes use the JSON form.

mod json;
mod xml;

pub use json::render_json;
pub use xml::{render_encrypted, render_xml, ACKNOWLEDGE_BODY, SUPPRESS_BODY};
