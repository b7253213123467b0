//! Google Cloud Translation provider (v2 REST API).

mod client;
mod messages;


pub use client::{GoogleTranslateConfig, GoogleTranslator};
pub use messages::decode_html_entities;
