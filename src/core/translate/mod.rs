//! Text translation.

pub mod base;
pub mod google;

pub use base::{TranslationError, Translator};
pub use google::{GoogleTranslateConfig, GoogleTranslator};
