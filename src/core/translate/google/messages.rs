//! Wire types of the Translation v2 REST API.

use serde::{Deserialize, Serialize};

/// Body of `POST /language/translate/v2`.
#[derive(Debug, Clone, Serialize)]
pub struct TranslateRequest<'a> {
    pub q: &'a str,
    pub source: &'a str,
    pub target: &'a str,
    /// "text" keeps the service from treating the input as HTML
    pub format: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslateResponse {
    pub data: TranslationsData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationsData {
    #[serde(default)]
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub translated_text: String,
    #[serde(default)]
    pub detected_source_language: Option<String>,
}

/// Reply of `GET /language/translate/v2/languages`.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguagesResponse {
    pub data: LanguagesData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguagesData {
    #[serde(default)]
    pub languages: Vec<LanguageEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageEntry {
    pub language: String,
}

/// Decode the HTML entities the v2 API may leave in translated text.
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    text.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        // Last, so "&amp;lt;" becomes "&lt;" rather than "<".
        .replace("&amp;", "&")
}
