//! Nepali vocabulary used to bias recognition.

/// Common Nepali words and phrases passed to the recognizer as speech context.
pub const NEPALI_PHRASE_HINTS: &[&str] = &[
    // Greetings and courtesy
    "नमस्ते",
    "धन्यवाद",
    "माफ गर्नुहोस्",
    "तपाईंलाई कस्तो छ",
    // Pronouns
    "म",
    "तिमी",
    "हामी",
    "उनीहरू",
    // Question words
    "के",
    "किन",
    "कसरी",
    "कहाँ",
    // Numbers
    "एक",
    "दुई",
    "तीन",
    "चार",
    "पाँच",
    "छ",
    "सात",
    "आठ",
    "नौ",
    "दश",
    // Everyday nouns
    "खाना",
    "पानी",
    "घर",
    "स्कूल",
    "बजार",
    "काम",
];

/// Boost applied to the hints in the complete-recording flow.
pub const PRIMARY_HINT_BOOST: f32 = 20.0;

/// Boost applied to the hints in the legacy chunk flow.
pub const LEGACY_HINT_BOOST: f32 = 15.0;

/// Owned copy of the hint set, as sent on the wire.
pub fn phrase_hints() -> Vec<String> {
    NEPALI_PHRASE_HINTS.iter().map(|s| s.to_string()).collect()
}
