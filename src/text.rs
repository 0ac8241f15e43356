use icu_normalizer::ComposingNormalizerBorrowed;

/// NFC-normalize and trim user input.
///
/// Arabic input frequently arrives with decomposed harakat depending on the
/// keyboard/IME; prompts and history entries are stored in composed form.
pub fn normalize_input(text: &str) -> String {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    nfc.normalize(text.trim()).into_owned()
}

/// Like [`normalize_input`], but maps blank input to `None`.
pub fn normalize_optional(text: &str) -> Option<String> {
    let normalized = normalize_input(text);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Shorten `text` to at most `max_chars` characters, appending an ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('\u{2026}');
    out
}
