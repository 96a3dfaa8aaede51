//! Post-processing of model replies.
//!
//! Chat models sometimes wrap the answer ("Here is the translation: ...",
//! quotes, "French: ..."). Catalog entries need the bare text.

use regex::Regex;
use std::sync::OnceLock;

static WRAPPER_PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();
static LABEL_PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();

/// Quote pairs a model may wrap its answer in.
const QUOTE_PAIRS: [(char, char); 6] = [
    ('"', '"'),
    ('\'', '\''),
    ('“', '”'),
    ('«', '»'),
    ('「', '」'),
    ('`', '`'),
];

/// Strip conversational wrappers from a model reply.
///
/// `source` is the text that was sent for translation. A wrapper is only
/// removed when the source does not carry the same wrapper itself.
pub fn clean_translation(source: &str, raw: &str, target_language: &str) -> String {
    let source = source.trim();
    let mut text = raw.trim();

    if wrapper_prefix_len(source).is_none() {
        if let Some(end) = wrapper_prefix_len(text) {
            text = text[end..].trim_start();
        }
    }

    if language_prefix_len(source, target_language).is_none() {
        if let Some(end) = language_prefix_len(text, target_language) {
            text = text[end..].trim_start();
        }
    }

    if !source.is_empty() {
        text = strip_quotes(source, text);
    }

    text.trim().to_string()
}

/// Length of a leading "Here is the translation:"-style label.
fn wrapper_prefix_len(text: &str) -> Option<usize> {
    let wrapper = WRAPPER_PREFIX_REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:(?:sure|certainly|of course)[,!.]?\s*)?(?:here(?:'s| is)\s+(?:the\s+|your\s+)?(?:\w+\s+)?translation(?:\s+(?:in|to|into)\s+[^:\n]+)?|translation(?:\s+(?:in|to|into)\s+[^:\n]+)?|translated text)\s*:\s*",
        )
        .unwrap()
    });
    wrapper.find(text).map(|m| m.end())
}

/// Length of a leading `<Language>:` or `<Language> translation:` label.
fn language_prefix_len(text: &str, target_language: &str) -> Option<usize> {
    if target_language.is_empty() {
        return None;
    }
    let label = LABEL_PREFIX_REGEX.get_or_init(|| {
        Regex::new(r"^([^:\n]{1,40}?)(?:\s+(?i:translation))?\s*:\s*").unwrap()
    });
    let caps = label.captures(text)?;
    let name = caps.get(1)?.as_str().trim();
    if name.eq_ignore_ascii_case(target_language.trim()) {
        caps.get(0).map(|m| m.end())
    } else {
        None
    }
}

fn strip_quotes<'a>(source: &str, text: &'a str) -> &'a str {
    for (open, close) in QUOTE_PAIRS {
        let source_quoted = source.starts_with(open) && source.ends_with(close);
        if source_quoted {
            continue;
        }
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            // A lone quote character is not a wrapper, and `"A" or "B"` is
            // two quoted words rather than one quoted reply
            if !inner.is_empty() && !inner.contains(open) && !inner.contains(close) {
                return inner.trim();
            }
        }
    }
    text
}
