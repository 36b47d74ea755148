//! Content codec between stored memo markup and editable plain text.
//!
//! # Responsibility
//! - Extract the body container from a stored markup fragment.
//! - Convert paragraph segments to lines and back.
//!
//! # Invariants
//! - The first body container wins when a fragment carries several.
//! - A fragment without a body container decodes to empty text.
//! - `decode(encode(t)) == t` for text that does not itself contain the
//!   paragraph delimiter or container markup. No escaping is performed; the
//!   stored format must stay byte-compatible with existing memos.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Opening tag of the body container written by `encode`.
pub const BODY_OPEN: &str = "<div id=\"body\">";
/// Closing tag of the body container.
pub const BODY_CLOSE: &str = "</div>";
const PARAGRAPH_OPEN: &str = "<p>";
const PARAGRAPH_CLOSE: &str = "</p>";

static BODY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<div[^>]*?id="body"[^>]*?>(.*?)</div>"#).expect("valid body regex")
});
static PARAGRAPH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<p>(.*?)</p>").expect("valid paragraph regex"));

/// Returns the inner content of the first body container, if any.
pub fn extract_body(markup: &str) -> Option<&str> {
    BODY_RE
        .captures(markup)
        .and_then(|caps| caps.get(1))
        .map(|inner| inner.as_str())
}

/// Decodes a stored fragment into one string per paragraph segment.
///
/// Content inside the container but outside any paragraph is ignored.
pub fn decode_lines(markup: &str) -> Vec<String> {
    let Some(body) = extract_body(markup) else {
        debug!(
            "event=codec_decode module=codec status=empty reason=missing_body_container input_len={}",
            markup.len()
        );
        return Vec::new();
    };

    PARAGRAPH_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Decodes a stored fragment into editable plain text.
pub fn decode(markup: &str) -> String {
    decode_lines(markup).join("\n")
}

/// Encodes plain text into the stored fragment format.
///
/// Every line, empty ones included, becomes one paragraph; empty input yields
/// an empty container.
pub fn encode(plain_text: &str) -> String {
    let mut markup = String::with_capacity(
        BODY_OPEN.len() + BODY_CLOSE.len() + plain_text.len() + 8 * plain_text.lines().count(),
    );
    markup.push_str(BODY_OPEN);
    if !plain_text.is_empty() {
        for line in plain_text.split('\n') {
            markup.push_str(PARAGRAPH_OPEN);
            markup.push_str(line);
            markup.push_str(PARAGRAPH_CLOSE);
        }
    }
    markup.push_str(BODY_CLOSE);
    markup
}
