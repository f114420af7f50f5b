//! Text sanitizing helpers
//!
//! TMDB hands back free text (overviews, biographies, trailer URLs) that may
//! carry HTML markup, character references and bare ampersands. These helpers
//! turn it into plain text that is safe to embed in XML feeds.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Matches a tag span or a character reference (`&name;`, `&#NN;`, `&#xHH;`).
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<[^>]*>|&(?:#[0-9]+|#x[0-9A-Fa-f]+|[A-Za-z][A-Za-z0-9]*);")
        .expect("failed to compile markup regex")
});

/// Placeholder used while escaping ampersands. XML text cannot carry NUL.
const AMP_SENTINEL: &str = "\u{0}";

/// Decodes raw bytes into text
///
/// Returns an empty string when the bytes are not valid UTF-8. This never
/// fails; callers treat undecodable data as missing.
pub fn normalize(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => String::new(),
    }
}

/// Removes HTML markup from a text string
///
/// Tags are dropped, numeric and named character references are
/// resolved, and line feeds become spaces. References that cannot be resolved
/// are left exactly as they appear.
///
/// # Examples
///
/// ```
/// use tmdb_api::text::strip_markup;
///
/// assert_eq!(strip_markup("<b>Caf&eacute;</b>\nnoir"), "Café noir");
/// assert_eq!(strip_markup("&bogus;"), "&bogus;");
/// ```
pub fn strip_markup(text: &str) -> String {
    MARKUP
        .replace_all(text, |caps: &Captures| resolve_markup(&caps[0]))
        .replace('\n', " ")
}

/// Replaces a single markup match with its plain text equivalent.
fn resolve_markup(matched: &str) -> String {
    if matched.starts_with('<') {
        return String::new();
    }

    let decoded = html_escape::decode_html_entities(matched);

    // Legacy prefixes decode partially (`&ampx;` gives `&x;`); only a whole
    // reference resolving to one or two characters counts.
    let resolved = decoded != matched
        && decoded.chars().count() <= 2
        && !decoded.contains(char::REPLACEMENT_CHARACTER);

    if resolved {
        decoded.into_owned()
    } else {
        matched.to_string()
    }
}

/// Replaces every bare `&` with `&amp;`
///
/// Existing `&amp;` sequences are preserved rather than escaped again, so
/// applying this twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// use tmdb_api::text::escape_ampersand;
///
/// let once = escape_ampersand("Tom & Jerry &amp; friends");
/// assert_eq!(once, "Tom &amp; Jerry &amp; friends");
/// assert_eq!(escape_ampersand(&once), once);
/// ```
pub fn escape_ampersand(text: &str) -> String {
    text.replace("&amp;", AMP_SENTINEL)
        .replace('&', "&amp;")
        .replace(AMP_SENTINEL, "&amp;")
}

/// Strips markup and escapes ampersands, as needed for feed descriptions.
pub fn clean_description(text: &str) -> String {
    escape_ampersand(&strip_markup(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Amélie".as_bytes()), "Amélie");
        assert_eq!(normalize(b""), "");
        // Lone continuation byte is not UTF-8
        assert_eq!(normalize(&[0x41, 0x80, 0x42]), "");
    }

    #[test]
    fn test_strip_markup_tags() {
        assert_eq!(strip_markup("<p>Hello <i>world</i></p>"), "Hello world");
        assert_eq!(strip_markup("<a\nhref=\"x\">link</a>"), "link");
    }

    #[test]
    fn test_strip_markup_references() {
        assert_eq!(strip_markup("&#65;&#x42;&#X43;"), "AB&#X43;");
        assert_eq!(strip_markup("caf&eacute; &amp; bar"), "café & bar");
        assert_eq!(strip_markup("&unknown; stays"), "&unknown; stays");
        assert_eq!(strip_markup("&#99999999;"), "&#99999999;");
        assert_eq!(strip_markup("&#x;"), "&#x;");
        assert_eq!(strip_markup("&ampx; &ltfoo;"), "&ampx; &ltfoo;");
        assert_eq!(strip_markup("&hellip;&nbsp;&Omega;"), "\u{2026}\u{a0}\u{3a9}");
    }

    #[test]
    fn test_strip_markup_newlines() {
        assert_eq!(strip_markup("line one\nline two"), "line one line two");
    }

    #[test]
    fn test_escape_ampersand() {
        assert_eq!(escape_ampersand("a & b"), "a &amp; b");
        assert_eq!(escape_ampersand("a &amp; b"), "a &amp; b");
        assert_eq!(escape_ampersand("no ampersand"), "no ampersand");
        assert_eq!(
            escape_ampersand("http://youtube.com/watch?v=x&feature=y"),
            "http://youtube.com/watch?v=x&amp;feature=y"
        );
    }

    #[test]
    fn test_escape_ampersand_keeps_tildes() {
        assert_eq!(escape_ampersand("~~~~&amp;"), "~~~~&amp;");
        assert_eq!(escape_ampersand("~~~~~ & ~"), "~~~~~ &amp; ~");
    }

    #[test]
    fn test_escape_ampersand_is_idempotent() {
        let inputs = ["&", "&&amp;&", "x &amp;amp; y", "&lt; & &gt;", ""];
        for input in inputs {
            let once = escape_ampersand(input);
            assert_eq!(escape_ampersand(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(
            clean_description("<b>Fast &amp; Furious</b>\nA & B"),
            "Fast &amp; Furious A &amp; B"
        );
    }
}
