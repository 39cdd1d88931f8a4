//! Pulls the champion table literal out of a fetched wiki page.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ExtractionError;
use crate::scan::matching_brace;

static TEXTAREA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<textarea[^>]*>(.*?)</textarea>").expect("textarea regex is valid")
});

static PRE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<pre[^>]*>(.*?)</pre>").expect("pre regex is valid"));

static RETURN_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\breturn\s*\{").expect("return regex is valid"));

static SOURCE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\["changes"\]\s*=\s*"(V\d+\.\d+)""#).expect("source version regex is valid")
});

/// Decodes the HTML entities the wiki uses when embedding module source.
///
/// Single pass, so `&amp;lt;` becomes `&lt;` rather than `<`.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    const ENTITIES: [(&str, char); 7] = [
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&amp;", '&'),
        ("&#39;", '\''),
        ("&#039;", '\''),
        ("&apos;", '\''),
    ];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match ENTITIES
            .iter()
            .find(|(entity, _)| tail.starts_with(entity))
        {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Returns the `{ ... }` literal following the first `return` marker in the
/// page, with entities decoded.
///
/// The edit textarea is searched first, then any `<pre>` block, then the
/// whole document.
///
/// # Errors
///
/// [`ExtractionError::NotFound`] when no region holds a `return {` marker,
/// [`ExtractionError::Unterminated`] when the only literals found are never
/// closed.
pub fn extract_table(html: &str) -> Result<String, ExtractionError> {
    let regions = TEXTAREA
        .captures_iter(html)
        .chain(PRE.captures_iter(html))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .chain(std::iter::once(html));

    let mut unterminated = None;
    for region in regions {
        let decoded = decode_entities(region);
        for marker in RETURN_TABLE.find_iter(&decoded) {
            let open = marker.end() - 1;
            match matching_brace(&decoded, open) {
                Some(close) => {
                    tracing::debug!(
                        len = close + 1 - open,
                        "extracted table literal"
                    );
                    return Ok(decoded[open..=close].to_string());
                }
                None => {
                    unterminated.get_or_insert(open);
                }
            }
        }
    }

    match unterminated {
        Some(offset) => Err(ExtractionError::Unterminated { offset }),
        None => Err(ExtractionError::NotFound { bytes: html.len() }),
    }
}

/// First `["changes"] = "V<major>.<minor>"` label in the page, if any.
#[must_use]
pub fn extract_source_version(html: &str) -> Option<String> {
    let decoded = decode_entities(html);
    SOURCE_VERSION
        .captures(&decoded)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
