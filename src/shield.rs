//! Markup shield: hides inline tags from the translation service.
//!
//! Tags are angle-bracket spans, non-nested, ending at the first `>`
//! (`<a<b>>` yields the span `<a<b>` followed by a literal `>`). A `<` with no
//! closing bracket is plain text. Each span is swapped for a `[[[TAG<n>]]]`
//! token before translation and swapped back afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Placeholder remnants the translator may have mangled around the number
static LOOSE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[\]_]*TAG(\d+)[\[\]_]*").unwrap());

/// Placeholder token to the markup fragment it replaced
pub type PlaceholderMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shielded {
    pub text: String,
    pub placeholders: PlaceholderMap,
}

pub fn placeholder_token(n: usize) -> String {
    format!("[[[TAG{}]]]", n)
}

/// Replace markup spans left to right with fresh placeholder tokens.
///
/// Numbers already visible in the source (even in mangled form) are skipped so
/// a token never collides with text the translator is supposed to see.
pub fn shield(text: &str) -> Shielded {
    let taken: BTreeSet<usize> = LOOSE_PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();

    let mut placeholders = PlaceholderMap::new();
    let mut next = 0usize;

    let shielded = MARKUP.replace_all(text, |caps: &Captures| {
        while taken.contains(&next) {
            next += 1;
        }
        let token = placeholder_token(next);
        next += 1;
        placeholders.insert(token.clone(), caps[0].to_string());
        token
    });

    Shielded {
        text: shielded.into_owned(),
        placeholders,
    }
}

/// Put the recorded fragments back into `translated`.
///
/// Exact token matches are restored first; remnants of minted tokens whose
/// brackets were altered are then dropped. A token the translator removed
/// entirely loses its fragment.
pub fn unshield(translated: &str, placeholders: &PlaceholderMap) -> String {
    let mut restored = restore_exact(translated, placeholders);

    let minted: BTreeSet<String> = placeholders
        .keys()
        .filter_map(|token| LOOSE_PLACEHOLDER.captures(token))
        .map(|caps| caps[1].to_string())
        .collect();

    if !minted.is_empty() {
        restored = strip_remnants(&restored, &minted);
    }

    restored
}

fn restore_exact(translated: &str, placeholders: &PlaceholderMap) -> String {
    placeholders
        .iter()
        .fold(translated.to_string(), |text, (token, fragment)| text.replace(token, fragment))
}

fn strip_remnants(text: &str, minted: &BTreeSet<String>) -> String {
    LOOSE_PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            if minted.contains(&caps[1]) {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}
