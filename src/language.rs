//! Language code matching for subtitle track tags.
//!
//! Container muxers tag tracks inconsistently: ISO 639-2 (`eng`, `por`),
//! ISO 639-1 (`en`, `pt`), BCP 47 (`pt-BR`) or plain English names. A
//! [`Language`] groups every tag that should be treated as the same language.

/// Known spellings, first entry is the canonical code
const ALIAS_TABLE: &[&[&str]] = &[
    &["en", "eng", "english", "en-us", "en-gb"],
    &["pt-BR", "por", "pt", "pt-br", "pob", "portuguese", "portugues", "português"],
    &["es", "spa", "spanish", "español", "es-es", "es-419"],
    &["fr", "fre", "fra", "french", "français", "fr-fr"],
    &["de", "ger", "deu", "german", "deutsch", "de-de"],
    &["it", "ita", "italian", "italiano"],
    &["ja", "jpn", "japanese"],
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    code: String,
    aliases: Vec<String>,
}

impl Language {
    /// Resolve a configured code to its alias group. Unknown codes only match
    /// themselves.
    pub fn from_code(code: &str) -> Self {
        let needle = normalize(code);

        let group = ALIAS_TABLE
            .iter()
            .find(|group| group.iter().any(|alias| normalize(alias) == needle));

        match group {
            Some(group) => Self {
                code: code.trim().to_string(),
                aliases: group.iter().map(|alias| normalize(alias)).collect(),
            },
            None => Self {
                code: code.trim().to_string(),
                aliases: vec![needle],
            },
        }
    }

    /// The code as configured, used for file names and service requests
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Case-insensitive match of a track language tag
    pub fn matches(&self, tag: &str) -> bool {
        let tag = normalize(tag);
        !tag.is_empty() && self.aliases.iter().any(|alias| *alias == tag)
    }
}

fn normalize(tag: &str) -> String {
    tag.trim().to_lowercase().replace('_', "-")
}
