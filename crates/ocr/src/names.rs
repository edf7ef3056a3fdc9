use std::collections::BTreeMap;

use partno_core::config::default_substitutions;

/// Case-insensitive name substitution, e.g. `sw` → `SW (SPRING WASHER)`.
///
/// Keys are stored uppercase with single spaces. Replacements are returned
/// verbatim, so the table decides the output casing.
#[derive(Debug, Clone)]
pub struct SubstitutionTable {
    entries: BTreeMap<String, String>,
    /// Multi-word keys as token lists, longest first.
    phrases: Vec<Vec<String>>,
}

impl Default for SubstitutionTable {
    fn default() -> Self {
        Self::new(default_substitutions())
    }
}

impl SubstitutionTable {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        let entries: BTreeMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (canonical_key(&k), v))
            .filter(|(k, _)| !k.is_empty())
            .collect();

        let mut phrases: Vec<Vec<String>> = entries
            .keys()
            .map(|k| k.split(' ').map(str::to_string).collect::<Vec<_>>())
            .filter(|words| words.len() > 1)
            .collect();
        phrases.sort_by(|a, b| b.len().cmp(&a.len()));

        Self { entries, phrases }
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries.get(&canonical_key(name)).map(String::as_str)
    }

    /// Replacement if the table knows `name`, otherwise `name` unchanged.
    pub fn apply(&self, name: &str) -> String {
        self.lookup(name).unwrap_or(name).to_string()
    }

    /// How many leading tokens form the item name: the length of the longest
    /// multi-word key the line starts with, or 1.
    pub fn leading_phrase_len(&self, tokens: &[&str]) -> usize {
        self.phrases
            .iter()
            .find(|phrase| {
                phrase.len() <= tokens.len()
                    && phrase
                        .iter()
                        .zip(tokens)
                        .all(|(word, token)| token.to_uppercase() == *word)
            })
            .map_or(1, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn canonical_key(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let t = SubstitutionTable::default();
        assert_eq!(t.lookup("sw"), Some("SW (SPRING WASHER)"));
        assert_eq!(t.lookup("Sw"), Some("SW (SPRING WASHER)"));
        assert_eq!(t.lookup("pw"), Some("PW (PLAIN WASHER)"));
        assert_eq!(t.lookup("hex socket head bolt"), Some("HEX BOLT"));
    }

    #[test]
    fn unknown_name_kept_verbatim() {
        let t = SubstitutionTable::default();
        assert_eq!(t.apply("Flange"), "Flange");
        assert_eq!(t.apply("nut"), "NUT");
    }

    #[test]
    fn leading_phrase_detected() {
        let t = SubstitutionTable::default();
        let tokens = ["hex", "Socket", "HEAD", "bolt", "STEEL", "10", "M10x30"];
        assert_eq!(t.leading_phrase_len(&tokens), 4);
        assert_eq!(t.leading_phrase_len(&["HEX", "SOCKET", "STEEL", "1"]), 1);
        assert_eq!(t.leading_phrase_len(&["HEX", "SOCKET"]), 1);
        assert_eq!(t.leading_phrase_len(&[]), 1);
    }

    #[test]
    fn longest_phrase_wins() {
        let mut entries = BTreeMap::new();
        entries.insert("HEX BOLT".to_string(), "HB".to_string());
        entries.insert("hex  bolt  long".to_string(), "HBL".to_string());
        let t = SubstitutionTable::new(entries);
        assert_eq!(t.leading_phrase_len(&["HEX", "BOLT", "LONG", "SUS", "1", "M8"]), 3);
        assert_eq!(t.lookup("HEX BOLT LONG"), Some("HBL"));
    }
}
