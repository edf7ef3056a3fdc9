use std::sync::OnceLock;

use partno_core::{NoiseFilter, ParsedItem, PartLine, ReconcileConfig, INSUFFICIENT_TOKENS};
use regex::Regex;

use crate::names::SubstitutionTable;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_name_delims, r"[,/]+");
re!(re_non_digit, r"[^0-9]");

/// name, material, quantity, spec
const MIN_TOKENS: usize = 4;

// ── Line parser ──────────────────────────────────────────────────────────────

/// Turns raw OCR text into `ParsedItem`s.
///
/// Each item line is read positionally as `name material quantity spec...`.
pub struct LineParser {
    header_groups: Vec<Vec<String>>,
    markers: Vec<String>,
    names: SubstitutionTable,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::from_config(&ReconcileConfig::default())
    }
}

impl LineParser {
    pub fn new(noise: &NoiseFilter, names: SubstitutionTable) -> Self {
        Self {
            header_groups: noise
                .header_groups
                .iter()
                .map(|g| lowercase_all(g))
                .filter(|g| !g.is_empty())
                .collect(),
            markers: lowercase_all(&noise.markers),
            names,
        }
    }

    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self::new(&config.noise, SubstitutionTable::new(config.substitutions.clone()))
    }

    /// Parse every line of `text`. Output order follows line order; one line
    /// may yield several items when its name lists several parts.
    pub fn parse(&self, text: &str) -> Vec<ParsedItem> {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .filter(|l| !self.is_noise(l))
            .flat_map(|l| self.parse_line(l))
            .collect()
    }

    /// Table headers and remark/part-number rows.
    pub fn is_noise(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        let is_header = !self.header_groups.is_empty()
            && self
                .header_groups
                .iter()
                .all(|group| group.iter().any(|w| lower.contains(w.as_str())));
        is_header || self.markers.iter().any(|m| lower.contains(m.as_str()))
    }

    /// Parse one trimmed, non-noise line.
    pub fn parse_line(&self, line: &str) -> Vec<ParsedItem> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < MIN_TOKENS {
            return vec![ParsedItem::parse_error(line, INSUFFICIENT_TOKENS)];
        }

        // A leading phrase only counts as the name when the three positional
        // fields still follow it.
        let name_len = match self.names.leading_phrase_len(&tokens) {
            n if tokens.len() >= n + MIN_TOKENS - 1 => n,
            _ => 1,
        };

        let raw_name = tokens[..name_len].join(" ");
        let material = tokens[name_len];
        let quantity = extract_digits(tokens[name_len + 1]);
        let spec = tokens[name_len + 2..].join(" ");

        let names = split_name(&raw_name);
        if names.is_empty() {
            tracing::warn!(line, "name has no text between delimiters, line dropped");
        }

        names
            .into_iter()
            .map(|n| ParsedItem::Item(PartLine::new(&self.names.apply(n), material, &quantity, &spec)))
            .collect()
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Keep only the ASCII digits of a quantity token; `"0"` when there are none.
pub fn extract_digits(token: &str) -> String {
    let digits = re_non_digit().replace_all(token, "");
    if digits.is_empty() {
        tracing::warn!(token, "quantity has no digits, using 0");
        "0".to_string()
    } else {
        digits.into_owned()
    }
}

/// Split a compound name on runs of `,` and `/`, dropping empty parts.
pub fn split_name(raw: &str) -> Vec<&str> {
    re_name_delims()
        .split(raw)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
