use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason attached to a line that could not be split into the four positional fields.
pub const INSUFFICIENT_TOKENS: &str = "insufficient tokens";

/// One purchase-order line after tokenizing, name splitting and substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartLine {
    pub name: String,
    pub material: String,
    /// Decimal digits only; `"0"` when the source token had none.
    pub quantity: String,
    pub spec: String,
}

impl PartLine {
    pub fn new(name: &str, material: &str, quantity: &str, spec: &str) -> Self {
        PartLine {
            name: name.to_string(),
            material: material.to_string(),
            quantity: quantity.to_string(),
            spec: spec.to_string(),
        }
    }

    /// Space-joined `name material spec`, the raw text the matcher normalizes.
    pub fn comparison_text(&self) -> String {
        format!("{} {} {}", self.name, self.material, self.spec)
    }
}

/// The unit of reconciliation: either a well-formed line or the raw text of
/// a line the parser rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedItem {
    Item(PartLine),
    ParseError {
        #[serde(rename = "rawLine")]
        raw_line: String,
        reason: String,
    },
}

impl ParsedItem {
    pub fn parse_error(raw_line: &str, reason: &str) -> Self {
        ParsedItem::ParseError {
            raw_line: raw_line.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, ParsedItem::ParseError { .. })
    }

    pub fn as_line(&self) -> Option<&PartLine> {
        match self {
            ParsedItem::Item(line) => Some(line),
            ParsedItem::ParseError { .. } => None,
        }
    }
}

impl From<PartLine> for ParsedItem {
    fn from(line: PartLine) -> Self {
        ParsedItem::Item(line)
    }
}

impl fmt::Display for ParsedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedItem::Item(l) => write!(f, "{} / {} / {} / {}", l.name, l.material, l.quantity, l.spec),
            ParsedItem::ParseError { raw_line, reason } => write!(f, "{raw_line} ({reason})"),
        }
    }
}
