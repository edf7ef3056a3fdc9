use serde::{Serialize, Serializer};
use std::fmt;

/// Part number shown when the matched catalog row has none.
pub const NO_PART_NUMBER: &str = "(no part number)";

/// Placeholder for spec/quantity of a line that failed to parse.
pub const NOT_AVAILABLE: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmatchedReason {
    /// The line never became a `PartLine`; `detail` is the parser's reason.
    ParseError { detail: String },
    BelowThreshold,
}

impl UnmatchedReason {
    pub fn code(&self) -> &'static str {
        match self {
            UnmatchedReason::ParseError { .. } => "parse error",
            UnmatchedReason::BelowThreshold => "below similarity threshold",
        }
    }
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedReason::ParseError { detail } => write!(f, "{} ({detail})", self.code()),
            UnmatchedReason::BelowThreshold => f.write_str(self.code()),
        }
    }
}

impl Serialize for UnmatchedReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedItem {
    pub seq: usize,
    pub pn: String,
    pub name: String,
    pub spec: String,
    pub quantity: String,
    /// Rounded percentage, e.g. `"87%"`.
    pub match_rate: String,
    pub score: f64,
    pub sheet_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedItem {
    pub seq: usize,
    pub name: String,
    pub spec: String,
    pub quantity: String,
    pub reason: UnmatchedReason,
}

/// Every reconciled item lands in exactly one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub matched_items: Vec<MatchedItem>,
    pub unmatched_items: Vec<UnmatchedItem>,
}

impl ReconcileReport {
    pub fn len(&self) -> usize {
        self.matched_items.len() + self.unmatched_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `0.874` → `"87%"`. Exact halves round up, so `0.625` → `"63%"`.
pub fn format_match_rate(score: f64) -> String {
    format!("{:.0}%", (score * 100.0).round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_rate_rounds_to_whole_percent() {
        assert_eq!(format_match_rate(1.0), "100%");
        assert_eq!(format_match_rate(0.874), "87%");
        assert_eq!(format_match_rate(0.4), "40%");
        assert_eq!(format_match_rate(0.0), "0%");
    }

    #[test]
    fn match_rate_halves_round_up() {
        // Dice scores are 2k/n, so halves are common.
        assert_eq!(format_match_rate(0.425), "43%");
        assert_eq!(format_match_rate(0.625), "63%");
        assert_eq!(format_match_rate(0.005), "1%");
    }

    #[test]
    fn reason_display() {
        let r = UnmatchedReason::ParseError { detail: "insufficient tokens".into() };
        assert_eq!(r.to_string(), "parse error (insufficient tokens)");
        assert_eq!(r.code(), "parse error");
        assert_eq!(UnmatchedReason::BelowThreshold.to_string(), "below similarity threshold");
    }

    #[test]
    fn report_serializes_with_stable_field_names() {
        let report = ReconcileReport {
            matched_items: vec![MatchedItem {
                seq: 1,
                pn: "B-100".into(),
                name: "HEX BOLT".into(),
                spec: "M10x30".into(),
                quantity: "10".into(),
                match_rate: "100%".into(),
                score: 1.0,
                sheet_name: "볼트".into(),
            }],
            unmatched_items: vec![UnmatchedItem {
                seq: 2,
                name: "SW 2".into(),
                spec: NOT_AVAILABLE.into(),
                quantity: NOT_AVAILABLE.into(),
                reason: UnmatchedReason::ParseError { detail: "insufficient tokens".into() },
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["matchedItems"][0]["pn"], "B-100");
        assert_eq!(json["matchedItems"][0]["matchRate"], "100%");
        assert_eq!(json["matchedItems"][0]["sheetName"], "볼트");
        assert_eq!(json["unmatchedItems"][0]["seq"], 2);
        assert_eq!(json["unmatchedItems"][0]["reason"], "parse error (insufficient tokens)");
        assert_eq!(report.len(), 2);
    }
}
