use partno_core::{
    format_match_rate, Catalog, CatalogColumns, CatalogRow, MatchScope, MatchedItem, ParsedItem,
    PartLine, ReconcileConfig, ReconcileReport, UnmatchedItem, UnmatchedReason, NOT_AVAILABLE,
    NO_PART_NUMBER,
};
use rayon::prelude::*;

use crate::util::{bigram_similarity, normalize_key};

/// The winning row for one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogMatch<'a> {
    pub sheet_name: &'a str,
    pub row: &'a CatalogRow,
    pub score: f64,
}

/// Scores a `PartLine` against every row of a catalog and keeps the best.
#[derive(Debug, Clone)]
pub struct CatalogMatcher {
    pub threshold: f64,
    pub scope: MatchScope,
    pub columns: CatalogColumns,
}

impl Default for CatalogMatcher {
    fn default() -> Self {
        Self::from_config(&ReconcileConfig::default())
    }
}

impl CatalogMatcher {
    pub fn new(threshold: f64, columns: CatalogColumns) -> Self {
        Self {
            threshold,
            scope: MatchScope::Full,
            columns,
        }
    }

    pub fn with_scope(mut self, scope: MatchScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self::new(config.threshold, config.columns.clone()).with_scope(config.scope)
    }

    fn item_key(&self, line: &PartLine) -> String {
        match self.scope {
            MatchScope::Full => normalize_key(&line.comparison_text()),
            MatchScope::NameOnly => normalize_key(&line.name),
        }
    }

    fn row_text(&self, row: &CatalogRow) -> Option<String> {
        match self.scope {
            MatchScope::Full => Some(row.comparison_text(&self.columns)),
            MatchScope::NameOnly => {
                let name = row.get(&self.columns.name);
                (!name.trim().is_empty()).then(|| name.to_string())
            }
        }
    }

    /// Best-scoring row regardless of threshold.
    ///
    /// Full scan in catalog order; a later row only replaces the current best
    /// when it scores strictly higher, so ties go to the earlier row. A row
    /// scoring 0.0 is never a candidate.
    pub fn best_candidate<'a>(
        &self,
        line: &PartLine,
        catalog: &'a Catalog,
    ) -> Option<CatalogMatch<'a>> {
        let key = self.item_key(line);
        if key.is_empty() {
            tracing::warn!(name = %line.name, "item has no comparable characters");
            return None;
        }

        let mut best: Option<CatalogMatch<'a>> = None;
        for (sheet_name, row) in catalog.rows() {
            let Some(text) = self.row_text(row) else {
                continue;
            };
            let score = bigram_similarity(&key, &normalize_key(&text));
            if score > best.map_or(0.0, |b| b.score) {
                best = Some(CatalogMatch { sheet_name, row, score });
            }
        }
        best
    }

    /// Best row if it clears the threshold.
    pub fn find_match<'a>(&self, line: &PartLine, catalog: &'a Catalog) -> Option<CatalogMatch<'a>> {
        self.best_candidate(line, catalog)
            .filter(|m| m.score >= self.threshold)
    }

    /// Similarity between an already-normalized item key and a row; 0.0 for
    /// a row the scope leaves out.
    pub fn score_row(&self, item_key: &str, row: &CatalogRow) -> f64 {
        self.row_text(row)
            .map_or(0.0, |text| bigram_similarity(item_key, &normalize_key(&text)))
    }
}

enum Outcome {
    Matched(MatchedItem),
    Unmatched(UnmatchedItem),
}

/// Classifies a batch of parsed items into matched and unmatched lists.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    matcher: CatalogMatcher,
}

impl Reconciler {
    pub fn new(matcher: CatalogMatcher) -> Self {
        Self { matcher }
    }

    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self::new(CatalogMatcher::from_config(config))
    }

    pub fn matcher(&self) -> &CatalogMatcher {
        &self.matcher
    }

    /// Items are numbered from 1 in input order. Every item appears exactly
    /// once in the report, and both lists stay in sequence order.
    pub fn reconcile(&self, items: &[ParsedItem], catalog: &Catalog) -> ReconcileReport {
        let outcomes: Vec<Outcome> = items
            .par_iter()
            .enumerate()
            .map(|(idx, item)| self.classify(idx + 1, item, catalog))
            .collect();

        let mut report = ReconcileReport::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Matched(m) => report.matched_items.push(m),
                Outcome::Unmatched(u) => report.unmatched_items.push(u),
            }
        }

        tracing::debug!(
            matched = report.matched_items.len(),
            unmatched = report.unmatched_items.len(),
            "reconciled batch"
        );
        report
    }

    fn classify(&self, seq: usize, item: &ParsedItem, catalog: &Catalog) -> Outcome {
        let line = match item {
            ParsedItem::Item(line) => line,
            ParsedItem::ParseError { raw_line, reason } => {
                return Outcome::Unmatched(UnmatchedItem {
                    seq,
                    name: raw_line.clone(),
                    spec: NOT_AVAILABLE.to_string(),
                    quantity: NOT_AVAILABLE.to_string(),
                    reason: UnmatchedReason::ParseError { detail: reason.clone() },
                });
            }
        };

        match self.matcher.find_match(line, catalog) {
            Some(m) => {
                tracing::debug!(seq, name = %line.name, sheet = m.sheet_name, score = m.score, "matched");
                Outcome::Matched(MatchedItem {
                    seq,
                    pn: m
                        .row
                        .part_number(&self.matcher.columns)
                        .unwrap_or(NO_PART_NUMBER)
                        .to_string(),
                    name: line.name.clone(),
                    spec: line.spec.clone(),
                    quantity: line.quantity.clone(),
                    match_rate: format_match_rate(m.score),
                    score: m.score,
                    sheet_name: m.sheet_name.to_string(),
                })
            }
            None => {
                tracing::debug!(seq, name = %line.name, "no row above threshold");
                Outcome::Unmatched(UnmatchedItem {
                    seq,
                    name: line.name.clone(),
                    spec: line.spec.clone(),
                    quantity: line.quantity.clone(),
                    reason: UnmatchedReason::BelowThreshold,
                })
            }
        }
    }
}
