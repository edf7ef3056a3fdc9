use partno_core::{Catalog, ParsedItem, ReconcileConfig, ReconcileReport};
use partno_match::Reconciler;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::parser::LineParser;
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// The result of one purchase-order run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResult {
    /// Raw OCR text output.
    pub ocr_text: String,
    /// Items as parsed, before matching; `report` sequence numbers index into this.
    pub items: Vec<ParsedItem>,
    pub report: ReconcileReport,
}

/// Orchestrates: OCR → line parsing → catalog reconciliation.
///
/// The catalog is shared read-only; replacing it swaps the `Arc`, so runs
/// already holding the previous snapshot are unaffected.
pub struct OrderPipeline<R: OcrBackend> {
    recognizer: R,
    parser: LineParser,
    reconciler: Reconciler,
    catalog: Arc<Catalog>,
}

impl<R: OcrBackend> OrderPipeline<R> {
    pub fn new(recognizer: R, catalog: Arc<Catalog>, config: &ReconcileConfig) -> Self {
        Self {
            recognizer,
            parser: LineParser::from_config(config),
            reconciler: Reconciler::from_config(config),
            catalog,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn replace_catalog(&mut self, catalog: Arc<Catalog>) {
        self.catalog = catalog;
    }

    /// Process a file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<OrderResult, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes)
    }

    /// Process raw image bytes (from an upload or a file read).
    pub fn process_bytes(&self, data: &[u8]) -> Result<OrderResult, PipelineError> {
        let ocr_text = self.recognizer.recognize(data)?;
        Ok(self.process_text(&ocr_text))
    }

    /// Like [`process_bytes`](Self::process_bytes), but an OCR failure is
    /// logged and treated as an image with no text.
    pub fn process_bytes_lenient(&self, data: &[u8]) -> OrderResult {
        match self.recognizer.recognize(data) {
            Ok(text) => self.process_text(&text),
            Err(e) => {
                tracing::warn!("OCR failed, continuing with empty text: {e}");
                self.process_text("")
            }
        }
    }

    /// Parse and reconcile text that has already been recognized.
    pub fn process_text(&self, ocr_text: &str) -> OrderResult {
        let items = self.parser.parse(ocr_text);
        let report = self.reconciler.reconcile(&items, &self.catalog);
        tracing::info!(
            items = items.len(),
            matched = report.matched_items.len(),
            unmatched = report.unmatched_items.len(),
            "purchase order reconciled"
        );
        OrderResult {
            ocr_text: ocr_text.to_string(),
            items,
            report,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{NoEngine, PresetText};
    use partno_core::{CatalogRow, Sheet, UnmatchedReason};

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::new(vec![Sheet::new(
            "볼트",
            vec![
                CatalogRow::new()
                    .with("자재명", "HEX BOLT")
                    .with("재질", "STEEL")
                    .with("규격", "M10X30")
                    .with("품번", "B-100"),
                CatalogRow::new()
                    .with("자재명", "SW (SPRING WASHER)")
                    .with("재질", "STEEL")
                    .with("규격", "M10"),
            ],
        )]))
    }

    const ORDER: &str = "명칭 재료 수량 규격\n\
                         HEX SOCKET HEAD BOLT STEEL 10 M10x30\n\
                         SW STEEL 10pcs M10\n\
                         WELDING ROD\n\
                         비고 급함\n";

    #[test]
    fn process_bytes_produces_report() {
        let pipeline = OrderPipeline::new(
            PresetText::new(ORDER),
            catalog(),
            &ReconcileConfig::default(),
        );

        let result = pipeline.process_bytes(b"png").unwrap();

        assert_eq!(result.ocr_text, ORDER);
        assert_eq!(result.items.len(), 3);
        assert_eq!(result.report.len(), 3);

        let matched = &result.report.matched_items;
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].seq, 1);
        assert_eq!(matched[0].pn, "B-100");
        assert_eq!(matched[0].name, "HEX BOLT");
        assert_eq!(matched[1].name, "SW (SPRING WASHER)");
        assert_eq!(matched[1].quantity, "10");

        let unmatched = &result.report.unmatched_items;
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].seq, 3);
        assert_eq!(unmatched[0].name, "WELDING ROD");
        assert!(matches!(unmatched[0].reason, UnmatchedReason::ParseError { .. }));
    }

    #[test]
    fn ocr_failure_is_an_error() {
        let pipeline = OrderPipeline::new(NoEngine, catalog(), &ReconcileConfig::default());
        assert!(matches!(pipeline.process_bytes(b"png"), Err(PipelineError::Ocr(_))));
    }

    #[test]
    fn lenient_ocr_failure_yields_empty_report() {
        let pipeline = OrderPipeline::new(NoEngine, catalog(), &ReconcileConfig::default());
        let result = pipeline.process_bytes_lenient(b"png");
        assert!(result.ocr_text.is_empty());
        assert!(result.report.is_empty());
    }

    #[test]
    fn stricter_threshold_from_config() {
        let config = ReconcileConfig::default().with_threshold(1.0).unwrap();
        let pipeline = OrderPipeline::new(PresetText::new(""), catalog(), &config);
        let result = pipeline.process_text("SW,PW STEEL 10 M10");
        // Only the spring washer has an identical catalog key.
        assert_eq!(result.report.matched_items.len(), 1);
        assert_eq!(result.report.matched_items[0].match_rate, "100%");
        assert_eq!(result.report.unmatched_items.len(), 1);
        assert_eq!(result.report.unmatched_items[0].name, "PW (PLAIN WASHER)");
    }

    #[test]
    fn replacing_catalog_affects_later_runs() {
        let mut pipeline = OrderPipeline::new(
            PresetText::new(""),
            catalog(),
            &ReconcileConfig::default(),
        );
        let before = pipeline.process_text("NUT STEEL 4 M10X30");
        assert_eq!(before.report.matched_items[0].sheet_name, "볼트");

        pipeline.replace_catalog(Arc::new(Catalog::new(vec![Sheet::new(
            "너트",
            vec![CatalogRow::new().with("자재명", "NUT").with("규격", "M10X30")],
        )])));
        let after = pipeline.process_text("NUT STEEL 4 M10X30");
        assert_eq!(after.report.matched_items.len(), 1);
        assert_eq!(after.report.matched_items[0].sheet_name, "너트");
        assert_eq!(after.report.matched_items[0].pn, partno_core::NO_PART_NUMBER);
    }

    #[tokio::test]
    async fn process_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let pipeline = OrderPipeline::new(
            PresetText::new("SW STEEL 10 M10"),
            catalog(),
            &ReconcileConfig::default(),
        );
        let result = pipeline.process_file(&path).await.unwrap();
        assert_eq!(result.report.matched_items.len(), 1);

        let missing = pipeline.process_file(&dir.path().join("missing.png")).await;
        assert!(matches!(missing, Err(PipelineError::Io(_))));
    }
}
