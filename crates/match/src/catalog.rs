use calamine::{open_workbook_auto, Data, Range, Reader};
use partno_core::{Catalog, CatalogRow, Sheet};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),
}

/// Load a catalog, picking the reader from the file extension.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    let catalog = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path)?,
        "csv" => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Sheet1")
                .to_string();
            let file = std::fs::File::open(path)?;
            Catalog::new(vec![load_csv(file, &name)?])
        }
        "json" => Catalog::from_json(&std::fs::read_to_string(path)?)?,
        other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
    };

    tracing::info!(
        path = %path.display(),
        sheets = catalog.sheet_count(),
        rows = catalog.row_count(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Like [`load_catalog`], but a missing or unreadable catalog degrades to an
/// empty one so every item reconciles as unmatched.
pub fn load_or_empty(path: &Path) -> Catalog {
    load_catalog(path).unwrap_or_else(|e| {
        tracing::error!(path = %path.display(), error = %e, "catalog unavailable, continuing with an empty catalog");
        Catalog::empty()
    })
}

/// Every worksheet in workbook order. The first row of each sheet is the header.
pub fn load_workbook(path: &Path) -> Result<Catalog, CatalogError> {
    let mut workbook = open_workbook_auto(path)?;
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        sheets.push(Sheet::new(name, rows_from_range(&range)));
    }
    Ok(Catalog::new(sheets))
}

/// Header-keyed rows from a cell range. Blank cells are left out of the row,
/// rows with no value at all are skipped, and unnamed columns are ignored.
pub fn rows_from_range(range: &Range<Data>) -> Vec<CatalogRow> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header.iter().map(|c| cell_text(c).trim().to_string()).collect();

    rows.filter_map(|cells| {
        let row: CatalogRow = header
            .iter()
            .zip(cells)
            .filter(|(h, _)| !h.is_empty())
            .map(|(h, c)| (h.clone(), cell_text(c)))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        (!row.is_empty()).then_some(row)
    })
    .collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A single sheet from CSV with a header row.
pub fn load_csv<R: Read>(data: R, sheet_name: &str) -> Result<Sheet, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: CatalogRow = header
            .iter()
            .zip(record.iter())
            .filter(|(h, v)| !h.is_empty() && !v.trim().is_empty())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(Sheet::new(sheet_name, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_rows_are_keyed_by_header() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), Data::String("자재명".into()));
        range.set_value((0, 1), Data::String("품번".into()));
        range.set_value((0, 2), Data::String("  ".into()));
        range.set_value((1, 0), Data::String("HEX BOLT".into()));
        range.set_value((1, 1), Data::Float(1001.0));
        range.set_value((1, 2), Data::String("no header".into()));
        // row 2 left empty
        range.set_value((3, 0), Data::String("NUT".into()));
        range.set_value((3, 1), Data::Int(7));

        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("자재명"), "HEX BOLT");
        assert_eq!(rows[0].get("품번"), "1001");
        assert_eq!(rows[0].columns().count(), 2);
        assert_eq!(rows[1].get("품번"), "7");
    }

    #[test]
    fn empty_range_has_no_rows() {
        let range: Range<Data> = Range::empty();
        assert!(rows_from_range(&range).is_empty());
    }

    #[test]
    fn csv_sheet() {
        let data = "\u{feff}자재명,재질,규격,품번\nHEX BOLT,STEEL,M10X30,B-100\n,,,\nNUT,STEEL,M10\n";
        let sheet = load_csv(data.as_bytes(), "parts").unwrap();
        assert_eq!(sheet.name, "parts");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].get("자재명"), "HEX BOLT");
        assert_eq!(sheet.rows[1].get("품번"), "");
    }

    #[test]
    fn load_catalog_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("bolts.csv");
        std::fs::write(&csv_path, "자재명,품번\nHEX BOLT,B-1\n").unwrap();
        let catalog = load_catalog(&csv_path).unwrap();
        assert_eq!(catalog.sheets()[0].name, "bolts");
        assert_eq!(catalog.row_count(), 1);

        let json_path = dir.path().join("catalog.json");
        std::fs::write(
            &json_path,
            r#"[{"sheetName": "A", "rows": [{"자재명": "SW"}]}, {"sheetName": "B", "rows": []}]"#,
        )
        .unwrap();
        let catalog = load_catalog(&json_path).unwrap();
        assert_eq!(catalog.sheet_count(), 2);

        let txt_path = dir.path().join("catalog.txt");
        std::fs::write(&txt_path, "").unwrap();
        assert!(matches!(
            load_catalog(&txt_path),
            Err(CatalogError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_catalog(&dir.path().join("mydata.xlsx")).is_err());
    }

    #[test]
    fn load_or_empty_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = load_or_empty(&dir.path().join("mydata.xlsx"));
        assert!(catalog.is_empty());
        assert_eq!(catalog.sheet_count(), 0);
    }
}
