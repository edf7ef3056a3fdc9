use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Names of the columns the matcher reads from a catalog row.
///
/// Defaults are the headers of the purchasing workbook (자재명 / 재질 / 규격 / 품번).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogColumns {
    pub name: String,
    pub material: String,
    pub spec: String,
    pub part_number: String,
}

impl Default for CatalogColumns {
    fn default() -> Self {
        Self {
            name: "자재명".to_string(),
            material: "재질".to_string(),
            spec: "규격".to_string(),
            part_number: "품번".to_string(),
        }
    }
}

/// A schemaless catalog row. Numeric cells are kept as their display string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CatalogRow(BTreeMap<String, String>);

impl CatalogRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.insert(column, value);
        self
    }

    /// Value of `column`, or `""` when the row has no such cell.
    pub fn get(&self, column: &str) -> &str {
        self.0.get(column).map(String::as_str).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Name, material, spec and part number joined with spaces.
    pub fn comparison_text(&self, columns: &CatalogColumns) -> String {
        format!(
            "{} {} {} {}",
            self.get(&columns.name),
            self.get(&columns.material),
            self.get(&columns.spec),
            self.get(&columns.part_number)
        )
    }

    /// Part number, `None` when the cell is missing or blank.
    pub fn part_number(&self, columns: &CatalogColumns) -> Option<&str> {
        Some(self.get(&columns.part_number).trim()).filter(|pn| !pn.is_empty())
    }
}

impl FromIterator<(String, String)> for CatalogRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        CatalogRow(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for CatalogRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(k, v)| {
                let text = match v {
                    serde_json::Value::Null => return None,
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((k, text))
            })
            .collect())
    }
}

/// A named partition of the catalog, one spreadsheet tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    #[serde(rename = "sheetName")]
    pub name: String,
    #[serde(default)]
    pub rows: Vec<CatalogRow>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<CatalogRow>) -> Self {
        Self { name: name.into(), rows }
    }
}

/// The reference parts catalog. Sheet order and row order are significant:
/// they decide which row wins a tie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    sheets: Vec<Sheet>,
}

impl Catalog {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the JSON snapshot form: `[{ "sheetName": ..., "rows": [...] }, ...]`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }

    /// True when there is no row to match against, even if sheets exist.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Every row paired with its sheet name, in catalog order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &CatalogRow)> {
        self.sheets
            .iter()
            .flat_map(|s| s.rows.iter().map(move |r| (s.name.as_str(), r)))
    }
}
