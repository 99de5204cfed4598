use crate::csv_reader::{self, CsvData};
use crate::error::LoadError;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// One field of a row. The raw text is kept for output; plotted columns
/// additionally carry their numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    raw: String,
    numeric: Option<f64>,
}

impl Cell {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            numeric: None,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Numeric value, or `NaN` when the cell was never coerced or is not a number.
    pub fn number(&self) -> f64 {
        self.numeric.unwrap_or(f64::NAN)
    }

    /// Coerce the raw text to a number in place. Idempotent.
    pub fn coerce(&mut self) {
        if self.numeric.is_none() {
            self.numeric = Some(parse_numeric(&self.raw));
        }
    }
}

/// Parse a numeric field; anything that is not a finite number becomes `NaN`.
pub fn parse_numeric(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => f64::NAN,
    }
}

/// A single record plus its derived group identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
    group_key: String,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            group_key: String::new(),
        }
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Numeric value at `index`, `NaN` if missing or non-numeric.
    pub fn number(&self, index: usize) -> f64 {
        self.cells.get(index).map_or(f64::NAN, Cell::number)
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    pub(crate) fn coerce(&mut self, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.coerce();
        }
    }

    pub(crate) fn set_group_key(&mut self, key: String) {
        self.group_key = key;
    }
}

/// Ordered rows sharing one column set.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from string records. Every record must match the header width.
    pub fn new(columns: Vec<String>, records: Vec<Vec<String>>) -> Result<Self, LoadError> {
        let width = columns.len();
        let mut rows = Vec::with_capacity(records.len());
        for (idx, record) in records.into_iter().enumerate() {
            if record.len() != width {
                return Err(LoadError::Parse {
                    origin: "dataset".to_string(),
                    message: format!(
                        "row {} has {} fields, expected {}",
                        idx + 1,
                        record.len(),
                        width
                    ),
                });
            }
            rows.push(Row::new(record.into_iter().map(Cell::new).collect()));
        }
        Ok(Self { columns, rows })
    }

    /// Create a Dataset from parsed CSV contents
    pub fn from_csv(csv: CsvData) -> Result<Self, LoadError> {
        Self::new(csv.headers, csv.rows)
    }

    /// Create a Dataset from a JSON Array of Objects
    pub fn from_json(value: &Value, origin: &str) -> Result<Self, LoadError> {
        let parse_err = |message: String| LoadError::Parse {
            origin: origin.to_string(),
            message,
        };

        let array = value
            .as_array()
            .ok_or_else(|| parse_err("input data must be a JSON array of objects".to_string()))?;

        if array.is_empty() {
            return Err(LoadError::Empty {
                origin: origin.to_string(),
            });
        }

        // Extract headers from the first object
        let first_obj = array[0]
            .as_object()
            .ok_or_else(|| parse_err("items in array must be objects".to_string()))?;
        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut records = Vec::with_capacity(array.len());
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| parse_err("items in array must be objects".to_string()))?;

            let mut record = Vec::with_capacity(headers.len());
            for header in &headers {
                let val_str = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => String::new(),
                    _ => {
                        return Err(parse_err(format!(
                            "unsupported value type for field '{}'",
                            header
                        )))
                    }
                };
                record.push(val_str);
            }
            records.push(record);
        }

        Self::new(headers, records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Numeric values of one column, in row order.
    pub fn numbers(&self, column: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |row| row.number(column))
    }

    /// Render a row as a JSON object keyed by column name (raw text values).
    pub fn row_to_json(&self, row: &Row) -> Value {
        let mut obj = Map::new();
        for (name, cell) in self.columns.iter().zip(row.cells()) {
            obj.insert(name.clone(), Value::String(cell.raw().to_string()));
        }
        Value::Object(obj)
    }
}

/// Asynchronous-in-spirit data collaborator: the host resolves `url` into a Dataset.
pub trait DataSource {
    fn load(&self, url: &str) -> Result<Dataset, LoadError>;
}

/// Loads from the filesystem. `-` reads CSV from stdin; `.json` files are
/// parsed as an array of objects, anything else as CSV.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSource;

impl DataSource for FileSource {
    fn load(&self, url: &str) -> Result<Dataset, LoadError> {
        if url == "-" {
            return Dataset::from_csv(csv_reader::read_csv_from_stdin()?);
        }

        let path = Path::new(url);
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let value: Value = serde_json::from_str(&text).map_err(|e| LoadError::Parse {
                origin: url.to_string(),
                message: e.to_string(),
            })?;
            Dataset::from_json(&value, url)
        } else {
            Dataset::from_csv(csv_reader::read_csv_from_path(path)?)
        }
    }
}

/// Serves an already-parsed dataset, whatever the url.
#[derive(Debug, Clone)]
pub struct MemorySource {
    dataset: Dataset,
}

impl MemorySource {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }
}

impl DataSource for MemorySource {
    fn load(&self, _url: &str) -> Result<Dataset, LoadError> {
        Ok(self.dataset.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("3.5"), 3.5);
        assert_eq!(parse_numeric(" -2 "), -2.0);
        assert!(parse_numeric("NA").is_nan());
        assert!(parse_numeric("").is_nan());
        assert!(parse_numeric("inf").is_nan());
    }

    #[test]
    fn test_cell_coerce_keeps_raw() {
        let mut cell = Cell::new("4.5");
        assert!(cell.number().is_nan());
        cell.coerce();
        assert_eq!(cell.number(), 4.5);
        assert_eq!(cell.raw(), "4.5");
    }

    #[test]
    fn test_from_json() {
        let value = json!([
            {"sw": 3.5, "species": "a", "flag": true},
            {"sw": "NA", "species": "b", "flag": null}
        ]);
        let data = Dataset::from_json(&value, "test").unwrap();
        assert_eq!(data.columns(), &["sw", "species", "flag"]);
        assert_eq!(data.len(), 2);
        let sw = data.column_index("sw").unwrap();
        assert_eq!(data.rows()[0].cell(sw).unwrap().raw(), "3.5");
        let flag = data.column_index("flag").unwrap();
        assert_eq!(data.rows()[1].cell(flag).unwrap().raw(), "");
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        let result = Dataset::from_json(&json!({"a": 1}), "test");
        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_from_json_empty() {
        let result = Dataset::from_json(&json!([]), "test");
        assert!(matches!(result, Err(LoadError::Empty { .. })));
    }

    #[test]
    fn test_new_rejects_ragged() {
        let result = Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec!["1".to_string()]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_row_to_json() {
        let data = Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec!["1".to_string(), "x".to_string()]],
        )
        .unwrap();
        assert_eq!(data.row_to_json(&data.rows()[0]), json!({"a": "1", "b": "x"}));
    }
}
