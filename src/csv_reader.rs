use crate::error::LoadError;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Raw CSV contents: header row plus string records of the same width.
#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read CSV from standard input
pub fn read_csv_from_stdin() -> Result<CsvData, LoadError> {
    let stdin = io::stdin();
    read_csv(stdin.lock(), "<stdin>")
}

/// Read CSV from a file on disk
pub fn read_csv_from_path(path: &Path) -> Result<CsvData, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file, &path.display().to_string())
}

/// Read CSV from any reader. `origin` names the source in error messages.
pub fn read_csv<R: Read>(reader: R, origin: &str) -> Result<CsvData, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let parse_err = |e: csv::Error| LoadError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    };

    let headers: Vec<String> = rdr
        .headers()
        .map_err(parse_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::Parse {
            origin: origin.to_string(),
            message: "missing header row".to_string(),
        });
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(parse_err)?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }

    if rows.is_empty() {
        return Err(LoadError::Empty {
            origin: origin.to_string(),
        });
    }

    Ok(CsvData { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_basic() {
        let input = "sw,pl,species\n3.5,1.4,a\n3.0,4.5,b\n";
        let csv = read_csv(input.as_bytes(), "test").unwrap();
        assert_eq!(csv.headers, vec!["sw", "pl", "species"]);
        assert_eq!(csv.rows.len(), 2);
        assert_eq!(csv.rows[1], vec!["3.0", "4.5", "b"]);
    }

    #[test]
    fn test_read_trims_headers() {
        let input = " sw , pl\n1,2\n";
        let csv = read_csv(input.as_bytes(), "test").unwrap();
        assert_eq!(csv.headers, vec!["sw", "pl"]);
    }

    #[test]
    fn test_read_header_only() {
        let result = read_csv("x,y\n".as_bytes(), "test");
        assert!(matches!(result, Err(LoadError::Empty { .. })));
        assert!(result.unwrap_err().to_string().contains("at least one data row"));
    }

    #[test]
    fn test_read_ragged_rows() {
        let result = read_csv("x,y\n1,2\n3\n".as_bytes(), "test");
        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_csv_from_path(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(LoadError::Read { .. })));
    }
}
