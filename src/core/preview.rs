use crate::domain::model::REQUIRED_COLUMNS;
use crate::utils::error::Result;
use csv::ReaderBuilder;
use serde::Serialize;

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Locally parsed view of a dataset, shown before it is uploaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CsvPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvPreview {
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_bytes(text.as_bytes())
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data);

        let mut records = reader.records();
        let headers = match records.next() {
            Some(record) => record?.iter().map(|h| h.trim().to_string()).collect(),
            None => Vec::new(),
        };

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            // 單一欄位的列視為空白列
            if record.len() > 1 {
                rows.push(record.iter().map(str::to_string).collect());
            }
        }

        tracing::debug!(
            "Parsed CSV preview: {} columns, {} rows",
            headers.len(),
            rows.len()
        );

        Ok(Self { headers, rows })
    }

    /// Preview that never fails: bytes that are not UTF-8 are replaced with
    /// U+FFFD, and anything still unreadable yields an empty preview.
    pub fn from_bytes_lossy(data: &[u8]) -> Self {
        match Self::from_bytes(data) {
            Ok(preview) => preview,
            Err(e) => {
                tracing::warn!("⚠️ Could not read the preview as UTF-8 CSV: {}", e);
                Self::parse(&String::from_utf8_lossy(data)).unwrap_or_else(|e| {
                    tracing::warn!("⚠️ Preview unavailable: {}", e);
                    Self::default()
                })
            }
        }
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn is_truncated(&self, n: usize) -> bool {
        self.rows.len() > n
    }

    pub fn missing_columns(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|required| !self.headers.iter().any(|h| h == required))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age,Outcome
6,148,72,35,0,33.6,0.627,50,1
1,85,66,29,0,26.6,0.351,31,0
8,183,64,0,0,23.3,0.672,32,1
";

    #[test]
    fn test_parse_headers_and_rows() {
        let preview = CsvPreview::parse(SAMPLE).unwrap();

        assert_eq!(preview.headers.len(), 9);
        assert_eq!(preview.headers[0], "Pregnancies");
        assert_eq!(preview.total_rows(), 3);
        assert_eq!(preview.rows[1][1], "85");
        assert!(preview.missing_columns().is_empty());
    }

    #[test]
    fn test_single_field_lines_are_dropped() {
        let text = "a,b\n1,2\n\nstray\n3,4\n";
        let preview = CsvPreview::parse(text).unwrap();

        assert_eq!(preview.total_rows(), 2);
        assert_eq!(preview.rows[1], vec!["3", "4"]);
    }

    #[test]
    fn test_head_caps_rows() {
        let mut text = String::from("Glucose,Age\n");
        for i in 0..12 {
            text.push_str(&format!("{},{}\n", 100 + i, 20 + i));
        }
        let preview = CsvPreview::parse(&text).unwrap();

        assert_eq!(preview.head(DEFAULT_PREVIEW_ROWS).len(), 5);
        assert!(preview.is_truncated(DEFAULT_PREVIEW_ROWS));
        assert_eq!(preview.head(50).len(), 12);
    }

    #[test]
    fn test_missing_required_columns() {
        let preview = CsvPreview::parse("Glucose,BMI,Age\n120,30.1,44\n").unwrap();
        let missing = preview.missing_columns();

        assert!(missing.contains(&"Pregnancies"));
        assert!(missing.contains(&"Insulin"));
        assert!(!missing.contains(&"BMI"));
        assert_eq!(missing.len(), 5);
    }

    #[test]
    fn test_empty_input() {
        let preview = CsvPreview::parse("").unwrap();
        assert!(preview.headers.is_empty());
        assert_eq!(preview.total_rows(), 0);
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_lossy_preview() {
        let data = b"Glucose,\xC2ge\n120,44\n";
        assert!(CsvPreview::from_bytes(data).is_err());

        let preview = CsvPreview::from_bytes_lossy(data);
        assert_eq!(preview.headers, vec!["Glucose", "\u{FFFD}ge"]);
        assert_eq!(preview.total_rows(), 1);
    }
}
