use crate::utils::error::{Result, SweepError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// 使用者上傳的原始檔案
#[derive(Debug, Clone)]
pub struct UploadedBlob {
    pub name: String,
    pub size: u64,
    pub content: Vec<u8>,
}

impl UploadedBlob {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: content.len() as u64,
            content,
        }
    }

    /// 小寫的副檔名（含 `.`），沒有副檔名時回傳空字串
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// 整數值的浮點數仍保留小數點，重新解析時才不會變成整數
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => f.write_str(&format_float(*v)),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// 所有非空值都是數字時視為數值欄位（全空欄位也算）
    pub fn is_numeric(&self) -> bool {
        self.values.iter().all(|v| v.is_null() || v.is_numeric())
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }
}

/// 記憶體中的表格：欄位有順序，且所有欄位列數相同
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != rows) {
                return Err(SweepError::ValidationError {
                    message: format!(
                        "Column '{}' has {} rows, expected {}",
                        bad.name,
                        bad.values.len(),
                        rows
                    ),
                });
            }
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SweepError::ValidationError {
                    message: format!("Duplicate column name '{}'", column.name),
                });
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub(crate) fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn row(&self, index: usize) -> Option<Vec<&CellValue>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.row_count()).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// 前 n 列的副本
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values.iter().take(n).cloned().collect()))
                .collect(),
        }
    }

    /// 只保留 `keep[i]` 為 true 的列，順序不變
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.values.retain(|_| *flags.next().unwrap_or(&true));
        }
    }
}

const NULL_DISPLAY: &str = "<NA>";

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows()
            .map(|row| {
                row.into_iter()
                    .map(|v| match v {
                        CellValue::Null => NULL_DISPLAY.to_string(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect();

        let index_width = self.row_count().saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(c.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:width$}", "", width = index_width)?;
        for (column, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", column.name, width = width)?;
        }
        writeln!(f)?;

        for (index, row) in cells.iter().enumerate() {
            write!(f, "{:>width$}", index, width = index_width)?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell, width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 轉換目標格式，只接受 CSV 與 Excel 兩種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExportFormat {
    Csv,
    Spreadsheet,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => ".csv",
            ExportFormat::Spreadsheet => ".xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_CONTENT_TYPE,
            ExportFormat::Spreadsheet => XLSX_CONTENT_TYPE,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Spreadsheet => "Excel",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" | "spreadsheet" => Ok(ExportFormat::Spreadsheet),
            _ => Err(SweepError::InvalidConversionTarget {
                target: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ExportFormat {
    type Error = SweepError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ExportFormat> for String {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Csv => "csv".to_string(),
            ExportFormat::Spreadsheet => "xlsx".to_string(),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 轉換後可供下載的檔案
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub content: Vec<u8>,
    pub file_name: String,
    pub content_type: &'static str,
}

impl ExportArtifact {
    /// 從頭開始讀取的緩衝區
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.content.as_slice())
    }

    pub fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.content)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new("a", vec![CellValue::Int(1), CellValue::Null, CellValue::Int(3)]),
            Column::new(
                "b",
                vec![
                    CellValue::Text("x".into()),
                    CellValue::Text("y".into()),
                    CellValue::Text("z".into()),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_blob_extension_is_lowercase() {
        let blob = UploadedBlob::new("Report.XLSX", vec![1, 2, 3]);
        assert_eq!(blob.extension(), ".xlsx");
        assert_eq!(blob.size, 3);
        assert_eq!(UploadedBlob::new("README", vec![]).extension(), "");
    }

    #[test]
    fn test_table_rejects_ragged_columns() {
        let result = Table::new(vec![
            Column::new("a", vec![CellValue::Int(1)]),
            Column::new("b", vec![]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_head_and_rows() {
        let table = sample();
        assert_eq!(table.row_count(), 3);
        let head = table.head(2);
        assert_eq!(head.row_count(), 2);
        assert_eq!(head.column_names(), vec!["a", "b"]);
        assert_eq!(table.row(2).unwrap(), vec![&CellValue::Int(3), &CellValue::Text("z".into())]);
        assert!(table.row(3).is_none());
    }

    #[test]
    fn test_numeric_column_detection() {
        let table = sample();
        assert!(table.column("a").unwrap().is_numeric());
        assert!(!table.column("b").unwrap().is_numeric());
        assert!(Column::new("empty", vec![CellValue::Null]).is_numeric());
        assert!(!Column::new("flags", vec![CellValue::Bool(true)]).is_numeric());
    }

    #[test]
    fn test_float_display_keeps_fraction() {
        assert_eq!(CellValue::Float(2.0).to_string(), "2.0");
        assert_eq!(CellValue::Float(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Bool(false).to_string(), "False");
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("Excel".parse::<ExportFormat>().unwrap(), ExportFormat::Spreadsheet);
        assert!(matches!(
            "CVS".parse::<ExportFormat>(),
            Err(SweepError::InvalidConversionTarget { .. })
        ));
    }

    #[test]
    fn test_preview_display_marks_nulls() {
        let rendered = sample().to_string();
        assert!(rendered.contains("<NA>"));
        assert!(rendered.lines().next().unwrap().contains('a'));
        assert_eq!(rendered.lines().count(), 4);
    }

    #[test]
    fn test_artifact_reader_starts_at_zero() {
        let artifact = ExportArtifact {
            content: b"a,b\n".to_vec(),
            file_name: "x.csv".into(),
            content_type: CSV_CONTENT_TYPE,
        };
        assert_eq!(artifact.reader().position(), 0);
        assert_eq!(artifact.len(), 4);
    }
}
