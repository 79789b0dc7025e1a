use crate::core::format::normalize_headers;
use crate::domain::model::{CellValue, Column, Table};
use crate::utils::error::{Result, SweepError};

/// 視為缺值的字串
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn infer_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if NA_TOKENS.contains(&trimmed) {
        return CellValue::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        // `NAN`、`nAn` 等拼法也是缺值
        if f.is_nan() {
            return CellValue::Null;
        }
        return CellValue::Float(f);
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    CellValue::Text(raw.to_string())
}

pub fn read_csv(bytes: &[u8], file_name: &str) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let raw_headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if raw_headers.is_empty() {
        return Err(SweepError::ParseError {
            file: file_name.to_string(),
            message: "No columns to parse from file".to_string(),
        });
    }

    let headers = normalize_headers(raw_headers);
    let width = headers.len();
    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); width];

    for record in reader.records() {
        let record = record?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(SweepError::ParseError {
                file: file_name.to_string(),
                message: format!(
                    "Expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                ),
            });
        }

        // 欄位不足的列以缺值補齊
        for (index, column) in values.iter_mut().enumerate() {
            let cell = record.get(index).map(infer_cell).unwrap_or(CellValue::Null);
            column.push(cell);
        }
    }

    Table::new(
        headers
            .into_iter()
            .zip(values)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    )
}

/// 輸出不含索引欄的 CSV，第一列為欄名
pub fn write_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| SweepError::IoError(e.into_error()))
}
