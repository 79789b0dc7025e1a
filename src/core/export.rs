use crate::core::{delimited, spreadsheet};
use crate::domain::model::{ExportArtifact, ExportFormat, Table};
use crate::utils::error::Result;
use std::path::Path;

/// 把表格轉成目標格式，並產生下載用的檔名與 content type
pub fn export_table(table: &Table, source_name: &str, format: ExportFormat) -> Result<ExportArtifact> {
    let content = match format {
        ExportFormat::Csv => delimited::write_csv(table)?,
        ExportFormat::Spreadsheet => spreadsheet::write_xlsx(table)?,
    };

    let file_name = output_file_name(source_name, format);
    tracing::debug!(
        "Exported {} as {} ({} bytes)",
        source_name,
        file_name,
        content.len()
    );

    Ok(ExportArtifact {
        content,
        file_name,
        content_type: format.content_type(),
    })
}

/// 只替換結尾的副檔名
pub fn output_file_name(source_name: &str, format: ExportFormat) -> String {
    let stem = match Path::new(source_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => &source_name[..source_name.len() - ext.len() - 1],
        None => source_name,
    };
    format!("{}{}", stem, format.extension())
}
