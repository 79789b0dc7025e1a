use crate::core::chart::{self, ChartData};
use crate::core::cleaning::{self, FillReport};
use crate::core::{export, format, projection};
use crate::domain::model::{ExportArtifact, Table, UploadedBlob};
use crate::domain::session::FileSession;
use crate::utils::error::{Result, SweepError};

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// 單一檔案處理後的結果，只包含本次 session 要求的階段
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file_name: String,
    pub size: u64,
    /// 解析後（清理前）的列數與欄數
    pub parsed_shape: (usize, usize),
    pub table: Table,
    pub preview: Table,
    pub messages: Vec<String>,
    pub duplicates_removed: Option<usize>,
    pub fill_report: Option<FillReport>,
    pub chart: Option<ChartData>,
    pub artifact: Option<ExportArtifact>,
    /// 由 engine 寫出檔案後填入
    pub saved_path: Option<String>,
}

/// parse → clean → project → preview/chart → export
#[derive(Debug, Clone)]
pub struct FilePipeline {
    preview_rows: usize,
}

impl Default for FilePipeline {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_ROWS)
    }
}

impl FilePipeline {
    pub fn new(preview_rows: usize) -> Self {
        Self { preview_rows }
    }

    pub fn preview_rows(&self) -> usize {
        self.preview_rows
    }

    /// 每次互動都從原始檔案重新計算
    pub fn run(&self, blob: &UploadedBlob, session: &FileSession) -> Result<FileOutcome> {
        tracing::info!("📄 Processing {} ({} bytes)", blob.name, blob.size);

        // 先確認轉換設定，避免算完才發現缺少格式
        if session.wants_conversion() && session.export_format.is_none() {
            return Err(SweepError::ValidationError {
                message: format!("Choose a conversion format before converting {}", blob.name),
            });
        }

        let mut table = format::parse_blob(blob)?;
        let parsed_shape = (table.row_count(), table.column_count());
        let mut messages = Vec::new();

        let duplicates_removed = if session.wants_deduplication() {
            let removed = cleaning::remove_duplicates(&mut table);
            tracing::info!("🧹 Removed {} duplicate row(s) from {}", removed, blob.name);
            messages.push(format!("✔ Duplicates removed: {} row(s) dropped", removed));
            Some(removed)
        } else {
            None
        };

        let fill_report = if session.wants_fill() {
            let report = cleaning::fill_missing(&mut table);
            tracing::info!(
                "🧹 Filled {} missing value(s) in {}",
                report.total_filled(),
                blob.name
            );
            messages.push("✔ Missing values have been filled!".to_string());
            for skipped in &report.skipped {
                messages.push(format!(
                    "⚠ Column '{}' has no values to average and was left empty",
                    skipped
                ));
            }
            Some(report)
        } else {
            None
        };

        let table = projection::project(table, session.selected_columns.as_deref())?;
        let preview = table.head(self.preview_rows);

        let chart = if session.visualize {
            let data = chart::bar_chart_data(&table);
            if data.is_none() {
                messages.push("No numeric columns to visualize".to_string());
            }
            data
        } else {
            None
        };

        let artifact = match session.export_format {
            Some(target) if session.wants_conversion() => {
                let artifact = export::export_table(&table, &blob.name, target)?;
                tracing::info!(
                    "✨ Converted {} to {} ({} bytes)",
                    blob.name,
                    artifact.file_name,
                    artifact.len()
                );
                messages.push(format!("Download {} as {}", blob.name, target.label()));
                Some(artifact)
            }
            _ => None,
        };

        Ok(FileOutcome {
            file_name: blob.name.clone(),
            size: blob.size,
            parsed_shape,
            table,
            preview,
            messages,
            duplicates_removed,
            fill_report,
            chart,
            artifact,
            saved_path: None,
        })
    }
}
