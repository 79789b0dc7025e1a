use crate::core::cleaning::FillReport;
use crate::core::pipeline::{FileOutcome, FilePipeline};
use crate::core::{ConfigProvider, Storage};
use crate::domain::model::UploadedBlob;
use crate::domain::session::{FileSession, SessionBook};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub const SUMMARY_FILE_NAME: &str = "sweep_summary.json";

/// 單一輸入檔案的處理結果
#[derive(Debug)]
pub struct FileReport {
    pub input: String,
    pub result: Result<FileOutcome>,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub files: Vec<FileSummary>,
}

#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub input: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates_removed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_report: Option<FillReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    pub fn summary(&self) -> BatchSummary {
        let files = self
            .files
            .iter()
            .map(|report| match &report.result {
                Ok(outcome) => FileSummary {
                    input: report.input.clone(),
                    status: "ok",
                    rows: Some(outcome.table.row_count()),
                    columns: Some(outcome.table.column_names()),
                    duplicates_removed: outcome.duplicates_removed,
                    fill_report: outcome.fill_report.clone(),
                    output: outcome.saved_path.clone(),
                    content_type: outcome.artifact.as_ref().map(|a| a.content_type),
                    error: None,
                },
                Err(e) => FileSummary {
                    input: report.input.clone(),
                    status: "error",
                    rows: None,
                    columns: None,
                    duplicates_removed: None,
                    fill_report: None,
                    output: None,
                    content_type: None,
                    error: Some(e.user_friendly_message()),
                },
            })
            .collect();

        BatchSummary {
            processed: self.files.len(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            files,
        }
    }

    pub fn summary_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.summary())?)
    }
}

/// 逐一處理上傳的檔案，任何一個檔案失敗都不影響其他檔案
pub struct SweepEngine<S: Storage> {
    storage: S,
    pipeline: FilePipeline,
    output_path: String,
    write_summary: bool,
    monitor: SystemMonitor,
}

impl<S: Storage> SweepEngine<S> {
    pub fn new(storage: S, pipeline: FilePipeline, output_path: impl Into<String>) -> Self {
        Self::new_with_monitoring(storage, pipeline, output_path, false)
    }

    pub fn new_with_monitoring(
        storage: S,
        pipeline: FilePipeline,
        output_path: impl Into<String>,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            storage,
            pipeline,
            output_path: output_path.into(),
            write_summary: false,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn from_config<C: ConfigProvider>(storage: S, config: &C, monitor_enabled: bool) -> Self {
        Self::new_with_monitoring(
            storage,
            FilePipeline::new(config.preview_rows()),
            config.output_path(),
            monitor_enabled,
        )
        .with_summary(config.write_summary())
    }

    pub fn with_summary(mut self, enabled: bool) -> Self {
        self.write_summary = enabled;
        self
    }

    pub async fn run(&self, inputs: &[String], sessions: &SessionBook) -> BatchReport {
        tracing::info!("🚀 Starting sweep of {} file(s)", inputs.len());
        self.monitor.log_stats("Start");

        let mut report = BatchReport::default();
        let mut written = HashSet::new();
        for input in inputs {
            let name = display_name(input);
            let session = sessions.session_for(&name);
            let result = self.sweep_file(input, &session, &mut written).await;

            match &result {
                Ok(outcome) => tracing::info!(
                    "✅ {} processed: {} rows x {} columns",
                    name,
                    outcome.table.row_count(),
                    outcome.table.column_count()
                ),
                Err(e) => {
                    tracing::error!(
                        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
                        name,
                        e,
                        e.category(),
                        e.severity()
                    );
                    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                }
            }

            self.monitor.log_stats(&name);
            report.files.push(FileReport {
                input: input.clone(),
                result,
            });
        }

        if self.write_summary {
            if let Err(e) = self.save_summary(&report).await {
                tracing::error!("❌ Could not write batch summary: {}", e);
            }
        }

        tracing::info!(
            "🏁 Sweep finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        self.monitor.log_final_stats();
        report
    }

    /// 讀取 → 處理 → 寫出單一檔案
    pub async fn process_file(&self, input: &str, session: &FileSession) -> Result<FileOutcome> {
        self.sweep_file(input, session, &mut HashSet::new()).await
    }

    /// `written` 為本批次已寫出的路徑，同名輸出改用 `name (n).ext`
    async fn sweep_file(
        &self,
        input: &str,
        session: &FileSession,
        written: &mut HashSet<String>,
    ) -> Result<FileOutcome> {
        let content = self.storage.read_file(input).await?;
        let blob = UploadedBlob::new(display_name(input), content);

        let mut outcome = self.pipeline.run(&blob, session)?;

        if let Some(artifact) = &outcome.artifact {
            let target = self.unique_output_file(&artifact.file_name, written);
            tracing::debug!("Writing {} ({} bytes) to storage", target, artifact.len());
            self.storage.write_file(&target, &artifact.content).await?;
            written.insert(target.clone());
            outcome.saved_path = Some(target);
        }

        Ok(outcome)
    }

    fn unique_output_file(&self, file_name: &str, written: &HashSet<String>) -> String {
        let target = self.output_file(file_name);
        if !written.contains(&target) {
            return target;
        }

        let (stem, extension) = match file_name.rfind('.') {
            Some(dot) if dot > 0 => file_name.split_at(dot),
            _ => (file_name, ""),
        };
        let renamed = (1..)
            .map(|n| self.output_file(&format!("{} ({}){}", stem, n, extension)))
            .find(|candidate| !written.contains(candidate))
            .unwrap_or(target);
        tracing::warn!(
            "⚠️ {} was already written in this batch, saving as {}",
            file_name,
            renamed
        );
        renamed
    }

    async fn save_summary(&self, report: &BatchReport) -> Result<()> {
        let json = report.summary_json()?;
        let target = self.output_file(SUMMARY_FILE_NAME);
        self.storage.write_file(&target, json.as_bytes()).await?;
        tracing::info!("📁 Summary saved to: {}", target);
        Ok(())
    }

    fn output_file(&self, file_name: &str) -> String {
        Path::new(&self.output_path)
            .join(file_name)
            .to_string_lossy()
            .into_owned()
    }
}

/// 使用者看到的檔名（不含目錄）
fn display_name(input: &str) -> String {
    Path::new(input)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string())
}
