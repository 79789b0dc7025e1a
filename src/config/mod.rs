pub mod storage;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::session::SessionBook;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};

#[cfg(feature = "cli")]
use crate::core::pipeline::DEFAULT_PREVIEW_ROWS;
#[cfg(feature = "cli")]
use crate::domain::{model::ExportFormat, session::FileSession};
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "data-sweeper")]
#[command(about = "Convert files between CSV and Excel with built-in data cleaning and visualization")]
pub struct CliConfig {
    /// Files to process (.csv or .xlsx)
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Directory converted files are written to [default: ./output]
    #[arg(short, long = "output")]
    pub output_path: Option<String>,

    /// Remove duplicate rows
    #[arg(long)]
    pub dedup: bool,

    /// Fill missing numeric values with the column mean
    #[arg(long)]
    pub fill: bool,

    /// Columns to keep, in order (default: all)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Show a bar chart of the first two numeric columns
    #[arg(long)]
    pub visualize: bool,

    /// Convert to: csv | xlsx
    #[arg(long)]
    pub convert: Option<String>,

    /// Number of rows shown in the preview [default: 5]
    #[arg(long)]
    pub preview_rows: Option<usize>,

    /// Per-file session settings (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Write sweep_summary.json next to the converted files
    #[arg(long)]
    pub summary: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per file")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列旗標組成的預設 session；轉換目標寫錯時直接回報錯誤
    pub fn default_session(&self) -> Result<FileSession> {
        let export_format = self
            .convert
            .as_deref()
            .map(str::parse::<ExportFormat>)
            .transpose()?;

        let session = FileSession {
            clean_enabled: self.dedup || self.fill,
            remove_duplicates: self.dedup,
            fill_missing: self.fill,
            selected_columns: if self.columns.is_empty() {
                None
            } else {
                Some(self.columns.clone())
            },
            visualize: self.visualize,
            export_format,
            convert_requested: false,
        };
        Ok(session.convert_if_format_chosen())
    }

    /// 合併命令列與設定檔；命令列優先
    pub fn settings(&self) -> Result<RunSettings> {
        let defaults = self.default_session()?;

        let settings = match &self.config {
            Some(path) => {
                let file = toml_config::SweepConfig::from_file(path)?;
                file.validate()?;
                RunSettings {
                    output_path: self
                        .output_path
                        .clone()
                        .or_else(|| file.output.path.clone())
                        .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
                    preview_rows: self
                        .preview_rows
                        .or(file.output.preview_rows)
                        .unwrap_or(DEFAULT_PREVIEW_ROWS),
                    write_summary: self.summary || file.output.write_summary.unwrap_or(false),
                    sessions: file.session_book(defaults),
                }
            }
            None => RunSettings {
                output_path: self
                    .output_path
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
                preview_rows: self.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS),
                write_summary: self.summary,
                sessions: SessionBook::new(defaults),
            },
        };

        settings.validate()?;
        Ok(settings)
    }
}

/// 執行時實際使用的設定
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub output_path: String,
    pub preview_rows: usize,
    pub write_summary: bool,
    pub sessions: SessionBook,
}

impl ConfigProvider for RunSettings {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn preview_rows(&self) -> usize {
        self.preview_rows
    }

    fn write_summary(&self) -> bool {
        self.write_summary
    }
}

impl Validate for RunSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_range(
            "preview_rows",
            self.preview_rows,
            1,
            toml_config::MAX_PREVIEW_ROWS,
        )?;
        Ok(())
    }
}
