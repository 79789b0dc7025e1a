pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{storage::LocalStorage, toml_config::SweepConfig, RunSettings};

pub use self::core::{
    engine::{BatchReport, FileReport, SweepEngine},
    pipeline::{FileOutcome, FilePipeline},
};
pub use domain::model::{CellValue, Column, ExportArtifact, ExportFormat, Table, UploadedBlob};
pub use domain::session::{FileSession, SessionBook, SessionEvent};
pub use utils::error::{Result, SweepError};
