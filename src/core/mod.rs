pub mod chart;
pub mod cleaning;
pub mod delimited;
pub mod engine;
pub mod export;
pub mod format;
pub mod pipeline;
pub mod projection;
pub mod spreadsheet;

pub use crate::domain::model::{ExportArtifact, ExportFormat, Table, UploadedBlob};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
