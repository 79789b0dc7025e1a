use crate::domain::model::ExportFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 單一檔案的使用者選擇，決定 pipeline 要執行到哪個階段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSession {
    #[serde(rename = "clean")]
    pub clean_enabled: bool,
    pub remove_duplicates: bool,
    pub fill_missing: bool,
    #[serde(rename = "columns")]
    pub selected_columns: Option<Vec<String>>,
    pub visualize: bool,
    #[serde(rename = "convert")]
    pub export_format: Option<ExportFormat>,
    /// 按下轉換；由設定檔載入時，有指定 `convert` 即視為已要求
    #[serde(skip)]
    pub convert_requested: bool,
}

/// 一次使用者互動
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SetCleaning(bool),
    RemoveDuplicates,
    FillMissing,
    SelectColumns(Vec<String>),
    SelectAllColumns,
    SetVisualization(bool),
    ChooseFormat(ExportFormat),
    Convert,
}

impl FileSession {
    pub fn apply(&mut self, event: SessionEvent) {
        tracing::debug!("Applying session event: {:?}", event);
        match event {
            SessionEvent::SetCleaning(enabled) => self.clean_enabled = enabled,
            SessionEvent::RemoveDuplicates => self.remove_duplicates = true,
            SessionEvent::FillMissing => self.fill_missing = true,
            SessionEvent::SelectColumns(columns) => self.selected_columns = Some(columns),
            SessionEvent::SelectAllColumns => self.selected_columns = None,
            SessionEvent::SetVisualization(enabled) => self.visualize = enabled,
            SessionEvent::ChooseFormat(format) => self.export_format = Some(format),
            SessionEvent::Convert => self.convert_requested = true,
        }
    }

    pub fn with_event(mut self, event: SessionEvent) -> Self {
        self.apply(event);
        self
    }

    pub fn wants_deduplication(&self) -> bool {
        self.clean_enabled && self.remove_duplicates
    }

    pub fn wants_fill(&self) -> bool {
        self.clean_enabled && self.fill_missing
    }

    pub fn wants_conversion(&self) -> bool {
        self.convert_requested
    }

    /// 設定檔與命令列沒有「按鈕」，指定格式就代表要轉換
    pub fn convert_if_format_chosen(mut self) -> Self {
        self.convert_requested = self.export_format.is_some();
        self
    }
}

/// 依檔名查找各檔案的 session，找不到時使用預設值
#[derive(Debug, Clone, Default)]
pub struct SessionBook {
    defaults: FileSession,
    files: HashMap<String, FileSession>,
}

impl SessionBook {
    pub fn new(defaults: FileSession) -> Self {
        Self {
            defaults,
            files: HashMap::new(),
        }
    }

    pub fn insert(&mut self, file_name: impl Into<String>, session: FileSession) {
        self.files.insert(file_name.into(), session);
    }

    /// 每個檔案取得自己的副本，避免狀態在檔案間互相影響
    pub fn session_for(&self, file_name: &str) -> FileSession {
        self.files
            .get(file_name)
            .cloned()
            .unwrap_or_else(|| self.defaults.clone())
    }

    /// 對單一檔案套用互動事件
    pub fn apply(&mut self, file_name: &str, event: SessionEvent) -> &FileSession {
        let defaults = self.defaults.clone();
        let session = self
            .files
            .entry(file_name.to_string())
            .or_insert(defaults);
        session.apply(event);
        session
    }
}
