use crate::domain::session::{FileSession, SessionBook};
use crate::utils::error::{Result, SweepError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MAX_PREVIEW_ROWS: usize = 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub output: OutputConfig,
    /// 沒有在 `[[files]]` 列出的檔案使用這組設定
    pub defaults: Option<FileSession>,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub preview_rows: Option<usize>,
    pub write_summary: Option<bool>,
}

/// 單一檔案的完整設定，不會繼承 `[defaults]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(flatten)]
    pub session: FileSession,
}

impl SweepConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SweepError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SweepError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SweepError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(path) = &self.output.path {
            validation::validate_path("output.path", path)?;
        }

        if let Some(rows) = self.output.preview_rows {
            validation::validate_range("output.preview_rows", rows, 1, MAX_PREVIEW_ROWS)?;
        }

        for entry in &self.files {
            validation::validate_non_empty_string("files.name", &entry.name)?;
        }
        validation::validate_unique_names("files.name", self.files.iter().map(|f| f.name.as_str()))?;

        Ok(())
    }

    /// 指定了 `convert` 的檔案視為已要求轉換
    pub fn session_book(&self, fallback: FileSession) -> SessionBook {
        let defaults = self
            .defaults
            .clone()
            .map(FileSession::convert_if_format_chosen)
            .unwrap_or(fallback);

        let mut book = SessionBook::new(defaults);
        for entry in &self.files {
            book.insert(entry.name.clone(), entry.session.clone().convert_if_format_chosen());
        }
        book
    }
}

impl Validate for SweepConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ExportFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_sweep_config() {
        let toml_content = r#"
[output]
path = "./converted"
preview_rows = 10

[defaults]
clean = true
remove_duplicates = true

[[files]]
name = "sales.csv"
columns = ["region", "total"]
convert = "Excel"
visualize = true
"#;

        let config = SweepConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.path.as_deref(), Some("./converted"));
        assert_eq!(config.output.preview_rows, Some(10));

        let book = config.session_book(FileSession::default());
        let sales = book.session_for("sales.csv");
        assert_eq!(sales.export_format, Some(ExportFormat::Spreadsheet));
        assert!(sales.wants_conversion());
        assert!(sales.visualize);
        assert_eq!(
            sales.selected_columns,
            Some(vec!["region".to_string(), "total".to_string()])
        );
        // [[files]] 不繼承 [defaults]
        assert!(!sales.clean_enabled);

        let other = book.session_for("other.csv");
        assert!(other.wants_deduplication());
        assert!(!other.wants_conversion());
    }

    #[test]
    fn test_missing_defaults_uses_fallback() {
        let config = SweepConfig::from_toml_str("").unwrap();
        let fallback = FileSession {
            visualize: true,
            ..FileSession::default()
        };
        assert!(config.session_book(fallback).session_for("x.csv").visualize);
    }

    #[test]
    fn test_invalid_conversion_target_fails_loudly() {
        let toml_content = r#"
[defaults]
convert = "CVS"
"#;
        let err = SweepConfig::from_toml_str(toml_content).unwrap_err();
        assert!(err.to_string().contains("CVS"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SWEEP_TEST_OUTPUT_DIR", "/tmp/sweep-out");

        let toml_content = r#"
[output]
path = "${SWEEP_TEST_OUTPUT_DIR}"
"#;

        let config = SweepConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output.path.as_deref(), Some("/tmp/sweep-out"));

        std::env::remove_var("SWEEP_TEST_OUTPUT_DIR");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[output]
preview_rows = 0

[[files]]
name = "a.csv"

[[files]]
name = "a.csv"
"#;

        let config = SweepConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[output]
path = "./output"

[[files]]
name = "data.xlsx"
convert = "csv"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = SweepConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.files.len(), 1);
        assert_eq!(config.files[0].session.export_format, Some(ExportFormat::Csv));
    }
}
