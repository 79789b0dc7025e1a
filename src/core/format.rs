use crate::core::{delimited, spreadsheet};
use crate::domain::model::{Table, UploadedBlob};
use crate::utils::error::{Result, SweepError};
use std::collections::HashSet;

/// 依副檔名判斷的輸入格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xlsx,
}

impl FileKind {
    /// 只看最後一個副檔名，不分大小寫
    pub fn detect(blob: &UploadedBlob) -> Result<Self> {
        let extension = blob.extension();
        match extension.as_str() {
            ".csv" => Ok(FileKind::Csv),
            ".xlsx" => Ok(FileKind::Xlsx),
            _ => Err(SweepError::UnsupportedFormat { extension }),
        }
    }
}

pub fn parse_blob(blob: &UploadedBlob) -> Result<Table> {
    let kind = FileKind::detect(blob)?;
    tracing::debug!("Parsing {} ({} bytes) as {:?}", blob.name, blob.size, kind);

    let table = match kind {
        FileKind::Csv => delimited::read_csv(&blob.content, &blob.name)?,
        FileKind::Xlsx => spreadsheet::read_xlsx(&blob.content, &blob.name)?,
    };

    tracing::debug!(
        "Parsed {}: {} rows x {} columns",
        blob.name,
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

/// 空白標題改成 `Unnamed: {index}`，重複標題依序加上 `.1`、`.2`
pub(crate) fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (index, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {}", index)
        } else {
            header
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }

        seen.insert(name.clone());
        headers.push(name);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(
            FileKind::detect(&UploadedBlob::new("DATA.CSV", vec![])).unwrap(),
            FileKind::Csv
        );
        assert_eq!(
            FileKind::detect(&UploadedBlob::new("book.Xlsx", vec![])).unwrap(),
            FileKind::Xlsx
        );
    }

    #[test]
    fn test_detect_rejects_other_extensions() {
        for name in ["data.pdf", "notes.txt", "dump.json", "archive.csv.gz"] {
            let err = FileKind::detect(&UploadedBlob::new(name, vec![])).unwrap_err();
            assert!(matches!(err, SweepError::UnsupportedFormat { .. }), "{}", name);
        }

        match FileKind::detect(&UploadedBlob::new("data.pdf", vec![])) {
            Err(SweepError::UnsupportedFormat { extension }) => assert_eq!(extension, ".pdf"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_blob_is_not_parsed() {
        let blob = UploadedBlob::new("data.txt", b"a,b\n1,2\n".to_vec());
        assert!(matches!(
            parse_blob(&blob),
            Err(SweepError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_normalize_headers() {
        let headers = normalize_headers(vec![
            "a".into(),
            "".into(),
            "a".into(),
            "b".into(),
            "a".into(),
        ]);
        assert_eq!(headers, vec!["a", "Unnamed: 1", "a.1", "b", "a.2"]);
    }
}
