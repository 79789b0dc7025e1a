use anyhow::Result;
use data_sweeper::config::toml_config::SweepConfig;
use data_sweeper::core::engine::SUMMARY_FILE_NAME;
use data_sweeper::core::format;
use data_sweeper::{
    CellValue, ExportFormat, FilePipeline, FileSession, LocalStorage, SessionBook, SessionEvent,
    SweepEngine, SweepError, UploadedBlob,
};
use std::fs;
use tempfile::TempDir;

const SALES_CSV: &str = "region,units,price\nnorth,3,2.5\nsouth,,4.0\nnorth,3,2.5\neast,5,\n";

fn write_input(dir: &TempDir, name: &str, content: &[u8]) -> Result<()> {
    fs::write(dir.path().join(name), content)?;
    Ok(())
}

fn storage_for(dir: &TempDir) -> LocalStorage {
    LocalStorage::new(dir.path().to_string_lossy())
}

#[tokio::test]
async fn test_batch_with_local_storage() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_input(&temp_dir, "sales.csv", SALES_CSV.as_bytes())?;
    write_input(&temp_dir, "notes.txt", b"not a table")?;

    // sales.csv：清理後輸出 Excel；notes.txt 用預設 session
    let mut sessions = SessionBook::default();
    let sales = FileSession::default()
        .with_event(SessionEvent::SetCleaning(true))
        .with_event(SessionEvent::RemoveDuplicates)
        .with_event(SessionEvent::FillMissing)
        .with_event(SessionEvent::ChooseFormat(ExportFormat::Spreadsheet))
        .with_event(SessionEvent::Convert);
    sessions.insert("sales.csv", sales);

    let engine = SweepEngine::new(storage_for(&temp_dir), FilePipeline::default(), "converted")
        .with_summary(true);
    let inputs = vec!["sales.csv".to_string(), "notes.txt".to_string()];
    let report = engine.run(&inputs, &sessions).await;

    println!("📊 Batch: {} ok, {} failed", report.succeeded(), report.failed());
    assert_eq!(report.succeeded(), 1);
    assert!(matches!(
        report.files[1].result,
        Err(SweepError::UnsupportedFormat { ref extension }) if extension == ".txt"
    ));

    let outcome = report.files[0].result.as_ref().unwrap();
    assert_eq!(outcome.duplicates_removed, Some(1));
    assert_eq!(outcome.table.row_count(), 3);

    // 寫出的 xlsx 可以再讀回來
    let xlsx_path = temp_dir.path().join("converted").join("sales.xlsx");
    assert!(xlsx_path.exists());
    let bytes = fs::read(&xlsx_path)?;
    let reparsed = format::parse_blob(&UploadedBlob::new("sales.xlsx", bytes))?;
    assert_eq!(reparsed.column_names(), vec!["region", "units", "price"]);
    assert_eq!(reparsed.row_count(), 3);
    assert_eq!(reparsed.column("units").unwrap().null_count(), 0);
    assert_eq!(reparsed.column("price").unwrap().null_count(), 0);
    assert_eq!(
        reparsed.column("region").unwrap().values[2],
        CellValue::Text("east".to_string())
    );

    // 批次摘要
    let summary = fs::read_to_string(temp_dir.path().join("converted").join(SUMMARY_FILE_NAME))?;
    let json: serde_json::Value = serde_json::from_str(&summary)?;
    assert_eq!(json["processed"], 2);
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["files"][0]["status"], "ok");
    assert_eq!(json["files"][1]["status"], "error");
    Ok(())
}

#[tokio::test]
async fn test_spreadsheet_back_to_csv() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let xlsx = data_sweeper::core::export::export_table(
        &format::parse_blob(&UploadedBlob::new(
            "people.csv",
            b"name,age\nann,31\nbob,27\n".to_vec(),
        ))?,
        "people.csv",
        ExportFormat::Spreadsheet,
    )?;
    write_input(&temp_dir, "people.xlsx", &xlsx.content)?;

    let config = SweepConfig::from_toml_str(
        r#"
[output]
path = "out"

[[files]]
name = "people.xlsx"
columns = ["age", "name"]
convert = "csv"
"#,
    )?;
    let sessions = config.session_book(FileSession::default());

    let engine = SweepEngine::new(storage_for(&temp_dir), FilePipeline::default(), "out");
    let report = engine.run(&["people.xlsx".to_string()], &sessions).await;
    assert!(report.all_succeeded());

    let csv = fs::read_to_string(temp_dir.path().join("out").join("people.csv"))?;
    assert_eq!(csv, "age,name\n31,ann\n27,bob\n");
    Ok(())
}

#[tokio::test]
async fn test_unknown_column_fails_only_that_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_input(&temp_dir, "a.csv", b"x,y\n1,2\n")?;
    write_input(&temp_dir, "b.csv", b"x,y\n3,4\n")?;

    let mut sessions = SessionBook::default();
    sessions.insert(
        "a.csv",
        FileSession::default().with_event(SessionEvent::SelectColumns(vec!["z".to_string()])),
    );

    let engine = SweepEngine::new(storage_for(&temp_dir), FilePipeline::default(), "out");
    let report = engine
        .run(&["a.csv".to_string(), "b.csv".to_string()], &sessions)
        .await;

    assert!(matches!(
        report.files[0].result,
        Err(SweepError::UnknownColumn { .. })
    ));
    assert!(report.files[1].is_success());
    // 沒有要求轉換就不會寫出任何檔案
    assert!(!temp_dir.path().join("out").exists());
    Ok(())
}
