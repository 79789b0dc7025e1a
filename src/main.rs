use clap::Parser;
use data_sweeper::core::chart;
use data_sweeper::utils::logger;
use data_sweeper::{CliConfig, FileOutcome, LocalStorage, SweepEngine};

const CHART_WIDTH: usize = 40;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting data-sweeper CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 載入並驗證配置
    let settings = match config.settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    println!("💿 Data Sweeper");
    println!("Transform your files between CSV and Excel formats with built-in data cleaning and visualization");
    println!();

    // 輸入路徑原樣交給 storage，輸出寫到 settings.output_path
    let storage = LocalStorage::new(".");
    let engine = SweepEngine::from_config(storage, &settings, config.monitor);
    let report = engine.run(&config.files, &settings.sessions).await;

    for file in &report.files {
        match &file.result {
            Ok(outcome) => print_outcome(outcome),
            Err(e) => {
                println!("📄 {}", file.input);
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
                println!();
            }
        }
    }

    if config.verbose {
        tracing::debug!("Batch summary:\n{}", report.summary_json()?);
    }

    if report.all_succeeded() {
        println!("🎉 All files processed successfully");
        Ok(())
    } else {
        eprintln!(
            "⚠ {} of {} file(s) could not be processed",
            report.failed(),
            report.files.len()
        );
        std::process::exit(2);
    }
}

fn print_outcome(outcome: &FileOutcome) {
    println!("📄 {} ({} bytes)", outcome.file_name, outcome.size);
    println!("🔍 Preview the head of the data");
    print!("{}", outcome.preview);
    println!(
        "[{} rows x {} columns]",
        outcome.table.row_count(),
        outcome.table.column_count()
    );

    for message in &outcome.messages {
        println!("{}", message);
    }

    if let Some(data) = &outcome.chart {
        println!("📊 Data Visualization");
        print!("{}", chart::render_bars(data, CHART_WIDTH));
    }

    if let (Some(artifact), Some(path)) = (&outcome.artifact, &outcome.saved_path) {
        println!(
            "⬇ Saved {} ({}, {} bytes) to {}",
            artifact.file_name,
            artifact.content_type,
            artifact.len(),
            path
        );
    }
    println!();
}
