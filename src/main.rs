use clap::Parser;
use medicine_dosage_etl::config::cli::Command;
use medicine_dosage_etl::utils::error::ErrorSeverity;
use medicine_dosage_etl::utils::{logger, validation::Validate};
use medicine_dosage_etl::{
    pacing, CliConfig, DosagePipeline, EtlEngine, EtlError, HttpEntrySource, LocalStorage,
    PipelineSettings, RateLimiter, TomlConfig,
};

type CatalogPipeline = DosagePipeline<LocalStorage, HttpEntrySource, Box<dyn RateLimiter>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting dosage-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match cli.load_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(e),
    };

    match cli.command() {
        Command::Run(_) => {
            let engine = EtlEngine::new(pipeline);
            match engine.run().await {
                Ok(output_path) => {
                    tracing::info!("✅ ETL process completed successfully!");
                    println!("✅ Dosage table saved to: {}", output_path);
                }
                Err(e) => exit_with(e),
            }
        }
        Command::Crawl(_) => match pipeline.crawl().await {
            Ok(report) => {
                println!(
                    "✅ Crawled {} entries: {} fetched, {} with dosage",
                    report.attempted(),
                    report.records.len(),
                    report.with_dosage()
                );
            }
            Err(e) => exit_with(e),
        },
        Command::Convert(_) => match pipeline.convert().await {
            Ok(summary) => {
                println!(
                    "✅ Generated {} with {} of {} medicines",
                    summary.artifact_path, summary.medicines, summary.records
                );
            }
            Err(e) => exit_with(e),
        },
        Command::Fetch { entry_id } => match pipeline.fetch_one(entry_id).await {
            Ok(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            Err(failure) => {
                eprintln!("❌ Entry {} not available: {}", entry_id, failure);
                std::process::exit(2);
            }
        },
    }

    Ok(())
}

fn build_pipeline(config: &TomlConfig) -> medicine_dosage_etl::Result<CatalogPipeline> {
    let source = HttpEntrySource::new(&config.source)?;
    let storage = LocalStorage::new(config.load.output_path.clone());
    let limiter = pacing(config.crawl.delay_ms);

    Ok(DosagePipeline::new(
        storage,
        source,
        limiter,
        PipelineSettings::from_config(config),
    ))
}

fn exit_with(e: EtlError) -> ! {
    tracing::error!(
        "❌ dosage-etl failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
