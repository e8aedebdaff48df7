use clap::Parser;
use travel_etl::core::Pipeline;
use travel_etl::utils::{logger, validation::Validate};
use travel_etl::{BatchPipeline, EtlEngine, EtlError, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "travel-etl driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "travel-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Drop low-confidence (substring) matches
    #[arg(long)]
    strict: bool,

    /// Run extract and transform, print the summary, write nothing
    #[arg(long)]
    dry_run: bool,
}

fn report_failure(e: &EtlError) -> ! {
    tracing::error!(
        "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 設定檔載入前先用 CLI 格式，避免日誌遺失
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(args.verbose);
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based travel-etl");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if args.strict {
        config.set_strict();
        tracing::info!("🔧 Strict matching enabled from the command line");
    }

    if let Err(e) = config.validate() {
        report_failure(&e);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".");
    let pipeline = BatchPipeline::new(storage, config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        if let Err(e) = perform_dry_run(&pipeline).await {
            report_failure(&e);
        }
        return Ok(());
    }

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);
    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ ETL process completed successfully!");
            println!("✅ ETL process completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => report_failure(&e),
    }
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    println!("  Nodes: {}", config.inputs.nodes);
    println!("  Aliases: {}", config.inputs.aliases);
    println!("  Tours: {}", config.inputs.tours);
    println!("  Ports: {}", config.inputs.ports);
    println!("  Output: {}", config.load.output_path);
    println!("  Formats: {}", config.load.output_formats.join(", "));
    println!("  Neighbor threshold: {} km", config.threshold_km());
    println!("  Max phrase words: {}", config.max_words());
    println!("  Low-confidence matches: {}", config.include_low_confidence());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(pipeline: &BatchPipeline<LocalStorage, TomlConfig>) -> travel_etl::Result<()> {
    let snapshot = pipeline.extract().await?;
    let bundle = pipeline.transform(snapshot).await?;
    let summary = &bundle.summary;

    println!("🔍 Dry Run Analysis:");
    println!();
    println!("📥 Inputs:");
    println!(
        "  Tours: {} read, {} kept, {} rejected",
        summary.tours.input, summary.tours.kept, summary.tours.rejected
    );
    println!(
        "  Ports: {} read, {} kept, {} rejected",
        summary.ports.input, summary.ports.kept, summary.ports.rejected
    );
    println!("  Data quality issues: {}", summary.data_quality_issues);

    println!();
    println!("🔗 Matches:");
    for result in &bundle.matches {
        println!("  {}: {} records", result.node_id, result.len());
    }
    for (strategy, count) in &summary.matches_by_strategy {
        println!("  {} via {}", count, strategy);
    }
    if !summary.skipped_nodes.is_empty() {
        println!("  Skipped (not active): {}", summary.skipped_nodes.join(", "));
    }

    println!();
    println!("⚓ Ports:");
    for port in &bundle.ports {
        println!("  {}: {} neighbors", port.id, port.neighbors.len());
    }

    println!();
    println!("✅ Dry run complete. Nothing was written to {}", pipeline.config().load.output_path);
    Ok(())
}
