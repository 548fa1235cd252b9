use anyhow::Context;
use clap::Parser;
use roster_site::adapters::{self, SiteSource};
use roster_site::config::toml_config::TomlConfig;
use roster_site::core::{ConfigProvider, RosterSource};
use roster_site::utils::{logger, validation::Validate};
use roster_site::{LocalStorage, RosterPage, RosterRenderer, SiteEngine};

#[derive(Parser)]
#[command(name = "toml-roster")]
#[command(about = "Roster page renderer with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "roster.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the cohort selected before writing the page
    #[arg(long)]
    filter: Option<String>,

    /// Override photo probing setting from config
    #[arg(long)]
    probe_images: Option<bool>,

    /// Dry run - load the roster and show what would be rendered without writing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based roster renderer");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(filter) = &args.filter {
        config.render.initial_filter = Some(filter.clone());
        tracing::info!("🔧 Initial filter overridden to: {}", filter);
    }
    if let Some(probe) = args.probe_images {
        config.render.probe_images = Some(probe);
        tracing::info!("🔧 Photo probing overridden to: {}", probe);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config, &args);

    let source = SiteSource::from_config(&config).context("building roster source")?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - Nothing will be written");
        return perform_dry_run(&source).await;
    }

    let mut page = RosterPage::new(source, RosterRenderer::new(config.labels()));
    if let Some(resolver) =
        adapters::photo_resolver(&config).context("building photo resolver")?
    {
        tracing::info!("🔍 Photo probing enabled");
        page = page.with_photo_resolver(resolver);
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let mut engine = SiteEngine::new(page, storage, config.page_title())
        .with_initial_filter(config.initial_filter());

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Roster page rendered successfully!");
            println!("✅ Roster page rendered successfully!");
            for file in &report.files {
                println!("📁 {}/{}", config.output_path(), file);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Roster rendering failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Title: {}", config.page_title());
    match config.site_url() {
        Some(url) => println!("  Site: {}", url),
        None => println!("  Site root: {}", config.site_root()),
    }
    println!("  Data: {}", config.data_path());
    println!("  Output: {}", config.output_path());
    println!("  Probe images: {}", config.probe_images());

    if let Some(filter) = config.initial_filter() {
        println!("  Initial filter: {}", filter);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(source: &SiteSource) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();
    println!("📡 Data Source: {}", source.describe());

    let cohorts = source
        .load()
        .await
        .with_context(|| format!("loading roster from {}", source.describe()))?;

    println!();
    println!("👥 Cohorts ({}):", cohorts.len());
    for cohort in &cohorts {
        println!(
            "  {} - coordinator: {}, students: {}",
            cohort.year,
            cohort.coordinator.name,
            cohort.members.len()
        );
    }

    println!();
    println!("✅ Dry run analysis complete. Run without --dry-run to write the page.");

    Ok(())
}
