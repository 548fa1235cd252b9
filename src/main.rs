use clap::Parser;
use roster_site::adapters::{self, SiteSource};
use roster_site::core::ConfigProvider;
use roster_site::utils::{logger, validation::Validate};
use roster_site::{CliConfig, LocalStorage, RosterPage, RosterRenderer, SiteEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting roster-site CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    // 建立資料來源與照片檢查器
    let (source, resolver) = match SiteSource::from_config(&config)
        .and_then(|source| Ok((source, adapters::photo_resolver(&config)?)))
    {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    if resolver.is_some() {
        tracing::info!("🔍 Photo probing enabled ({} concurrent)", config.concurrent_requests);
    }

    let mut page = RosterPage::new(source, RosterRenderer::new(config.labels()));
    if let Some(resolver) = resolver {
        page = page.with_photo_resolver(resolver);
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let mut engine = SiteEngine::new(page, storage, config.page_title())
        .with_initial_filter(config.initial_filter());

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Roster page rendered successfully!");
            tracing::info!(
                "👥 {} coordinators, {} students, {} placeholder avatars",
                report.snapshot.coordinator_cards,
                report.snapshot.member_cards,
                report.snapshot.avatar_fallbacks
            );
            println!("✅ Roster page rendered successfully!");
            println!("📁 Output saved to: {}", config.output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Roster rendering failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}
