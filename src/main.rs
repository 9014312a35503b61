use clap::Parser;
use skip_slider::core::slider::format_currency;
use skip_slider::domain::ports::ConfigProvider;
use skip_slider::utils::error::ErrorSeverity;
use skip_slider::utils::{logger, validation::Validate};
use skip_slider::{
    CliConfig, HttpSkipSource, LocationQueryService, LocationSession, QueryStatus, RenderState,
    SkipError,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting skip-slider CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = match config.validate().and_then(|_| config.resolve()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let source = HttpSkipSource::new(&settings.api)?;
    let service = Arc::new(LocationQueryService::with_stale_time(
        source,
        settings.api.stale_time(),
    ));
    let mut session = LocationSession::new(service.clone(), settings.api.image_base_url());

    tracing::info!(
        "🔍 Looking up skips for {} / {} (cache {:?})",
        settings.postcode,
        settings.area,
        service.stale_time()
    );

    if let QueryStatus::Failed(e) = session.set_location(&settings.postcode, &settings.area).await {
        exit_with(e);
    }

    if let Some(size) = config.size {
        session.select(size);
    }

    if config.list {
        for option in session.selection().options() {
            println!(
                "{:>3} yd  {:>3} days  {:>10}  ({} inc VAT)  road: {:<3}  heavy waste: {}",
                option.size,
                option.hire_period_days,
                format_currency(option.price_before_vat),
                format_currency(option.price_with_vat()),
                if option.allowed_on_road { "yes" } else { "no" },
                if option.allows_heavy_waste { "yes" } else { "no" },
            );
        }
        println!();
    }

    let state = session.render();
    if config.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    match state {
        RenderState::Loading => println!("Loading..."),
        RenderState::Error { message } => eprintln!("❌ {}", message),
        RenderState::NoData => println!("No data available"),
        RenderState::Content(view) => {
            println!("{} Yard Skip", view.selected);
            println!(
                "Slider: {} .. {} (stops: {})",
                view.min,
                view.max,
                view.stops
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("Fill: {:.0}%", view.fill_percent);
            if let Some(price) = &view.card.price {
                println!("Price: {}", price);
            }
            if view.card.not_allowed_on_road {
                println!("⚠️  Not Allowed on Road");
            }
            println!("Image: {}", view.card.image_url);
        }
    }

    Ok(())
}

fn exit_with(e: &SkipError) -> ! {
    tracing::error!(
        "❌ Skip lookup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    if e.is_retryable() {
        tracing::info!("🔁 Error is transient, a rerun may succeed");
        eprintln!("🔁 This looks temporary; run the command again in a moment");
    }

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
