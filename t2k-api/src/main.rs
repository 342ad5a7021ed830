//! t2k-api - Top 2000 chart service
//!
//! Serves the yearly chart, artist and song lookups, admin edits and the
//! `/statistieken/:year` report over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use t2k_common::api::load_shared_secret;
use t2k_common::config::{
    load_toml_config, resolve_config_path, write_toml_config, CliOverrides, ServiceConfig,
    TomlConfig,
};
use t2k_common::db::{
    chart_summaries_current, chart_summaries_present, init_database, refresh_chart_summaries,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use t2k_api::source::{
    ChartDataSource, FallbackChartSource, RelationalChartSource, SummaryChartSource,
};
use t2k_api::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "t2k-api", version, about = "Top 2000 chart service")]
struct Args {
    /// TOML config file (default: platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "T2K_DATABASE")]
    database: Option<PathBuf>,

    /// Listen address
    #[arg(short, long)]
    bind: Option<String>,

    /// Tracing filter used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Rebuild the chart summary tables before serving
    #[arg(long)]
    refresh_summaries: bool,

    /// Read chart data from the base tables only
    #[arg(long, conflicts_with = "refresh_summaries")]
    no_summaries: bool,

    /// Save the resolved settings to the config file and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config supplies the log level, so it is read before tracing starts;
    // where it came from is logged once the subscriber is up.
    let config_path = resolve_config_path(args.config.as_deref());
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path)?,
        None => TomlConfig::default(),
    };

    let cli = CliOverrides {
        database_path: args.database.clone(),
        bind_addr: args.bind.clone(),
        log_level: args.log_level.clone(),
        refresh_summaries: args.refresh_summaries,
        no_summaries: args.no_summaries,
    };
    let config = ServiceConfig::resolve(&cli, &toml_config);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting Top 2000 service (t2k-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config_path {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        Some(path) => warn!("Config file not found at {}; using defaults", path.display()),
        None => info!("No config directory available; using defaults"),
    }

    if args.write_config {
        let path = config_path.context("No config path available; pass --config")?;
        write_toml_config(&config.to_toml(), &path)
            .with_context(|| format!("Write config {}", path.display()))?;
        info!("Wrote config file: {}", path.display());
        return Ok(());
    }

    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .with_context(|| format!("Open database {}", config.database_path.display()))?;

    if config.refresh_summaries_on_startup {
        let counts = refresh_chart_summaries(&pool)
            .await
            .context("Refresh chart summaries")?;
        info!(
            "Chart summaries rebuilt: {} rows, {} songs",
            counts.chart_rows, counts.songs
        );
    }

    let source: Arc<dyn ChartDataSource> = if config.use_chart_summaries {
        if !chart_summaries_present(&pool).await? {
            warn!("Chart summary tables missing; relational queries serve until --refresh-summaries");
        } else if !chart_summaries_current(&pool).await? {
            warn!("Chart summaries are out of date; relational queries serve until --refresh-summaries");
        }
        info!("Chart data: summary tables with relational fallback");
        Arc::new(FallbackChartSource::new(
            SummaryChartSource::new(pool.clone()),
            RelationalChartSource::new(pool.clone()),
        ))
    } else {
        info!("Chart data: relational tables only");
        Arc::new(RelationalChartSource::new(pool.clone()))
    };

    // A missing secret is generated; an unreadable one must not open the admin routes
    let shared_secret = load_shared_secret(&pool)
        .await
        .context("Load API shared secret")?;
    if shared_secret == 0 {
        info!("API authentication disabled (shared_secret = 0)");
    } else {
        info!("Loaded shared secret for API authentication");
    }

    let state = AppState::new(pool, source, shared_secret);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Bind {}", config.bind_addr))?;
    info!("t2k-api listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
