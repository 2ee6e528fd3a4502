mod http;

use std::sync::Arc;

use clap::Parser;
use globe_proto::config::Config;
use globe_proto::directory::StationAggregator;
use globe_proto::state::SessionManager;
use globe_proto::timezone::TimezoneResolver;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Radio globe backend: aggregates stations and serves the player API.
#[derive(Debug, Parser)]
#[command(name = "radio-globe", version)]
struct Args {
    /// Country code that gets extra directory queries ("" for none).
    #[arg(long)]
    priority_region: Option<String>,
    /// Worldwide result count.
    #[arg(long)]
    world_limit: Option<u32>,
    /// HTTP API port.
    #[arg(long)]
    port: Option<u16>,
    /// Print the aggregated station list as JSON and exit.
    #[arg(long)]
    dump: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(region) = &self.priority_region {
            config.directory.priority_region = region.clone();
        }
        if let Some(limit) = self.world_limit {
            config.directory.world_limit = limit;
        }
        if let Some(port) = self.port {
            config.http.port = port;
        }
    }
}

fn init_logging() -> anyhow::Result<std::path::PathBuf> {
    let data_dir = globe_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = globe_proto::platform::log_path();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);

    // The terminal only hears about trouble; everything else goes to the file.
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(tracing_subscriber::filter::LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "info,globe_daemon=debug,globe_proto=debug,hyper_util=warn,reqwest=warn",
                )
            }),
        )
        .init();

    Ok(log_path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_path = init_logging()?;
    eprintln!("radio-globe log: {}", log_path.display());

    let mut config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());
    args.apply(&mut config);

    let aggregator = Arc::new(StationAggregator::new(&config.directory)?);
    let resolver = Arc::new(TimezoneResolver::new(&config.timezone)?);

    let stations = aggregator.fetch_stations().await;
    info!("Loaded {} stations", stations.len());

    if args.dump {
        println!("{}", serde_json::to_string_pretty(&stations)?);
        return Ok(());
    }

    let session = Arc::new(SessionManager::new(stations, config.player.default_volume));

    let app_state = http::HttpState {
        session,
        aggregator,
        resolver,
    };
    let addr = format!("{}:{}", config.http.bind_address, config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP API server listening on http://{}", addr);

    axum::serve(listener, http::router(app_state)).await?;
    Ok(())
}
