use burnwatch::classifier::Classifier;
use burnwatch::config::{Config, ConfigError};
use burnwatch::health;
use burnwatch::ledger::SignatureLedger;
use burnwatch::metadata::{JupiterLookup, MetadataCache};
use burnwatch::monitor::{Monitor, MonitorSettings};
use burnwatch::notify::{Notifier, StartupInfo, TelegramBot};
use burnwatch::rpc::{EndpointPool, HttpTransport};
use burnwatch::shutdown::shutdown_signal;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

const CONFIG_PATH: &str = "burnwatch.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = match load_config() {
        Ok(c) => c,
        Err(e) => {
            print_config_help(&e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .init();
    }

    info!("burnwatch v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        bot_token = %config.masked_token(),
        channel = %config.telegram.channel_id,
        rpc = %config.solana.rpc_urls[0],
        endpoints = config.solana.rpc_urls.len(),
        interval_secs = config.monitor.check_interval_secs,
        min_burn_percent = config.monitor.min_burn_percent,
        "configuration loaded"
    );

    // --- Health responder ---
    let port = config.health.port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(port).await {
            warn!(error = %e, port = port, "health responder stopped");
        }
    });

    // --- Components ---
    let transport = HttpTransport::new(Duration::from_secs(config.solana.request_timeout_secs));
    let pool = EndpointPool::new(config.solana.rpc_urls.clone(), Box::new(transport))?;

    let metadata = MetadataCache::new(Box::new(JupiterLookup::new(
        config.metadata.url.clone(),
        Duration::from_secs(config.metadata.timeout_secs),
    )));
    let notifier = Notifier::new(
        Box::new(TelegramBot::new(
            &config.telegram.api_url,
            &config.telegram.bot_token,
        )),
        config.telegram.channel_id.clone(),
        metadata,
    );

    // Telegram must work; the RPC may recover on its own.
    let me = notifier.verify().await.map_err(|e| {
        error!(error = %e, "Telegram bot check failed");
        e
    })?;
    info!(
        username = %me.username.as_deref().unwrap_or("?"),
        "Telegram bot connected"
    );

    match pool.get_slot().await {
        Ok(slot) => info!(slot = slot, endpoint = %pool.current(), "Solana RPC connected"),
        Err(e) => warn!(error = %e, endpoint = %pool.current(), "Solana connection warning"),
    }

    notifier
        .announce_startup(&StartupInfo {
            monitored: "Raydium".to_string(),
            interval_secs: config.monitor.check_interval_secs,
            min_burn_percent: config.monitor.min_burn_percent,
        })
        .await;

    let classifier = Classifier::new(
        config.solana.burn_addresses.clone(),
        &config.solana.program_id,
        &config.solana.authority_id,
        config.monitor.min_burn_percent,
        config.request_delay(),
    );
    let ledger = SignatureLedger::new(config.ledger.capacity, config.ledger.retain);

    let mut monitor = Monitor::new(
        pool,
        ledger,
        classifier,
        notifier,
        MonitorSettings {
            program_id: config.solana.program_id.clone(),
            signature_limit: config.solana.signature_limit,
            interval: config.check_interval(),
        },
    );

    let stop = shutdown_signal()?;
    tokio::select! {
        _ = monitor.run_forever() => {}
        _ = stop => {
            info!("shutting down...");
        }
    }

    // Dropping the monitor closes the RPC, metadata and Telegram sessions.
    drop(monitor);
    Ok(())
}

fn load_config() -> Result<Config, ConfigError> {
    let config = if Path::new(CONFIG_PATH).exists() {
        Config::load(Path::new(CONFIG_PATH))?
    } else {
        Config::from_env()?
    };
    config.validate()?;
    Ok(config)
}

fn print_config_help(err: &ConfigError) {
    eprintln!("{}", "=".repeat(50));
    eprintln!("ERROR: {}", err);
    eprintln!();
    eprintln!("Required environment variables:");
    eprintln!("  TELEGRAM_BOT_TOKEN  = bot token from @BotFather");
    eprintln!("  TELEGRAM_CHANNEL_ID = channel id (e.g. @channelname or -1234567)");
    eprintln!();
    eprintln!("Optional:");
    eprintln!("  SOLANA_RPC_URL   = RPC endpoint (default: mainnet-beta)");
    eprintln!("  CHECK_INTERVAL   = seconds between polls (default: 30)");
    eprintln!("  MIN_BURN_PERCENT = reported burn percent (default: 90)");
    eprintln!("  PORT             = health check port (default: 10000)");
    eprintln!("{}", "=".repeat(50));
}
