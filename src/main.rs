use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use courier::banner::print_banner;
use courier::config::{KeySource, Settings, key_fingerprint};
use courier::consts::DEFAULT_PORT;
use courier::dispatch::Dispatcher;
use courier::downstream::{self, TransportMode};
use courier::server::{self, AppState};

#[derive(Parser)]
#[command(
    name = "courier",
    version,
    about = "Webhook relay between a chat front end and its lesson services."
)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Retrieval service URL (retrieve fails with 400 when unset)
    #[arg(long, env = "RETRIEVAL_URL")]
    retrieval_url: Option<String>,

    /// Business service base URL (stub lessons when unset)
    #[arg(long, env = "BUSINESS_URL")]
    business_url: Option<String>,

    /// Prompt service URL (stub elicitation when unset)
    #[arg(long, env = "PROMPT_URL")]
    prompt_url: Option<String>,

    /// Outbound connection strategy
    #[arg(long, value_enum, env = "COURIER_TRANSPORT", default_value_t = TransportMode::Pooled)]
    transport: TransportMode,

    /// Log a snippet of every downstream payload
    #[arg(long, env = "DEBUG_WEBHOOK", default_value_t = false)]
    debug_payloads: bool,

    /// Key accepted when neither WEBHOOK_API_KEY nor WEBHOOK_KEY is set (development only)
    #[arg(long)]
    dev_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings {
        transport: cli.transport,
        debug_payloads: cli.debug_payloads,
        ..Settings::new(cli.port, cli.retrieval_url, cli.business_url, cli.prompt_url)
    };
    let keys = KeySource::Env {
        dev_default: cli.dev_key.filter(|k| !k.is_empty()),
    };

    let key = keys.resolve();
    let fingerprint = key_fingerprint(&key);
    print_banner(&settings, &fingerprint);
    tracing::info!(
        retrieval = settings.retrieval_url.is_some(),
        business = settings.business_url.is_some(),
        prompt = settings.prompt_url.is_some(),
        transport = ?settings.transport,
        api_key = %fingerprint,
        "configuration loaded"
    );
    if key.is_empty() {
        tracing::warn!("no webhook key configured, every /webhook call will be rejected");
    }

    let transport = downstream::build(settings.transport)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let state = AppState::new(Dispatcher::new(settings, keys, transport));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    server::serve(listener, state, shutdown_signal()).await?;
    tracing::info!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl-C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
