use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use banner_server::banner::background::generate_artwork;
use banner_server::banner::text::FontBook;
use banner_server::banner::{HistoryBuffer, RenderContext};
use banner_server::config::AppConfig;
use banner_server::i18n::Strings;
use banner_server::query::{Intervals, QueryClient, run_supervisor};
use banner_server::web::app_state::AppState;
use banner_server::web::router::build_router;

/// How long `--render-once` waits for the first online sample.
const FIRST_SAMPLE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Parser)]
#[command(version, about = "TeamSpeak status banner server")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "banner.toml")]
    config: String,

    /// Render a single banner to this file and exit.
    #[arg(long, value_name = "OUT_PNG", conflicts_with = "generate_background")]
    render_once: Option<PathBuf>,

    /// Write the default background artwork to this file and exit.
    #[arg(long, value_name = "OUT_PNG")]
    generate_background: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;
    let strings = Strings::for_lang(&config.server.lang);

    if let Some(out) = cli.generate_background {
        let seed = chrono::Utc::now().timestamp_subsec_nanos();
        let png = generate_artwork(config.banner.width, config.banner.height, seed)?;
        tokio::fs::write(&out, &png)
            .await
            .with_context(|| format!("failed to write {}", out.display()))?;
        info!(path = %out.display(), bytes = png.len(), "background written");
        return Ok(());
    }

    let history = Arc::new(HistoryBuffer::new());
    let client = Arc::new(QueryClient::new(strings));
    let cancel = CancellationToken::new();

    let supervisor = tokio::spawn(run_supervisor(
        config.teamspeak.clone(),
        client.clone(),
        history.clone(),
        strings,
        Intervals::default(),
        cancel.clone(),
    ));

    let fonts = FontBook::load(&config.banner.font, strings.font_loaded);
    if fonts.face_count() == 0 {
        warn!("no font faces found, banner text will be blank");
    }
    let render = Arc::new(RenderContext::new(&config, history.clone(), client, fonts));

    if let Some(out) = cli.render_once {
        wait_for_first_sample(&history).await;
        let png = render.render_banner().await?;
        tokio::fs::write(&out, png.as_slice())
            .await
            .with_context(|| format!("failed to write {}", out.display()))?;
        info!(path = %out.display(), bytes = png.len(), "banner written");
        cancel.cancel();
        supervisor.await?;
        return Ok(());
    }

    let app = build_router(Arc::new(AppState::new(render)));
    let listener = tokio::net::TcpListener::bind(&config.server.web_address)
        .await
        .with_context(|| format!("failed to bind {}", config.server.web_address))?;

    info!(address = %config.server.web_address, "{}", strings.server_running);

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("{}", strings.server_shutdown);
            shutdown.cancel();
        })
        .await
        .context("http server error")?;

    cancel.cancel();
    supervisor.await?;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("BANNER_LOG_JSON").is_ok_and(|v| v == "1");
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn wait_for_first_sample(history: &HistoryBuffer) {
    let waited = tokio::time::timeout(FIRST_SAMPLE_TIMEOUT, async {
        while history.is_empty() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await;
    if waited.is_err() {
        warn!("no online sample yet, rendering with what is available");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
