use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;

use readlog::app::routes::router;
use readlog::app::state::{AppState, Settings, public_url_from_env};
use readlog::cover::{CoverResolver, DEFAULT_COVER_SERVICE};
use readlog::library::Library;
use readlog::store::{KeyValueStore, LocalFsStore};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Library: a .json/.yaml file or a directory of Markdown files.
    #[arg(long)]
    books: PathBuf,

    /// Where view counts and the dark-mode flag are kept.
    #[arg(long, default_value = "readlog-data")]
    data_dir: PathBuf,

    /// Local files served under /assets (e.g. cover images).
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    #[arg(long, default_value = "My Reading Log")]
    site_title: String,

    #[arg(long, default_value = DEFAULT_COVER_SERVICE)]
    cover_service: String,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    readlog::logging::init()?;

    let args = AppArgs::parse();
    tracing::info!(?args, "starting readlog-app");

    let library = Library::load(&args.books).context("load library")?;
    let public_url = public_url_from_env()?;
    if let Some(url) = &public_url {
        tracing::info!(public_url = %url, "share links use public url");
    }

    let settings = Settings {
        site_title: args.site_title,
        covers: CoverResolver::new(&args.cover_service)?,
        public_url,
    };
    let store: Arc<dyn KeyValueStore> = Arc::new(LocalFsStore::new(&args.data_dir));
    let state = AppState::new(library, store, settings);

    let assets_dir = args.assets_dir.filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
            tracing::warn!(dir = %dir.display(), "assets dir not found; /assets disabled");
        }
        exists
    });
    let app = router(state, assets_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
