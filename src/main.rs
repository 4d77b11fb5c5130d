use anyhow::Result;
use clap::Parser;
use shelfmark_server::book_store::{BookService, LocalBookStore, SqliteBookStore};
use shelfmark_server::config::{AppConfig, CliConfig, FileConfig};
use shelfmark_server::enrichment::{GoogleBooksClient, MetadataProvider, NoopMetadataProvider};
use shelfmark_server::server::{run_server, RequestsLoggingLevel};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite database file for signed-in users' data.
    #[clap(long)]
    pub db_path: Option<PathBuf>,

    /// Directory holding the guest (device-local) store blobs.
    /// Defaults to a `guest_store` directory next to the database.
    #[clap(long)]
    pub guest_store_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Base URL of the book metadata API used for enrichment.
    #[clap(long)]
    pub metadata_api_url: Option<String>,

    /// Skip metadata enrichment entirely on add-book.
    #[clap(long, default_value_t = false)]
    pub disable_enrichment: bool,

    /// Path to an optional TOML config file; its values override the CLI.
    #[clap(long)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(
        &CliConfig {
            db_path: cli_args.db_path,
            guest_store_dir: cli_args.guest_store_dir,
            port: cli_args.port,
            logging_level: cli_args.logging_level,
            frontend_dir_path: cli_args.frontend_dir_path,
            metadata_api_url: cli_args.metadata_api_url,
            disable_enrichment: cli_args.disable_enrichment,
        },
        file_config,
    )?;

    info!("Opening book store database at {:?}...", config.db_path);
    let remote = Arc::new(SqliteBookStore::new(&config.db_path)?);

    info!("Opening guest store at {:?}...", config.guest_store_dir);
    let local = Arc::new(LocalBookStore::open(&config.guest_store_dir)?);

    let metadata: Arc<dyn MetadataProvider> = if config.disable_enrichment {
        info!("Metadata enrichment disabled");
        Arc::new(NoopMetadataProvider)
    } else {
        info!("Using metadata API at {}", config.metadata_api_url);
        Arc::new(GoogleBooksClient::new(&config.metadata_api_url)?)
    };

    let book_service = Arc::new(BookService::new(remote, local, metadata));

    info!("Ready to serve at port {}!", config.port);
    run_server(
        book_service,
        config.logging_level,
        config.port,
        config.frontend_dir_path,
    )
    .await
}
