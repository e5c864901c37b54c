use anyhow::Result;
use std::fs;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::core::config::{self, ServerConfig};
use crate::core::store::StateStore;
use crate::core::terminal::{print_status, print_step};
use crate::interfaces::web::ApiServer;
use crate::logging::SseMakeWriter;

pub async fn run_serve(args: &[String]) -> Result<()> {
    dotenvy::dotenv().ok();

    let (log_tx, _) = tokio::sync::broadcast::channel::<String>(500);
    let make_writer = SseMakeWriter {
        sender: log_tx.clone(),
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(make_writer)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let mut config = ServerConfig::from_env();
    (config.host, config.port) = super::parse_serve_flags(args, 2, config.host, config.port);
    config.validate()?;

    let data_dir = config::data_dir();
    fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("state.db");
    let store = StateStore::open(&db_path)?;
    info!("State store ready at {}", db_path.display());

    print_step("Starting fudai API server");
    print_status("Address", &format!("http://{}:{}", config.host, config.port));
    print_status(
        "Voice",
        if config.voice_enabled() {
            "enabled"
        } else {
            "disabled (FISH_AUDIO_API_KEY missing)"
        },
    );
    print_status(
        "Image",
        if config.image_enabled() {
            "enabled"
        } else {
            "disabled (LiblibAI keys missing)"
        },
    );
    print_status(
        "Vision",
        if config.vision_enabled() {
            "enabled"
        } else {
            "disabled (DashScope key missing)"
        },
    );

    let server = ApiServer::new(Arc::new(config), Arc::new(Mutex::new(store)), log_tx);
    server.run().await
}
