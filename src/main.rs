use tracing::{error, info};

use halal_blob::{BlobServer, Config};

#[tokio::main]
async fn main() {
    let config_path =
        std::env::var("HALAL_BLOB_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

    // Load configuration
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = halal_blob::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        halal_blob::logging::init_console_only(&config.logging.level);
    }

    info!("Halal Blob {}", env!("CARGO_PKG_VERSION"));
    info!("Storage root: {}", config.storage.root);

    let server = match BlobServer::from_config(&config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start blob server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Blob server stopped: {}", e);
        std::process::exit(1);
    }
}
