//! Single binary web server: bracket API for admins (mutations) and viewers (read, long-poll).
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. See `AppConfig::from_env` for the environment variables.

use actix_web::{web::Data, App, HttpServer};
use std::sync::Arc;
use tournament_bracket_web::{
    api, AppConfig, BracketService, BracketStore, BroadcastNotifier, JsonFileStore, MemoryStore,
    ServerState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let store: Box<dyn BracketStore> = match &config.data_path {
        Some(path) => {
            log::info!("Storing bracket in {}", path.display());
            Box::new(JsonFileStore::new(path.clone()))
        }
        None => {
            log::warn!("BRACKET_DATA_PATH not set; bracket is kept in memory only");
            Box::new(MemoryStore::new())
        }
    };
    let notifier = BroadcastNotifier::default();
    let service = BracketService::new(
        store,
        Arc::new(notifier.clone()),
        config.settings.clone(),
        config.format,
    );
    let state = Data::new(ServerState::new(service, notifier, config.poll_timeout));

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind(bind)?
        .run()
        .await
}
