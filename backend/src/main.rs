use actix_web::{web, App, HttpServer};
use clap::Parser;
use docuform::config::{ServerConfig, DEFAULT_JWT_SECRET};
use docuform::services;
use docuform::state::AppState;
use docuform::uploads::PUBLIC_PATH;
use env_logger::Env;
use log::{info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = ServerConfig::parse();

    if config.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("Using the default token secret; set DOCUFORM_JWT_SECRET in production");
    }

    let state = AppState::from_config(&config).map_err(|e| std::io::Error::other(e.to_string()))?;
    state.uploads.ensure_dir()?;
    info!(
        "Database {}, renderer {} ({}s deadline), templates: {}",
        config.database.display(),
        config.chrome.display(),
        config.render_timeout_secs,
        state
            .registry
            .descriptors()
            .iter()
            .map(|d| d.slug.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let data = web::Data::new(state);
    let upload_dir = config.upload_dir.clone();
    let json_limit = config.json_limit;

    info!("Server running at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(services::configure(json_limit))
            .service(actix_files::Files::new(PUBLIC_PATH, upload_dir.clone()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
