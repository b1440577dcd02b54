mod config;
mod job_controller;
mod services;

use crate::config::AppConfig;
use crate::job_controller::state::JobsState;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};
use tokio::sync::mpsc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };
    if let Err(e) = config.submission() {
        warn!("{}; submissions will be refused until it is set", e);
    }

    // Initialize job controller state
    let (tx, rx) = mpsc::channel(100);
    let jobs_state = JobsState::new(tx);

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    let (host, port) = (config.host.clone(), config.port);
    info!(
        "Server running at {} (max {} rows per upload)",
        config.url(),
        config.max_rows
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(web::Data::new(config.clone()))
            .service(services::shipments::configure_routes())
            .service(services::submissions::configure_routes())
    })
    .bind((host, port))?
    .run()
    .await
}
