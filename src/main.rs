use std::sync::Arc;

use actix_files::Files;
use actix_web::{cookie::Key, middleware::Logger, web, App, HttpServer};
use log::info;

use tailormail::config::{self, AppConfig};
use tailormail::routes::{self, app_state::AppState};
use tailormail::services::completion_service::GroqClient;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    config::init_logging();

    // Refuse to start without a provider credential.
    let app_config = AppConfig::from_env()?;
    info!("Loaded configuration: {:?}", app_config);

    let completion = GroqClient::new(&app_config)?;
    let state = web::Data::new(AppState::new(Arc::new(completion), &app_config));

    let sessions = state.session_manager.clone();
    let sweep_every = app_config.session_idle_ttl;
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(sweep_every);
        loop {
            ticker.tick().await;
            let evicted = sessions.evict_idle().await;
            if evicted > 0 {
                info!("Evicted {} idle sessions", evicted);
            }
        }
    });

    let session_key = Key::generate();
    let static_dir = app_config.static_dir.clone();

    info!(
        "Starting server on http://{}:{}",
        app_config.server_host, app_config.server_port
    );
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(routes::session_middleware(session_key.clone()))
            .wrap(Logger::default())
            .configure(routes::init_routes)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind((app_config.server_host.as_str(), app_config.server_port))?
    .run()
    .await?;

    Ok(())
}
