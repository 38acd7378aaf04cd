use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anichin_scraper::app_state::AppState;
use anichin_scraper::config::Config;
use anichin_scraper::{api, logging};
use log::info;
use std::path::Path;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    logging::init(Path::new("log4rs.yml"));

    let cfg = Config::load();

    info!("Scraping {}", cfg.site.base_url);
    info!("  Max retries: {}", cfg.bot_detection.max_retries);
    info!("  Timeout: {}s", cfg.bot_detection.timeout_secs);
    info!("  Strict status codes: {}", cfg.server.strict_status_codes);

    let state = AppState::from_config(cfg.clone())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let data = web::Data::new(state);

    // Try consecutive ports starting at the configured one
    let first_port = cfg.server.port;
    let last_port = first_port.saturating_add(cfg.server.port_attempts.max(1) - 1);
    let mut last_err: Option<std::io::Error> = None;

    for port in first_port..=last_port {
        let data_clone = data.clone();
        let server_cfg = cfg.server.clone();
        let addr = format!("{}:{}", cfg.server.host, port);
        match HttpServer::new(move || {
            App::new()
                .app_data(data_clone.clone())
                .wrap(api::cors(&server_cfg))
                .wrap(Logger::default())
                .configure(api::configure)
        })
        .bind(&addr)
        {
            Ok(server) => {
                info!("Listening on {}", addr);
                return server.run().await;
            }
            Err(e) => {
                log::warn!("Could not bind {}: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            format!("No available ports {}-{}", first_port, last_port),
        )
    }))
}
