use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use tracing::info;

use afftrack::api::{JwtService, configure_routes};
use afftrack::config::{get_config, init_config};
use afftrack::services::{
    AttributionService, BalanceService, LinkIssuer, UrlTemplateClient, WebhookSecrets,
};
use afftrack::storage::{SeaOrmStorage, infer_backend_from_url, retry::RetryConfig};
use afftrack::system::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    init_config();
    let config = get_config();

    // Guard must outlive main or file logging stops flushing
    let _log_guard = init_logging(&config);

    let backend = if config.database.backend.is_empty() {
        infer_backend_from_url(&config.database.database_url)
            .map_err(|e| std::io::Error::other(e.to_string()))?
    } else {
        config.database.backend.clone()
    };

    let retry = RetryConfig {
        max_retries: config.database.retry_count,
        base_delay_ms: config.database.retry_base_delay_ms,
        max_delay_ms: config.database.retry_max_delay_ms,
    };

    let storage = Arc::new(
        SeaOrmStorage::new(
            &config.database.database_url,
            &backend,
            config.database.pool_size,
            retry,
        )
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?,
    );

    let jwt = web::Data::new(JwtService::from_config(&config.api));
    let attribution = Arc::new(AttributionService::new(
        storage.clone(),
        WebhookSecrets::from_config(&config.webhook),
    ));
    let issuer = Arc::new(LinkIssuer::new(
        storage.clone(),
        Arc::new(UrlTemplateClient::from_config(&config.links)),
    ));
    let balance = Arc::new(BalanceService::new(storage.clone()));

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting afftrack at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .app_data(jwt.clone())
            .app_data(web::Data::new(attribution.clone()))
            .app_data(web::Data::new(issuer.clone()))
            .app_data(web::Data::new(balance.clone()))
            .configure(configure_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
