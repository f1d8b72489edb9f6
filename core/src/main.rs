use std::sync::Arc;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use api_subs::{BillingBridge, services::gateway::StripeGateway};
use common::{env_config::Config, plan::PlanCatalog};
use quota_gate::cors;

#[actix_web::main]
pub async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // get info
    let logger_enabled = config.console_logging_enabled;
    let origin = config.cors_allowed_origin.clone();
    let routes = quota_gate::routes(config.test_routes_enabled);

    // init logger
    if logger_enabled {
        logger::setup(config.log_file.as_deref()).expect("Failed to set up logger");
    }
    config.warn_on_weak_settings();

    // in-memory user store, plans and the two services on top of it
    let store = db::setup();
    let plans = Arc::new(PlanCatalog::new(&config.stripe));
    let tracker = web::Data::new(limiter::quota_tracker(store.clone(), plans.clone()));
    let bridge = web::Data::new(BillingBridge::new(
        Arc::new(StripeGateway::new(&config.stripe.secret_key)),
        store,
        plans,
        config.stripe.webhook_secret.clone(),
    ));

    log::info!(
        "Starting quota gate on {}:{} ({})",
        config.server_host,
        config.server_port,
        config.environment
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config_data.clone()))
            .app_data(tracker.clone())
            .app_data(bridge.clone())
            .app_data(quota_gate::json_config())
            .wrap(logger::middleware(logger_enabled)) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .configure(routes.clone())
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
