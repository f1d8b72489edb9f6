use actix_web::web::{self};

pub mod routes {
    pub mod pay;
    pub mod plan;
}

pub mod services {
    pub mod gateway;
    pub mod pay;
}

pub mod dtos {
    pub mod pay;
}

pub mod models {
    pub mod event;
}

pub use services::pay::BillingBridge;

pub fn mount_plans() -> actix_web::Scope {
    web::scope("/plans").service(routes::plan::get_plans)
}
pub fn mount_checkout(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::pay::post_checkout_session);
}
pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/webhook").service(routes::pay::post_stripe_webhook)
}
