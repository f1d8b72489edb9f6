use actix_web::{HttpRequest, HttpResponse, web};
use common::error::AppError;

pub mod cors;
pub mod pages;

/// Registers the HTML pages and the `/api` tree.
///
/// The demo seeding route is only added when `test_routes_enabled` is set.
pub fn routes(test_routes_enabled: bool) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        cfg.service(pages::get_index)
            .service(pages::get_success)
            .service(pages::get_cancel);

        let mut api = web::scope("/api")
            .service(api_users::mount_users())
            .service(api_subs::mount_plans())
            .service(api_subs::mount_webhook())
            .configure(api_subs::mount_checkout)
            .default_service(web::to(not_found));
        if test_routes_enabled {
            api = api.service(api_users::mount_test());
        }
        cfg.service(api);
    }
}

async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(req.path().to_string()))
}

/// Malformed JSON bodies are reported like every other client error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
