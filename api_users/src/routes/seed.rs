use actix_web::{Responder, post, web};
use common::{error::Res, http::Success};
use db::models::user::today;
use limiter::quota::QuotaTracker;

use crate::{dtos::user::SeedResponse, services};

/// Creates the demo users `user_free`, `user_amateur` and `user_pro`.
///
/// Existing records with those ids are replaced. Only mounted when
/// `ENABLE_TEST_ROUTES` is on.
#[post("/create-users")]
pub async fn post_create_users(tracker: web::Data<QuotaTracker>) -> Res<impl Responder> {
    let users = services::seed::seed_demo_users(tracker.store().as_ref(), today());
    log::info!("Seeded demo users: {}", users.join(", "));

    Success::ok(SeedResponse {
        success: true,
        message: "Test users created",
        users,
    })
}
