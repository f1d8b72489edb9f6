use actix_web::{Responder, get, post, web};
use common::{
    error::{AppError, Res},
    http::Success,
};
use limiter::quota::{QuotaTracker, Registration};

use crate::dtos::user::{CheckOperationResponse, RegisterOperationResponse, StatusResponse};

/// Returns the user's plan, subscription flags and today's usage.
///
/// Unknown users are created on the free plan.
#[get("/{user_id}/status")]
pub async fn get_status(
    path: web::Path<String>,
    tracker: web::Data<QuotaTracker>,
) -> Res<impl Responder> {
    let user_id = path.into_inner();
    let status = tracker.get_status(&user_id);

    Success::ok(StatusResponse {
        success: true,
        user_id,
        status,
    })
}

/// Tells whether the user may perform one more operation today.
#[post("/{user_id}/check-operation")]
pub async fn post_check_operation(
    path: web::Path<String>,
    tracker: web::Data<QuotaTracker>,
) -> Res<impl Responder> {
    let user_id = path.into_inner();
    let status = tracker.get_status(&user_id);

    Success::ok(CheckOperationResponse {
        success: true,
        can_operate: status.can_operate(),
        user_id,
        operations_today: status.operations_today,
        operations_max_daily: status.operations_max_daily,
        plan: status.plan,
    })
}

/// Consumes one unit of the user's daily quota.
///
/// Answers 403 without counting anything when the quota is already used up.
#[post("/{user_id}/register-operation")]
pub async fn post_register_operation(
    path: web::Path<String>,
    tracker: web::Data<QuotaTracker>,
) -> Res<impl Responder> {
    let user_id = path.into_inner();

    match tracker.try_register_operation(&user_id) {
        Registration::Registered(status) => Success::ok(RegisterOperationResponse {
            success: true,
            message: "Operation registered successfully",
            operations_today: status.operations_today,
            operations_remaining: status.operations_remaining(),
        }),
        Registration::LimitReached(_) => Err(AppError::QuotaExceeded(
            "You have reached your daily operation limit.".to_string(),
        )),
    }
}
