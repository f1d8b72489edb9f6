use actix_web::{Responder, get, web};
use common::{error::Res, http::Success};

use crate::{BillingBridge, dtos::pay::PlansResponse};

/// Lists the plans users can be on, with their daily limits and prices.
#[get("")]
pub async fn get_plans(bridge: web::Data<BillingBridge>) -> Res<impl Responder> {
    Success::ok(PlansResponse {
        success: true,
        plans: bridge.plans().all().to_vec(),
    })
}
