use std::sync::Arc;

use actix_web::{HttpRequest, Responder, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
};

use crate::{
    BillingBridge,
    dtos::pay::{CheckoutRequest, CheckoutResponse, WebhookResponse},
};

/// Starts a Stripe checkout for a paid plan.
///
/// # Input
/// - `body`: JSON `{ "user_id": "...", "plan": "amateur" | "pro" }`
///
/// # Output
/// - Success: `{ success, checkout_url, session_id }`
/// - Error: 400 for a missing user id, unknown plan or the free plan,
///   500 when Stripe rejects the request
///
/// The checkout redirects back to `/success` or `/cancel` on
/// `PUBLIC_BASE_URL`, or on the host this request was addressed to.
#[post("/create-checkout-session")]
pub async fn post_checkout_session(
    req: HttpRequest,
    body: web::Json<CheckoutRequest>,
    bridge: web::Data<BillingBridge>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let base_url = match &config.public_base_url {
        Some(url) => url.clone(),
        None => {
            let info = req.connection_info();
            format!("{}://{}", info.scheme(), info.host())
        }
    };

    let link = bridge.start_checkout(body.into_inner(), &base_url).await?;

    Success::ok(CheckoutResponse {
        success: true,
        checkout_url: link.url,
        session_id: link.session_id,
    })
}

/// Handles Stripe webhook events.
///
/// Called by Stripe, not by the frontend. Configure
/// `https://yourapp.com/api/webhook/stripe` in the Stripe dashboard and put
/// the signing secret in `STRIPE_WEBHOOK_SECRET`.
///
/// Handled events:
/// - `checkout.session.completed`: activates the plan from the session metadata
/// - `checkout.session.async_payment_failed`: same, flagged as payment failed
///
/// Any other event is acknowledged and ignored. Invalid signatures and
/// malformed payloads, including bodies that are not UTF-8, are answered with 400.
#[post("/stripe")]
pub async fn post_stripe_webhook(
    body: web::Bytes,
    req: HttpRequest,
    bridge: web::Data<BillingBridge>,
) -> Res<impl Responder> {
    let payload = std::str::from_utf8(&body)
        .map_err(|e| AppError::BadRequest(format!("Webhook Error: {}", e)))?;
    let signature = req
        .headers()
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok());

    let event = bridge.construct_event(payload, signature)?;
    bridge.apply_webhook_event(event);

    Success::ok(WebhookResponse { success: true })
}
