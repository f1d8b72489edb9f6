use std::collections::HashMap;

use common::plan::Plan;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/create-checkout-session`. Both fields are checked by the service.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: Option<String>,
    pub plan: Option<String>,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub checkout_url: String,
    pub session_id: String,
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct PlansResponse {
    pub success: bool,
    pub plans: Vec<Plan>,
}

/// What we ask the payment processor for when opening a checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionRequest {
    pub customer_id: String,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

/// Hosted checkout returned by the payment processor.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLink {
    pub session_id: String,
    pub url: String,
}
