use std::collections::HashMap;

use common::{
    error::{AppError, Res},
    plan::PlanId,
};
use db::dtos::user::SubscriptionUpdate;
use serde::Deserialize;

pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
pub const CHECKOUT_ASYNC_PAYMENT_FAILED: &str = "checkout.session.async_payment_failed";

/// Webhook events the billing flow acts on. Everything else is `Ignored`.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingEvent {
    CheckoutCompleted(CheckoutSessionOutcome),
    AsyncPaymentFailed(CheckoutSessionOutcome),
    Ignored(String),
}

/// The parts of a checkout session we correlate back to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionOutcome {
    pub session_id: Option<String>,
    pub user_id: String,
    pub plan: PlanId,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
}

impl CheckoutSessionOutcome {
    pub fn to_update(&self, payment_failed: bool) -> SubscriptionUpdate {
        SubscriptionUpdate {
            plan: self.plan,
            // set on failed async payments too, see DESIGN.md
            subscription_active: true,
            payment_failed,
            stripe_customer_id: self.customer_id.clone(),
            stripe_subscription_id: self.subscription_id.clone(),
        }
    }
}

#[derive(Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    type_: String,
    data: EventData,
}

#[derive(Deserialize)]
struct EventData {
    object: serde_json::Value,
}

#[derive(Deserialize)]
struct SessionObject {
    id: Option<String>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
    customer: Option<ExpandableId>,
    subscription: Option<ExpandableId>,
}

/// Stripe references are either a bare id or the expanded object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExpandableId {
    Id(String),
    Object { id: String },
}

impl ExpandableId {
    fn into_id(self) -> String {
        match self {
            ExpandableId::Id(id) | ExpandableId::Object { id } => id,
        }
    }
}

impl BillingEvent {
    /// Lowers a raw event payload into a `BillingEvent`.
    pub fn from_payload(payload: &str) -> Res<Self> {
        let envelope: EventEnvelope = serde_json::from_str(payload)
            .map_err(|e| AppError::BadRequest(format!("Webhook Error: {}", e)))?;

        match envelope.type_.as_str() {
            CHECKOUT_COMPLETED => Ok(BillingEvent::CheckoutCompleted(session_outcome(
                envelope.data.object,
            )?)),
            CHECKOUT_ASYNC_PAYMENT_FAILED => Ok(BillingEvent::AsyncPaymentFailed(
                session_outcome(envelope.data.object)?,
            )),
            _ => Ok(BillingEvent::Ignored(envelope.type_)),
        }
    }
}

fn session_outcome(object: serde_json::Value) -> Res<CheckoutSessionOutcome> {
    let session: SessionObject = serde_json::from_value(object)
        .map_err(|e| AppError::BadRequest(format!("Webhook Error: {}", e)))?;
    let mut metadata = session.metadata.unwrap_or_default();

    let user_id = metadata
        .remove("user_id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("Webhook Error: session metadata has no user_id".to_string())
        })?;
    let plan = metadata
        .remove("plan")
        .ok_or_else(|| {
            AppError::BadRequest("Webhook Error: session metadata has no plan".to_string())
        })?
        .parse::<PlanId>()?;

    Ok(CheckoutSessionOutcome {
        session_id: session.id,
        user_id,
        plan,
        customer_id: session.customer.map(ExpandableId::into_id),
        subscription_id: session.subscription.map(ExpandableId::into_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(type_: &str, object: serde_json::Value) -> String {
        json!({ "id": "evt_1", "type": type_, "data": { "object": object } }).to_string()
    }

    #[test]
    fn completed_session_is_lowered() {
        let raw = payload(
            CHECKOUT_COMPLETED,
            json!({
                "id": "cs_1",
                "metadata": { "user_id": "u1", "plan": "pro" },
                "customer": "cus_1",
                "subscription": "sub_1"
            }),
        );

        let event = BillingEvent::from_payload(&raw).unwrap();
        assert_eq!(
            event,
            BillingEvent::CheckoutCompleted(CheckoutSessionOutcome {
                session_id: Some("cs_1".to_string()),
                user_id: "u1".to_string(),
                plan: PlanId::Pro,
                customer_id: Some("cus_1".to_string()),
                subscription_id: Some("sub_1".to_string()),
            })
        );
    }

    #[test]
    fn expanded_references_yield_their_ids() {
        let raw = payload(
            CHECKOUT_ASYNC_PAYMENT_FAILED,
            json!({
                "metadata": { "user_id": "u1", "plan": "amateur" },
                "customer": { "id": "cus_9", "object": "customer" },
                "subscription": null
            }),
        );

        match BillingEvent::from_payload(&raw).unwrap() {
            BillingEvent::AsyncPaymentFailed(outcome) => {
                assert_eq!(outcome.customer_id.as_deref(), Some("cus_9"));
                assert_eq!(outcome.subscription_id, None);
                assert_eq!(outcome.plan, PlanId::Amateur);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn unknown_types_are_ignored_without_inspecting_the_object() {
        let raw = payload("invoice.paid", json!({ "whatever": 1 }));
        assert_eq!(
            BillingEvent::from_payload(&raw).unwrap(),
            BillingEvent::Ignored("invoice.paid".to_string())
        );
    }

    #[test]
    fn missing_metadata_is_rejected() {
        let raw = payload(CHECKOUT_COMPLETED, json!({ "metadata": { "plan": "pro" } }));
        assert!(matches!(
            BillingEvent::from_payload(&raw),
            Err(AppError::BadRequest(_))
        ));

        let raw = payload(CHECKOUT_COMPLETED, json!({ "id": "cs_1" }));
        assert!(matches!(
            BillingEvent::from_payload(&raw),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn unknown_plan_in_metadata_is_rejected() {
        let raw = payload(
            CHECKOUT_COMPLETED,
            json!({ "metadata": { "user_id": "u1", "plan": "platinum" } }),
        );
        assert!(matches!(
            BillingEvent::from_payload(&raw),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn garbage_payload_is_a_bad_request() {
        assert!(matches!(
            BillingEvent::from_payload("not json"),
            Err(AppError::BadRequest(_))
        ));
    }
}
