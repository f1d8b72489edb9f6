use std::{collections::HashMap, sync::Arc};

use common::{
    error::{AppError, Res},
    plan::{PlanCatalog, PlanId},
};
use db::user::UserStore;
use stripe::{Webhook, WebhookError};

use crate::{
    dtos::pay::{CheckoutLink, CheckoutRequest, CheckoutSessionRequest},
    models::event::BillingEvent,
    services::gateway::PaymentGateway,
};

/// Connects plan upgrades to the payment processor and feeds its
/// webhook events back into the user store.
pub struct BillingBridge {
    gateway: Arc<dyn PaymentGateway>,
    store: Arc<dyn UserStore>,
    plans: Arc<PlanCatalog>,
    webhook_secret: Option<String>,
}

impl BillingBridge {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        store: Arc<dyn UserStore>,
        plans: Arc<PlanCatalog>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            gateway,
            store,
            plans,
            webhook_secret,
        }
    }

    pub fn plans(&self) -> &PlanCatalog {
        &self.plans
    }

    /// Opens a hosted checkout for a paid plan.
    ///
    /// The user's Stripe customer is reused when one is stored, otherwise it is
    /// created and its id stored before the session is requested. That id is
    /// kept even when the session call fails; the next attempt reuses it.
    pub async fn start_checkout(&self, req: CheckoutRequest, base_url: &str) -> Res<CheckoutLink> {
        let invalid = || AppError::BadRequest("Invalid user_id or plan".to_string());

        let user_id = req.user_id.filter(|id| !id.is_empty()).ok_or_else(invalid)?;
        let plan_id = req
            .plan
            .as_deref()
            .ok_or_else(invalid)?
            .parse::<PlanId>()
            .map_err(|_| invalid())?;

        let plan = self.plans.get(plan_id);
        let price_id = match &plan.stripe_price_id {
            Some(price_id) => price_id.clone(),
            None => {
                return Err(AppError::BadRequest(
                    "Cannot create session for free plan".to_string(),
                ));
            }
        };

        let customer_id = self.ensure_customer(&user_id).await?;

        let link = self
            .gateway
            .create_checkout_session(&CheckoutSessionRequest {
                customer_id,
                price_id,
                success_url: format!("{}/success?session_id={{CHECKOUT_SESSION_ID}}", base_url),
                cancel_url: format!("{}/cancel", base_url),
                metadata: HashMap::from([
                    ("user_id".to_string(), user_id.clone()),
                    ("plan".to_string(), plan_id.to_string()),
                ]),
            })
            .await?;

        log::info!(
            "Checkout session {} created for user {} on plan {}",
            link.session_id,
            user_id,
            plan_id
        );
        Ok(link)
    }

    async fn ensure_customer(&self, user_id: &str) -> Res<String> {
        let stored = self
            .store
            .get(user_id)
            .and_then(|record| record.stripe_customer_id);

        if let Some(customer_id) = stored {
            return self.gateway.retrieve_customer(&customer_id).await;
        }

        let customer_id = self.gateway.create_customer(user_id).await?;
        self.store.upsert(user_id, &mut |record| {
            record.stripe_customer_id = Some(customer_id.clone());
        });
        log::info!("Created Stripe customer {} for user {}", customer_id, user_id);
        Ok(customer_id)
    }

    /// Verifies (when a signing secret is configured) and lowers a webhook payload.
    pub fn construct_event(&self, payload: &str, signature: Option<&str>) -> Res<BillingEvent> {
        if let Some(secret) = &self.webhook_secret {
            let signature = signature
                .ok_or_else(|| AppError::BadRequest("Stripe signature missing".to_string()))?;
            match Webhook::construct_event(payload, signature, secret) {
                Ok(event) => log::debug!("Verified webhook event {}", event.id),
                // signature and timestamp already passed, only the typed event failed to parse
                Err(WebhookError::BadParse(e)) => {
                    log::debug!("Verified webhook payload without a typed event: {}", e)
                }
                Err(e) => {
                    log::error!("Error constructing webhook event: {}", e);
                    return Err(AppError::BadRequest(format!("Webhook Error: {}", e)));
                }
            }
        }
        BillingEvent::from_payload(payload)
    }

    /// Writes a webhook event onto the user's record in one update.
    pub fn apply_webhook_event(&self, event: BillingEvent) {
        match event {
            BillingEvent::CheckoutCompleted(outcome) => {
                let update = outcome.to_update(false);
                self.store
                    .upsert(&outcome.user_id, &mut |record| update.apply_to(record));
                log::info!("User {} subscribed to {} plan", outcome.user_id, outcome.plan);
            }
            BillingEvent::AsyncPaymentFailed(outcome) => {
                let update = outcome.to_update(true);
                self.store
                    .upsert(&outcome.user_id, &mut |record| update.apply_to(record));
                log::warn!(
                    "Async payment failed for user {} on {} plan, subscription left active",
                    outcome.user_id,
                    outcome.plan
                );
            }
            BillingEvent::Ignored(type_) => {
                log::info!("Unhandled event type: {}", type_);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use common::env_config::Config;
    use db::user::MemoryUserStore;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    use super::*;

    /// Records every call and hands out predictable ids.
    #[derive(Default)]
    pub(crate) struct FakeGateway {
        pub customers_created: Mutex<Vec<String>>,
        pub customers_retrieved: Mutex<Vec<String>>,
        pub sessions: Mutex<Vec<CheckoutSessionRequest>>,
        pub fail_sessions: bool,
    }

    #[async_trait(?Send)]
    impl PaymentGateway for FakeGateway {
        async fn create_customer(&self, user_id: &str) -> Res<String> {
            let mut created = self.customers_created.lock().unwrap();
            created.push(user_id.to_string());
            Ok(format!("cus_{}", created.len()))
        }

        async fn retrieve_customer(&self, customer_id: &str) -> Res<String> {
            self.customers_retrieved
                .lock()
                .unwrap()
                .push(customer_id.to_string());
            Ok(customer_id.to_string())
        }

        async fn create_checkout_session(
            &self,
            req: &CheckoutSessionRequest,
        ) -> Res<CheckoutLink> {
            if self.fail_sessions {
                return Err(AppError::Internal("stripe is down".to_string()));
            }
            let mut sessions = self.sessions.lock().unwrap();
            sessions.push(req.clone());
            let session_id = format!("cs_test_{}", sessions.len());
            Ok(CheckoutLink {
                url: format!("https://checkout.stripe.test/pay/{}", session_id),
                session_id,
            })
        }
    }

    pub(crate) fn bridge(
        gateway: Arc<FakeGateway>,
        webhook_secret: Option<&str>,
    ) -> (BillingBridge, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::new());
        let bridge = BillingBridge::new(
            gateway,
            store.clone(),
            Arc::new(PlanCatalog::new(&Config::local().stripe)),
            webhook_secret.map(str::to_string),
        );
        (bridge, store)
    }

    /// Builds a `Stripe-Signature` header for `payload`, dated `timestamp`.
    pub(crate) fn stripe_signature_at(payload: &str, secret: &str, timestamp: i64) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        format!(
            "t={},v1={}",
            timestamp,
            hex::encode(mac.finalize().into_bytes())
        )
    }

    pub(crate) fn stripe_signature(payload: &str, secret: &str) -> String {
        stripe_signature_at(payload, secret, chrono::Utc::now().timestamp())
    }

    fn checkout(user_id: &str, plan: &str) -> CheckoutRequest {
        CheckoutRequest {
            user_id: Some(user_id.to_string()),
            plan: Some(plan.to_string()),
        }
    }

    #[actix_web::test]
    async fn free_plan_checkout_is_rejected_without_calling_stripe() {
        let gateway = Arc::new(FakeGateway::default());
        let (bridge, _) = bridge(gateway.clone(), None);

        let err = bridge
            .start_checkout(checkout("u1", "free"), "http://localhost:5000")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Cannot create session for free plan");
        assert!(gateway.customers_created.lock().unwrap().is_empty());
        assert!(gateway.sessions.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn invalid_input_is_rejected() {
        let (bridge, _) = bridge(Arc::new(FakeGateway::default()), None);

        for req in [
            CheckoutRequest::default(),
            checkout("", "pro"),
            checkout("u1", "gold"),
            CheckoutRequest {
                user_id: Some("u1".to_string()),
                plan: None,
            },
        ] {
            let err = bridge
                .start_checkout(req, "http://localhost:5000")
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Invalid user_id or plan");
        }
    }

    #[actix_web::test]
    async fn pro_checkout_creates_customer_once_and_reuses_it() {
        let gateway = Arc::new(FakeGateway::default());
        let (bridge, store) = bridge(gateway.clone(), None);

        let first = bridge
            .start_checkout(checkout("u1", "pro"), "http://localhost:5000")
            .await
            .unwrap();
        assert_eq!(first.session_id, "cs_test_1");
        assert!(first.url.ends_with("cs_test_1"));
        assert_eq!(
            store.get("u1").unwrap().stripe_customer_id.as_deref(),
            Some("cus_1")
        );

        bridge
            .start_checkout(checkout("u1", "amateur"), "http://localhost:5000")
            .await
            .unwrap();

        assert_eq!(gateway.customers_created.lock().unwrap().len(), 1);
        assert_eq!(*gateway.customers_retrieved.lock().unwrap(), vec!["cus_1"]);

        let sessions = gateway.sessions.lock().unwrap();
        assert_eq!(sessions[0].customer_id, "cus_1");
        assert_eq!(sessions[0].price_id, "price_pro_monthly");
        assert_eq!(sessions[1].price_id, "price_amateur_monthly");
        assert_eq!(sessions[0].metadata["user_id"], "u1");
        assert_eq!(sessions[0].metadata["plan"], "pro");
        assert_eq!(
            sessions[0].success_url,
            "http://localhost:5000/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(sessions[0].cancel_url, "http://localhost:5000/cancel");
    }

    #[actix_web::test]
    async fn customer_id_survives_a_failed_session() {
        let gateway = Arc::new(FakeGateway {
            fail_sessions: true,
            ..Default::default()
        });
        let (bridge, store) = bridge(gateway, None);

        let err = bridge
            .start_checkout(checkout("u1", "pro"), "http://localhost:5000")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        let record = store.get("u1").unwrap();
        assert_eq!(record.stripe_customer_id.as_deref(), Some("cus_1"));
        assert_eq!(record.plan, PlanId::Free);
    }

    fn session_event(type_: &str, user_id: &str, plan: &str) -> String {
        serde_json::json!({
            "id": "evt_1",
            "type": type_,
            "data": { "object": {
                "id": "cs_1",
                "metadata": { "user_id": user_id, "plan": plan },
                "customer": "cus_42",
                "subscription": "sub_42"
            }}
        })
        .to_string()
    }

    #[test]
    fn completed_checkout_activates_the_plan() {
        let (bridge, store) = bridge(Arc::new(FakeGateway::default()), None);
        store.upsert("u1", &mut |r| {
            r.payment_failed = true;
            r.operations_today = 1;
        });

        let event = bridge
            .construct_event(
                &session_event("checkout.session.completed", "u1", "pro"),
                None,
            )
            .unwrap();
        bridge.apply_webhook_event(event);

        let record = store.get("u1").unwrap();
        assert_eq!(record.plan, PlanId::Pro);
        assert!(record.subscription_active);
        assert!(!record.payment_failed);
        assert_eq!(record.operations_today, 1);
        assert_eq!(record.stripe_customer_id.as_deref(), Some("cus_42"));
        assert_eq!(record.stripe_subscription_id.as_deref(), Some("sub_42"));
    }

    #[test]
    fn async_payment_failure_marks_the_record() {
        let (bridge, store) = bridge(Arc::new(FakeGateway::default()), None);

        let event = bridge
            .construct_event(
                &session_event("checkout.session.async_payment_failed", "u2", "amateur"),
                None,
            )
            .unwrap();
        bridge.apply_webhook_event(event);

        let record = store.get("u2").unwrap();
        assert_eq!(record.plan, PlanId::Amateur);
        assert!(record.payment_failed);
        assert!(record.subscription_active);
    }

    #[test]
    fn other_events_leave_the_store_untouched() {
        let (bridge, store) = bridge(Arc::new(FakeGateway::default()), None);

        let event = bridge
            .construct_event(&session_event("customer.created", "u3", "pro"), None)
            .unwrap();
        bridge.apply_webhook_event(event);

        assert!(store.is_empty());
    }

    #[test]
    fn signed_mode_requires_a_signature() {
        let (bridge, _) = bridge(Arc::new(FakeGateway::default()), Some("whsec_test"));
        let payload = session_event("checkout.session.completed", "u1", "pro");

        let missing = bridge.construct_event(&payload, None).unwrap_err();
        assert_eq!(missing.to_string(), "Stripe signature missing");

        let forged = bridge
            .construct_event(&payload, Some("t=1,v1=deadbeef"))
            .unwrap_err();
        assert!(matches!(forged, AppError::BadRequest(_)));
    }

    #[test]
    fn signed_checkout_event_is_applied() {
        let (bridge, store) = bridge(Arc::new(FakeGateway::default()), Some("whsec_test"));
        let payload = session_event("checkout.session.completed", "u1", "pro");
        let signature = stripe_signature(&payload, "whsec_test");

        let event = bridge.construct_event(&payload, Some(&signature)).unwrap();
        bridge.apply_webhook_event(event);

        let record = store.get("u1").unwrap();
        assert_eq!(record.plan, PlanId::Pro);
        assert!(record.subscription_active);
    }

    #[test]
    fn signed_event_of_unmodelled_type_is_ignored() {
        let (bridge, store) = bridge(Arc::new(FakeGateway::default()), Some("whsec_test"));
        let payload = serde_json::json!({
            "id": "evt_2",
            "type": "invoice_payment.paid",
            "data": { "object": { "id": "inpay_1" } }
        })
        .to_string();
        let signature = stripe_signature(&payload, "whsec_test");

        let event = bridge.construct_event(&payload, Some(&signature)).unwrap();
        assert_eq!(event, BillingEvent::Ignored("invoice_payment.paid".to_string()));

        bridge.apply_webhook_event(event);
        assert!(store.is_empty());
    }

    #[test]
    fn stale_or_foreign_signatures_are_rejected() {
        let (bridge, _) = bridge(Arc::new(FakeGateway::default()), Some("whsec_test"));
        let payload = session_event("checkout.session.completed", "u1", "pro");

        let stale = stripe_signature_at(
            &payload,
            "whsec_test",
            chrono::Utc::now().timestamp() - 3600,
        );
        assert!(matches!(
            bridge.construct_event(&payload, Some(&stale)),
            Err(AppError::BadRequest(_))
        ));

        let foreign = stripe_signature(&payload, "whsec_other");
        assert!(matches!(
            bridge.construct_event(&payload, Some(&foreign)),
            Err(AppError::BadRequest(_))
        ));
    }
}
