use async_trait::async_trait;
use common::error::{AppError, Res};
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionPaymentMethodTypes, CustomerId,
};

use crate::dtos::pay::{CheckoutLink, CheckoutSessionRequest};

/// The payment processor calls the billing flow depends on.
#[async_trait(?Send)]
pub trait PaymentGateway: Send + Sync {
    /// Creates a customer tagged with our user id and returns its id.
    async fn create_customer(&self, user_id: &str) -> Res<String>;

    /// Confirms a stored customer still exists and returns its id.
    async fn retrieve_customer(&self, customer_id: &str) -> Res<String>;

    /// Opens a subscription-mode hosted checkout.
    async fn create_checkout_session(&self, req: &CheckoutSessionRequest) -> Res<CheckoutLink>;
}

pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: common::stripe::create_client(secret_key),
        }
    }
}

#[async_trait(?Send)]
impl PaymentGateway for StripeGateway {
    async fn create_customer(&self, user_id: &str) -> Res<String> {
        let customer = common::stripe::create_customer(&self.client, user_id).await?;
        Ok(customer.id.to_string())
    }

    async fn retrieve_customer(&self, customer_id: &str) -> Res<String> {
        let customer = common::stripe::get_customer(&self.client, customer_id).await?;
        Ok(customer.id.to_string())
    }

    async fn create_checkout_session(&self, req: &CheckoutSessionRequest) -> Res<CheckoutLink> {
        let customer_id = req.customer_id.parse::<CustomerId>().map_err(|e| {
            AppError::Internal(format!(
                "Failed to parse customer id: {}. {}",
                req.customer_id, e
            ))
        })?;

        let params = CreateCheckoutSession {
            payment_method_types: Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]),
            line_items: Some(vec![CreateCheckoutSessionLineItems {
                price: Some(req.price_id.clone()),
                quantity: Some(1),
                ..Default::default()
            }]),
            mode: Some(CheckoutSessionMode::Subscription),
            success_url: Some(req.success_url.as_str()),
            cancel_url: Some(req.cancel_url.as_str()),
            customer: Some(customer_id),
            metadata: Some(req.metadata.clone()),
            ..Default::default()
        };
        let session = CheckoutSession::create(&self.client, params)
            .await
            .map_err(AppError::from)?;

        let url = session.url.ok_or_else(|| {
            AppError::Internal(format!("Checkout session {} has no URL", session.id))
        })?;
        Ok(CheckoutLink {
            session_id: session.id.to_string(),
            url,
        })
    }
}
