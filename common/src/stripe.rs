use std::collections::HashMap;

use stripe::{Client, CreateCustomer, Customer, CustomerId};

use crate::error::{AppError, Res};

pub fn create_client(secret_key: &str) -> Client {
    Client::new(secret_key)
}

/// Creates a Stripe customer tagged with our user id.
pub async fn create_customer(client: &Client, user_id: &str) -> Res<Customer> {
    let params = CreateCustomer {
        metadata: Some(HashMap::from([(
            "user_id".to_string(),
            user_id.to_string(),
        )])),
        ..Default::default()
    };

    Customer::create(client, params)
        .await
        .map_err(AppError::from)
}

/// Retrieve customer object based on customer ID.
pub async fn get_customer(client: &Client, customer_id: &str) -> Res<Customer> {
    let id = customer_id.parse::<CustomerId>().map_err(|e| {
        AppError::Internal(format!(
            "Failed to parse customer id: {}. {}",
            customer_id, e
        ))
    })?;
    Customer::retrieve(client, &id, &[])
        .await
        .map_err(AppError::from)
}
