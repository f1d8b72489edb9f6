use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    env_config::StripeConfig,
    error::{AppError, Res},
};

/// Subscription tiers a user can be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    #[default]
    Free,
    Amateur,
    Pro,
}

impl PlanId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Free => "free",
            PlanId::Amateur => "amateur",
            PlanId::Pro => "pro",
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = AppError;

    fn from_str(s: &str) -> Res<Self> {
        match s {
            "free" => Ok(PlanId::Free),
            "amateur" => Ok(PlanId::Amateur),
            "pro" => Ok(PlanId::Pro),
            other => Err(AppError::BadRequest(format!("Unknown plan: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub operations_max_daily: u32,
    /// Monthly price in euros.
    pub price: u32,
    /// Stripe price the plan is sold under. Only paid plans have one.
    #[serde(skip)]
    pub stripe_price_id: Option<String>,
}

impl Plan {
    pub fn is_paid(&self) -> bool {
        self.stripe_price_id.is_some()
    }
}

/// The fixed set of plans, built once at startup.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    pub fn new(stripe: &StripeConfig) -> Self {
        Self {
            plans: vec![
                Plan {
                    id: PlanId::Free,
                    name: "Free".to_string(),
                    operations_max_daily: 1,
                    price: 0,
                    stripe_price_id: None,
                },
                Plan {
                    id: PlanId::Amateur,
                    name: "Amateur".to_string(),
                    operations_max_daily: 3,
                    price: 3,
                    stripe_price_id: Some(stripe.amateur_price_id.clone()),
                },
                Plan {
                    id: PlanId::Pro,
                    name: "Pro".to_string(),
                    operations_max_daily: 12,
                    price: 10,
                    stripe_price_id: Some(stripe.pro_price_id.clone()),
                },
            ],
        }
    }

    pub fn get(&self, id: PlanId) -> &Plan {
        let index = match id {
            PlanId::Free => 0,
            PlanId::Amateur => 1,
            PlanId::Pro => 2,
        };
        &self.plans[index]
    }

    pub fn all(&self) -> &[Plan] {
        &self.plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env_config::Config;

    #[test]
    fn catalog_has_fixed_daily_limits() {
        let catalog = PlanCatalog::new(&Config::local().stripe);
        assert_eq!(catalog.get(PlanId::Free).operations_max_daily, 1);
        assert_eq!(catalog.get(PlanId::Amateur).operations_max_daily, 3);
        assert_eq!(catalog.get(PlanId::Pro).operations_max_daily, 12);
    }

    #[test]
    fn only_paid_plans_carry_price_ids() {
        let catalog = PlanCatalog::new(&Config::local().stripe);
        assert!(!catalog.get(PlanId::Free).is_paid());
        assert_eq!(
            catalog.get(PlanId::Pro).stripe_price_id.as_deref(),
            Some("price_pro_monthly")
        );
    }

    #[test]
    fn plan_names_parse() {
        assert_eq!("amateur".parse::<PlanId>().unwrap(), PlanId::Amateur);
        assert!("enterprise".parse::<PlanId>().is_err());
        assert!("Pro".parse::<PlanId>().is_err());
    }
}
