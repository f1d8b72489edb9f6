use common::plan::PlanId;
use limiter::quota::QuotaStatus;
use serde::Serialize;

#[derive(Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub user_id: String,
    pub status: QuotaStatus,
}

#[derive(Serialize)]
pub struct CheckOperationResponse {
    pub success: bool,
    pub can_operate: bool,
    pub user_id: String,
    pub operations_today: u32,
    pub operations_max_daily: u32,
    pub plan: PlanId,
}

#[derive(Serialize)]
pub struct RegisterOperationResponse {
    pub success: bool,
    pub message: &'static str,
    pub operations_today: u32,
    pub operations_remaining: u32,
}

#[derive(Serialize)]
pub struct SeedResponse {
    pub success: bool,
    pub message: &'static str,
    pub users: Vec<&'static str>,
}
