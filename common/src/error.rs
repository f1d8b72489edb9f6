use actix_web::{HttpResponse, http::StatusCode};
use thiserror::Error;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("Stripe error: {0}")]
    Stripe(#[from] stripe::StripeError),

    // === APPLICATION ERRORS ===
    #[error("{0}")]
    BadRequest(String),

    /// Daily quota exhausted. Carries the user-facing message shown next to the error.
    #[error("Daily operation limit reached")]
    QuotaExceeded(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn to_http_response(&self) -> HttpResponse {
        let to_error_json = |err_msg: &str| {
            serde_json::json!({ "success": false, "error": err_msg })
        };

        match self {
            // === CONVERSION ERRORS ===
            AppError::Stripe(error) => {
                log::error!("Stripe error: {}", error);
                HttpResponse::InternalServerError().json(to_error_json(&self.to_string()))
            }

            // === APPLICATION ERRORS ===
            AppError::BadRequest(_) => {
                HttpResponse::BadRequest().json(to_error_json(&self.to_string()))
            }
            AppError::QuotaExceeded(message) => HttpResponse::Forbidden().json(serde_json::json!({
                "success": false,
                "error": self.to_string(),
                "message": message,
            })),
            AppError::NotFound(_) => HttpResponse::NotFound().json(to_error_json(&self.to_string())),

            AppError::Internal(error) => {
                log::error!("Internal error: {}", error);
                HttpResponse::InternalServerError().json(to_error_json(error))
            }
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::QuotaExceeded(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}
