use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Holds everything needed to bind the HTTP server, talk to Stripe
/// and decide which optional surfaces are mounted.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// Process signing key.
    pub secret_key: String,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Optional file the logger mirrors its output to.
    pub log_file: Option<String>,
    /// Whether the demo user seeding route is mounted.
    pub test_routes_enabled: bool,
    /// Base URL used for checkout redirects. Derived from the request when unset.
    pub public_base_url: Option<String>,
    /// Stripe configuration
    pub stripe: StripeConfig,
}

#[derive(Clone, Debug)]
/// Stripe credentials and the price ids the paid plans are sold under.
pub struct StripeConfig {
    /// Stripe secret key
    pub secret_key: String,
    /// Stripe webhook secret. Without it webhook payloads are parsed unverified.
    pub webhook_secret: Option<String>,
    pub amateur_price_id: String,
    pub pro_price_id: String,
}

impl StripeConfig {
    /// Reads the Stripe settings:
    /// - `STRIPE_SECRET_KEY`: defaults to empty
    /// - `STRIPE_WEBHOOK_SECRET`: optional, empty counts as unset
    /// - `STRIPE_PRICE_AMATEUR` / `STRIPE_PRICE_PRO`: price ids of the paid plans
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        StripeConfig {
            secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            webhook_secret: non_empty_var("STRIPE_WEBHOOK_SECRET"),
            amateur_price_id: env::var("STRIPE_PRICE_AMATEUR")
                .unwrap_or_else(|_| "price_amateur_monthly".to_string()),
            pro_price_id: env::var("STRIPE_PRICE_PRO")
                .unwrap_or_else(|_| "price_pro_monthly".to_string()),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Every value has a default so the server starts on a bare machine.
    ///
    /// # Environment Variables
    ///
    /// - `ENVIRONMENT`: "development" or "production" (default: "development")
    /// - `SECRET_KEY`: process signing key (default: "your-secret-key-here")
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 5000)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_FILE`: Optional log file path
    /// - `ENABLE_TEST_ROUTES`: Mount the demo seeding route (default: true)
    /// - `PUBLIC_BASE_URL`: Base for checkout redirect URLs
    /// - Stripe settings, see [`StripeConfig::from_env`]
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            secret_key: env::var("SECRET_KEY")
                .unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string()),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: flag_var("ENABLE_CONSOLE_LOGGING", true),
            log_file: non_empty_var("LOG_FILE"),
            test_routes_enabled: flag_var("ENABLE_TEST_ROUTES", true),
            public_base_url: non_empty_var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            stripe: StripeConfig::from_env(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Logs configuration problems that do not prevent startup.
    pub fn warn_on_weak_settings(&self) {
        if self.stripe.secret_key.is_empty() {
            log::warn!("STRIPE_SECRET_KEY is not set, checkout requests will fail");
        }
        if self.is_production() {
            if self.stripe.webhook_secret.is_none() {
                log::warn!(
                    "STRIPE_WEBHOOK_SECRET is not set, webhook payloads are accepted without signature verification"
                );
            }
            if self.secret_key == DEFAULT_SECRET_KEY {
                log::warn!("SECRET_KEY is using the default value");
            }
        }
    }
}

const DEFAULT_SECRET_KEY: &str = "your-secret-key-here";

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn flag_var(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|value| value.to_lowercase() == "true")
        .unwrap_or(default)
}

impl Config {
    /// Development defaults without any environment lookups.
    pub fn local() -> Self {
        Config {
            environment: "development".to_string(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 5000,
            num_workers: 1,
            cors_allowed_origin: "http://localhost:3000".to_string(),
            console_logging_enabled: false,
            log_file: None,
            test_routes_enabled: true,
            public_base_url: None,
            stripe: StripeConfig {
                secret_key: String::new(),
                webhook_secret: None,
                amateur_price_id: "price_amateur_monthly".to_string(),
                pro_price_id: "price_pro_monthly".to_string(),
            },
        }
    }
}
