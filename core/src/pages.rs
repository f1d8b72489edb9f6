use actix_web::{HttpResponse, Responder, get, web};
use api_subs::BillingBridge;
use common::http::Success;
use serde::Deserialize;

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 40px; background: #f5f5f5; }
    .container { max-width: 800px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
    .endpoint { background: #f8f9fa; padding: 15px; margin: 10px 0; border-radius: 5px; border-left: 4px solid #007bff; }
    .method { color: #007bff; font-weight: bold; }
    .plans { display: flex; gap: 20px; margin: 20px 0; }
    .plan { border: 2px solid #ddd; padding: 20px; border-radius: 10px; text-align: center; flex: 1; }
    .plan.amateur { border-color: #ffc107; }
    .plan.pro { border-color: #28a745; }
    code { background: #f8f9fa; padding: 2px 5px; border-radius: 3px; }
    .button { background: #007bff; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px; }
"#;

const ENDPOINTS: [(&str, &str, &str); 7] = [
    ("GET", "/api/plans", "Lists the available plans"),
    ("GET", "/api/user/&lt;user_id&gt;/status", "Subscription and quota status of a user"),
    ("POST", "/api/user/&lt;user_id&gt;/check-operation", "Whether the user can perform an operation"),
    ("POST", "/api/user/&lt;user_id&gt;/register-operation", "Registers one operation"),
    ("POST", "/api/create-checkout-session", "Starts a Stripe checkout for a paid plan"),
    ("POST", "/api/webhook/stripe", "Stripe webhook receiver"),
    ("POST", "/api/test/create-users", "Creates demo users"),
];

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        title, STYLE, body
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Landing page with the plans and the API reference.
#[get("/")]
pub async fn get_index(bridge: web::Data<BillingBridge>) -> impl Responder {
    let plans: String = bridge
        .plans()
        .all()
        .iter()
        .map(|plan| {
            format!(
                "<div class=\"plan {}\"><h3>{}</h3><p>{} operations/day</p><p><strong>&euro;{}/month</strong></p></div>",
                plan.id,
                plan.name,
                plan.operations_max_daily,
                plan.price
            )
        })
        .collect();

    let endpoints: String = ENDPOINTS
        .iter()
        .map(|(method, path, purpose)| {
            format!(
                "<div class=\"endpoint\"><span class=\"method\">{}</span> <code>{}</code><p>{}</p></div>",
                method, path, purpose
            )
        })
        .collect();

    let body = format!(
        r#"<div class="container">
<h1>Quota Gate API</h1>
<p>Daily operation quotas per subscription plan, billed through Stripe.</p>
<h2>Plans</h2>
<div class="plans">{}</div>
<h2>Endpoints</h2>
{}
<h2>Try it</h2>
<pre><code>curl -X POST "http://localhost:5000/api/test/create-users"
curl -X GET "http://localhost:5000/api/user/user_free/status"
curl -X POST "http://localhost:5000/api/user/user_free/register-operation"</code></pre>
</div>"#,
        plans, endpoints
    );

    Success::html(layout("Quota Gate", &body))
}

#[derive(Deserialize)]
struct SuccessQuery {
    session_id: Option<String>,
}

/// Where Stripe sends the user after paying.
#[get("/success")]
pub async fn get_success(query: web::Query<SuccessQuery>) -> HttpResponse {
    let reference = match &query.session_id {
        Some(session_id) => format!(
            "<p>Reference: <code>{}</code></p>",
            escape_html(session_id)
        ),
        None => String::new(),
    };
    let body = format!(
        r#"<div class="container" style="text-align: center;">
<h1>Subscription successful!</h1>
<p>Your subscription has been activated.</p>
{}
<a class="button" href="/">Back to home</a>
</div>"#,
        reference
    );
    Success::html(layout("Subscription successful", &body))
}

/// Where Stripe sends the user after abandoning the checkout.
#[get("/cancel")]
pub async fn get_cancel() -> HttpResponse {
    let body = r#"<div class="container" style="text-align: center;">
<h1>Subscription cancelled</h1>
<p>No payment was processed.</p>
<p>You can try again whenever you want.</p>
<a class="button" href="/">Back to home</a>
</div>"#;
    Success::html(layout("Subscription cancelled", body))
}
