use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::json;
use tracing::error;

use super::mailer::ContactMailer;
use super::repository::InquiryRepository;
use super::service::ContactIntakeService;

/// Router builder exposing the contact submission endpoint.
pub fn contact_router<M, R>(service: Arc<ContactIntakeService<M, R>>) -> Router
where
    M: ContactMailer + 'static,
    R: InquiryRepository + 'static,
{
    Router::new()
        .route("/api/contact", post(contact_handler::<M, R>))
        .with_state(service)
}

// The body is taken raw so the rate and size checks run before any JSON
// parsing; a malformed body must not bypass admission.
pub(crate) async fn contact_handler<M, R>(
    State(service): State<Arc<ContactIntakeService<M, R>>>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    body: Bytes,
) -> Response
where
    M: ContactMailer + 'static,
    R: InquiryRepository + 'static,
{
    let client_id = client_identifier(&headers, connect_info.as_deref());
    let declared_len = declared_length(&headers);

    match service.submit_raw(&client_id, declared_len, &body).await {
        Ok(ack) => (StatusCode::OK, axum::Json(ack)).into_response(),
        Err(err) => {
            if err.status().is_server_error() {
                error!(client = %client_id, error = %err, "contact submission failed");
            }
            let body = json!({
                "success": false,
                "message": err.client_message(),
            });
            (err.status(), axum::Json(body)).into_response()
        }
    }
}

/// Client key for rate limiting: first hop of `X-Forwarded-For` when present
/// (the service sits behind a proxy in production), else the peer address.
fn client_identifier(headers: &HeaderMap, connect_info: Option<&SocketAddr>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first_hop) = forwarded.split(',').next() {
            let first_hop = first_hop.trim();
            if !first_hop.is_empty() {
                return first_hop.to_string();
            }
        }
    }

    match connect_info {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}
