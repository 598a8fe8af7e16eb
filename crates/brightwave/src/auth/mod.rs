//! Session-token guard for the admin surface.
//!
//! The admin endpoints sit behind an explicit middleware stage instead of
//! per-handler wrapping: `require_session` checks a bearer token against the
//! shared [`SessionStore`] before the inner handler runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::config::AdminConfig;
use crate::intake::{InquiryRepository, RepositoryError};

/// Mutex-guarded map of active session tokens to their expiry instants.
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Instant>>,
}

static TOKEN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn mint_token() -> String {
    // Process-wide counter guarantees uniqueness; clock nanos vary the shape.
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos())
        .unwrap_or(0);
    let seq = TOKEN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("bw-{seq:08x}-{nanos:08x}")
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a fresh token valid for the configured TTL. Expired entries are
    /// purged on the way in, so abandoned tokens do not accumulate across the
    /// process lifetime.
    pub fn open_session(&self) -> String {
        let token = mint_token();
        let now = Instant::now();
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        sessions.retain(|_, expiry| *expiry > now);
        sessions.insert(token.clone(), now + self.ttl);
        token
    }

    /// Drop every session whose expiry has passed at `now`.
    pub fn sweep(&self, now: Instant) {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        sessions.retain(|_, expiry| *expiry > now);
    }

    /// Whether `token` names a live session at `now`. Expired entries are
    /// dropped on the way out.
    pub fn is_active(&self, token: &str, now: Instant) -> bool {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        match sessions.get(token) {
            Some(expiry) if *expiry > now => true,
            Some(_) => {
                sessions.remove(token);
                false
            }
            None => false,
        }
    }

    pub fn close_session(&self, token: &str) {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        sessions.remove(token);
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .len()
    }
}

/// Shared state for the admin surface.
pub struct AdminGate {
    config: AdminConfig,
    pub sessions: SessionStore,
}

impl AdminGate {
    pub fn new(config: AdminConfig) -> Self {
        let sessions = SessionStore::new(config.session_ttl);
        Self { config, sessions }
    }

    fn login_enabled(&self) -> bool {
        self.config.password.is_some()
    }

    fn password_matches(&self, candidate: &str) -> bool {
        self.config
            .password
            .as_deref()
            .is_some_and(|expected| expected == candidate)
    }
}

/// Middleware guard: admit the request only when it carries a live session
/// token in `Authorization: Bearer <token>`.
pub async fn require_session(
    State(gate): State<Arc<AdminGate>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if gate.sessions.is_active(token, Instant::now()) => {
            Ok(next.run(request).await)
        }
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    password: String,
}

/// Admin router: login plus a guarded inquiry listing.
pub fn admin_router<R>(gate: Arc<AdminGate>, repository: Arc<R>) -> Router
where
    R: InquiryRepository + 'static,
{
    let guarded = Router::new()
        .route("/api/admin/inquiries", get(list_inquiries_handler::<R>))
        .with_state(repository)
        .route_layer(axum::middleware::from_fn_with_state(
            gate.clone(),
            require_session,
        ));

    Router::new()
        .route("/api/admin/login", post(login_handler))
        .with_state(gate)
        .merge(guarded)
}

pub(crate) async fn login_handler(
    State(gate): State<Arc<AdminGate>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response {
    if !gate.login_enabled() {
        let body = json!({ "success": false, "message": "Admin login is disabled." });
        return (StatusCode::SERVICE_UNAVAILABLE, axum::Json(body)).into_response();
    }

    if !gate.password_matches(&request.password) {
        let body = json!({ "success": false, "message": "Invalid credentials." });
        return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
    }

    let token = gate.sessions.open_session();
    info!("admin session opened");
    let body = json!({ "success": true, "token": token });
    (StatusCode::OK, axum::Json(body)).into_response()
}

pub(crate) async fn list_inquiries_handler<R>(State(repository): State<Arc<R>>) -> Response
where
    R: InquiryRepository + 'static,
{
    match repository.list() {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(RepositoryError::Unavailable(detail)) => {
            tracing::error!(error = %detail, "inquiry listing failed");
            let body = json!({ "success": false, "message": "Storage unavailable." });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_expire_after_ttl() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.open_session();
        let now = Instant::now();

        assert!(store.is_active(&token, now));
        assert!(!store.is_active(&token, now + Duration::from_secs(120)));
        // Expired token was dropped, so it stays invalid even at earlier times.
        assert!(!store.is_active(&token, now));
    }

    #[test]
    fn closed_sessions_are_invalid() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.open_session();
        store.close_session(&token);
        assert!(!store.is_active(&token, Instant::now()));
    }

    #[test]
    fn sweep_purges_expired_sessions() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.open_session();
        assert_eq!(store.session_count(), 1);

        store.sweep(Instant::now() + Duration::from_secs(120));
        assert_eq!(store.session_count(), 0);
        assert!(!store.is_active(&token, Instant::now()));
    }

    #[test]
    fn opening_a_session_purges_expired_ones() {
        let store = SessionStore::new(Duration::from_millis(0));
        // Zero TTL: each token is already expired when the next one is minted.
        store.open_session();
        store.open_session();
        store.open_session();
        assert!(store.session_count() <= 1);
    }

    #[test]
    fn tokens_are_unique() {
        let store = SessionStore::new(Duration::from_secs(60));
        let first = store.open_session();
        let second = store.open_session();
        assert_ne!(first, second);
    }

    #[test]
    fn gate_rejects_wrong_password() {
        let gate = AdminGate::new(AdminConfig {
            password: Some("hunter2".to_string()),
            session_ttl: Duration::from_secs(60),
        });
        assert!(gate.password_matches("hunter2"));
        assert!(!gate.password_matches("hunter3"));

        let disabled = AdminGate::new(AdminConfig {
            password: None,
            session_ttl: Duration::from_secs(60),
        });
        assert!(!disabled.login_enabled());
        assert!(!disabled.password_matches("hunter2"));
    }
}
