use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use serde::Serialize;
use tracing::{error, warn};

use super::domain::ContactPayload;
use super::mailer::{ContactMailer, MailerError};
use super::rate::{RatePolicy, RateTracker};
use super::repository::{InquiryRepository, RepositoryError};
use super::validate::{check_declared_size, validate_fields, SubmissionPolicy};

/// Service composing the rate tracker, validator, and outbound collaborators.
///
/// One instance is shared across request handlers; the tracker inside it is
/// the only mutable state.
pub struct ContactIntakeService<M, R> {
    tracker: RateTracker,
    policy: SubmissionPolicy,
    recipients_configured: bool,
    mailer: Arc<M>,
    repository: Arc<R>,
}

/// Body returned to the caller on success.
#[derive(Debug, Clone, Serialize)]
pub struct Acknowledgment {
    pub success: bool,
    pub message: String,
}

impl Acknowledgment {
    fn received() -> Self {
        Self {
            success: true,
            message: "Thank you! Your message has been received.".to_string(),
        }
    }
}

impl<M, R> ContactIntakeService<M, R>
where
    M: ContactMailer + 'static,
    R: InquiryRepository + 'static,
{
    pub fn new(
        rate_policy: RatePolicy,
        policy: SubmissionPolicy,
        recipients_configured: bool,
        mailer: Arc<M>,
        repository: Arc<R>,
    ) -> Self {
        Self {
            tracker: RateTracker::new(rate_policy),
            policy,
            recipients_configured,
            mailer,
            repository,
        }
    }

    /// Run the full admission pipeline on a raw request body.
    ///
    /// Order is fixed: rate check, size check, body parse, field validation,
    /// recipient configuration check, persistence, staff notification,
    /// confirmation. The rate and size checks run before any parsing, so a
    /// malformed or oversized body still burns a rate-limit slot and the size
    /// verdict does not depend on the body being readable JSON.
    pub async fn submit_raw(
        &self,
        client_id: &str,
        declared_len: Option<u64>,
        body: &[u8],
    ) -> Result<Acknowledgment, AdmissionError> {
        if !self.tracker.check(client_id, Instant::now()) {
            return Err(AdmissionError::RateLimited);
        }

        // The declared length is a hint; a body that arrives larger than it
        // claims is judged by what actually arrived.
        let observed = body.len() as u64;
        let effective = declared_len.map_or(observed, |len| len.max(observed));
        check_declared_size(Some(effective), &self.policy)?;

        let payload: ContactPayload =
            serde_json::from_slice(body).map_err(|_| AdmissionError::MalformedBody)?;
        self.dispatch(client_id, payload).await
    }

    /// Typed variant of [`Self::submit_raw`] for callers that already hold a
    /// deserialized payload (the demo CLI, tests).
    pub async fn submit(
        &self,
        client_id: &str,
        declared_len: Option<u64>,
        payload: ContactPayload,
    ) -> Result<Acknowledgment, AdmissionError> {
        if !self.tracker.check(client_id, Instant::now()) {
            return Err(AdmissionError::RateLimited);
        }

        check_declared_size(declared_len, &self.policy)?;
        self.dispatch(client_id, payload).await
    }

    /// Post-admission stages: validation, configuration check, and hand-off.
    /// A confirmation failure is logged and swallowed; the submission was
    /// already durably accepted at that point.
    async fn dispatch(
        &self,
        client_id: &str,
        payload: ContactPayload,
    ) -> Result<Acknowledgment, AdmissionError> {
        let record = validate_fields(&payload, &self.policy)?;

        if !self.recipients_configured {
            error!(client = client_id, "contact submission rejected: no notification recipients configured");
            return Err(AdmissionError::ServerMisconfigured);
        }

        self.repository.insert(record.clone())?;
        self.mailer.notify_staff(&record).await?;

        if let Err(err) = self.mailer.send_confirmation(&record).await {
            warn!(email = %record.email, error = %err, "confirmation email failed; submission already accepted");
        }

        Ok(Acknowledgment::received())
    }
}

/// Everything that can stop a submission short of acceptance.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("too many requests from this address, try again later")]
    RateLimited,
    #[error("payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },
    #[error("request body is not valid JSON")]
    MalformedBody,
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("phone number is not valid")]
    InvalidPhone,
    #[error("service is not configured to deliver messages")]
    ServerMisconfigured,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] MailerError),
}

impl AdmissionError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdmissionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AdmissionError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AdmissionError::MalformedBody
            | AdmissionError::MissingFields(_)
            | AdmissionError::InvalidEmail
            | AdmissionError::InvalidPhone => StatusCode::BAD_REQUEST,
            AdmissionError::ServerMisconfigured
            | AdmissionError::Repository(_)
            | AdmissionError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to the caller. Server-side faults collapse to a
    /// generic line; transport and storage detail stays in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AdmissionError::RateLimited => {
                "Too many requests. Please try again in a minute.".to_string()
            }
            AdmissionError::PayloadTooLarge { limit } => {
                format!("Message too large. Please keep it under {limit} bytes.")
            }
            AdmissionError::MalformedBody => {
                "Request body must be valid JSON.".to_string()
            }
            AdmissionError::MissingFields(fields) => {
                format!("Missing required fields: {}.", fields.join(", "))
            }
            AdmissionError::InvalidEmail => "Please provide a valid email address.".to_string(),
            AdmissionError::InvalidPhone => "Please provide a valid phone number.".to_string(),
            AdmissionError::ServerMisconfigured
            | AdmissionError::Repository(_)
            | AdmissionError::Notification(_) => {
                "Failed to send message. Please try again later.".to_string()
            }
        }
    }
}
