use chrono::Utc;

use super::domain::{ContactPayload, ContactRecord};
use super::service::AdmissionError;

/// Shape requirements for a contact submission.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionPolicy {
    pub max_body_bytes: u64,
    pub require_phone: bool,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024,
            require_phone: true,
        }
    }
}

/// Reject bodies whose declared length exceeds the cap. Runs before any
/// field inspection so oversized payloads are refused regardless of content.
pub(crate) fn check_declared_size(
    declared_len: Option<u64>,
    policy: &SubmissionPolicy,
) -> Result<(), AdmissionError> {
    match declared_len {
        Some(len) if len > policy.max_body_bytes => Err(AdmissionError::PayloadTooLarge {
            limit: policy.max_body_bytes,
        }),
        _ => Ok(()),
    }
}

/// Validate field presence and formats, producing the normalized record.
///
/// Checks short-circuit in a fixed order: required fields, email format,
/// phone format. Pure apart from stamping `received_at`.
pub(crate) fn validate_fields(
    payload: &ContactPayload,
    policy: &SubmissionPolicy,
) -> Result<ContactRecord, AdmissionError> {
    let name = trimmed(&payload.name);
    let email = trimmed(&payload.email);
    let phone = trimmed(&payload.phone);
    let message = trimmed(&payload.message);

    let mut missing = Vec::new();
    if name.is_none() {
        missing.push("name");
    }
    if email.is_none() {
        missing.push("email");
    }
    if policy.require_phone && phone.is_none() {
        missing.push("phone");
    }
    if message.is_none() {
        missing.push("message");
    }
    if !missing.is_empty() {
        return Err(AdmissionError::MissingFields(missing));
    }

    let email = email.expect("presence checked above");
    if !email_format_ok(&email) {
        return Err(AdmissionError::InvalidEmail);
    }

    if policy.require_phone {
        let candidate = phone.as_deref().expect("presence checked above");
        if !phone_format_ok(candidate) {
            return Err(AdmissionError::InvalidPhone);
        }
    }

    Ok(ContactRecord {
        name: name.expect("presence checked above"),
        email,
        phone,
        message: message.expect("presence checked above"),
        subject: trimmed(&payload.subject),
        form_origin: trimmed(&payload.form_origin),
        received_at: Utc::now(),
    })
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Accepts `local@domain` where the local part is a run of non-whitespace,
/// non-`@` characters, the domain has at least two non-empty dot-separated
/// labels, and the final label is 2-4 ASCII letters.
pub(crate) fn email_format_ok(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.chars().any(|c| c.is_whitespace() || c == '@') {
        return false;
    }
    if domain.contains('@') || domain.chars().any(char::is_whitespace) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return false;
    }

    let tld = labels[labels.len() - 1];
    (2..=4).contains(&tld.len()) && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Accepts an optional leading `+` followed by 10-15 ASCII digits.
pub(crate) fn phone_format_ok(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
