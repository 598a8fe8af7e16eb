use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Loosely-typed contact form body as received from the site frontends.
///
/// Field names drifted across frontend revisions (`fullName` vs `name`,
/// `formOrigin` vs `form_origin`), so aliases accept both spellings. Every
/// field is optional at the serde level; the validation pass decides which
/// absences are errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPayload {
    #[serde(default, alias = "fullName", alias = "full_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default, alias = "formOrigin")]
    pub form_origin: Option<String>,
}

/// A submission after trimming and format validation, ready for hand-off to
/// the persistence and notification collaborators. Transient: the intake
/// pipeline passes it by value and retains nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub subject: Option<String>,
    pub form_origin: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl ContactRecord {
    /// Subject line used when no explicit subject was submitted.
    pub fn subject_line(&self) -> String {
        match &self.subject {
            Some(subject) => subject.clone(),
            None => "New Contact Form Submission - BrightWave Enterprises".to_string(),
        }
    }
}
