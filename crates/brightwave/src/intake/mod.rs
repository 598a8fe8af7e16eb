//! Contact-form intake: admission control, validation, and hand-off.
//!
//! Every inbound submission passes one linear pipeline: per-address rate
//! check, declared-size check, field and format validation, recipient
//! configuration check, then hand-off to the persistence and notification
//! collaborators. The pipeline is assembled by [`ContactIntakeService`] and
//! exposed over HTTP by [`contact_router`].

pub mod domain;
pub mod mailer;
pub(crate) mod rate;
pub mod repository;
pub mod router;
pub mod service;
pub(crate) mod validate;

#[cfg(test)]
mod tests;

pub use domain::{ContactPayload, ContactRecord};
pub use mailer::{ContactMailer, MailerError, SmtpMailer};
pub use rate::{RatePolicy, RateTracker};
pub use repository::{InquiryRepository, RepositoryError};
pub use router::contact_router;
pub use service::{AdmissionError, Acknowledgment, ContactIntakeService};
pub use validate::SubmissionPolicy;
