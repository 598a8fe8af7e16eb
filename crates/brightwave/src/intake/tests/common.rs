use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::intake::domain::{ContactPayload, ContactRecord};
use crate::intake::mailer::{ContactMailer, MailerError};
use crate::intake::rate::RatePolicy;
use crate::intake::repository::{InquiryRepository, RepositoryError};
use crate::intake::service::ContactIntakeService;
use crate::intake::validate::SubmissionPolicy;

pub(super) fn payload() -> ContactPayload {
    ContactPayload {
        name: Some("Adaeze Obi".to_string()),
        email: Some("adaeze@example.com".to_string()),
        phone: Some("+2348012345678".to_string()),
        message: Some("Do you have rooms free in October?".to_string()),
        subject: None,
        form_origin: Some("contact".to_string()),
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<ContactRecord>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self) -> Vec<ContactRecord> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl InquiryRepository for MemoryRepository {
    fn insert(&self, record: ContactRecord) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .push(record);
        Ok(())
    }

    fn list(&self) -> Result<Vec<ContactRecord>, RepositoryError> {
        Ok(self.stored())
    }
}

pub(super) struct UnavailableRepository;

impl InquiryRepository for UnavailableRepository {
    fn insert(&self, _record: ContactRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    fn list(&self) -> Result<Vec<ContactRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }
}

/// Mailer double recording deliveries; either leg can be made to fail.
#[derive(Default)]
pub(super) struct RecordingMailer {
    pub(super) fail_staff: bool,
    pub(super) fail_confirmation: bool,
    pub(super) staff: Mutex<Vec<ContactRecord>>,
    pub(super) confirmations: Mutex<Vec<ContactRecord>>,
}

impl RecordingMailer {
    pub(super) fn staff_deliveries(&self) -> Vec<ContactRecord> {
        self.staff.lock().expect("mailer mutex poisoned").clone()
    }

    pub(super) fn confirmation_deliveries(&self) -> Vec<ContactRecord> {
        self.confirmations
            .lock()
            .expect("mailer mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl ContactMailer for RecordingMailer {
    async fn notify_staff(&self, record: &ContactRecord) -> Result<(), MailerError> {
        if self.fail_staff {
            return Err(MailerError::Transport("550 relay refused".to_string()));
        }
        self.staff
            .lock()
            .expect("mailer mutex poisoned")
            .push(record.clone());
        Ok(())
    }

    async fn send_confirmation(&self, record: &ContactRecord) -> Result<(), MailerError> {
        if self.fail_confirmation {
            return Err(MailerError::Transport("mailbox unavailable".to_string()));
        }
        self.confirmations
            .lock()
            .expect("mailer mutex poisoned")
            .push(record.clone());
        Ok(())
    }
}

pub(super) fn strict_policy() -> SubmissionPolicy {
    SubmissionPolicy {
        max_body_bytes: 1024,
        require_phone: true,
    }
}

pub(super) fn contact_rate_policy(limit: u32) -> RatePolicy {
    RatePolicy::new(limit, Duration::from_secs(60))
}

pub(super) fn build_service(
    mailer: RecordingMailer,
    recipients_configured: bool,
) -> (
    Arc<ContactIntakeService<RecordingMailer, MemoryRepository>>,
    Arc<RecordingMailer>,
    Arc<MemoryRepository>,
) {
    let mailer = Arc::new(mailer);
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(ContactIntakeService::new(
        contact_rate_policy(3),
        strict_policy(),
        recipients_configured,
        Arc::clone(&mailer),
        Arc::clone(&repository),
    ));
    (service, mailer, repository)
}
