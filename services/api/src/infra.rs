use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;

use brightwave::intake::{
    ContactMailer, ContactRecord, InquiryRepository, MailerError, RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local inquiry store. Later deployments swap this for a database
/// adapter; the intake service only sees the trait.
#[derive(Default)]
pub(crate) struct InMemoryInquiryRepository {
    records: Mutex<Vec<ContactRecord>>,
}

impl InquiryRepository for InMemoryInquiryRepository {
    fn insert(&self, record: ContactRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.push(record);
        Ok(())
    }

    fn list(&self) -> Result<Vec<ContactRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
    }
}

/// Mailer that prints deliveries instead of dialing SMTP; used by the demo
/// subcommand so it runs without mail credentials.
#[derive(Default)]
pub(crate) struct ConsoleMailer;

#[async_trait]
impl ContactMailer for ConsoleMailer {
    async fn notify_staff(&self, record: &ContactRecord) -> Result<(), MailerError> {
        println!(
            "[staff notification] {} <{}>: {}",
            record.name, record.email, record.message
        );
        Ok(())
    }

    async fn send_confirmation(&self, record: &ContactRecord) -> Result<(), MailerError> {
        println!("[confirmation] -> {}", record.email);
        Ok(())
    }
}
