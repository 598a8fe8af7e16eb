use super::domain::ContactRecord;

/// Storage abstraction for accepted inquiries so the intake service can be
/// exercised without a database. Records are stored before notification is
/// attempted; a storage failure therefore fails the whole submission.
pub trait InquiryRepository: Send + Sync {
    fn insert(&self, record: ContactRecord) -> Result<(), RepositoryError>;
    fn list(&self) -> Result<Vec<ContactRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
