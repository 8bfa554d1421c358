//! Remote contact directory seam: the three CRUD calls the controller needs.

use async_trait::async_trait;
use shared::domain::{Contact, ContactId, NewContact};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Server rejected the payload; the message is shown to the user verbatim.
    #[error("{0}")]
    RemoteValidation(String),
    #[error("contact {0} is not present on the server")]
    NotFound(ContactId),
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {status}: {message}")]
    Unexpected { status: u16, message: String },
    #[error("malformed server response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Network(value.to_string())
        }
    }
}

/// Single-shot operations against the contact collection. Implementations
/// do not retry or cache; recovery belongs to the caller.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Contact>, DirectoryError>;
    async fn create(&self, candidate: &NewContact) -> Result<Contact, DirectoryError>;
    async fn remove(&self, id: &ContactId) -> Result<(), DirectoryError>;
}

#[async_trait]
impl<T> DirectoryClient for Box<T>
where
    T: DirectoryClient + ?Sized,
{
    async fn fetch_all(&self) -> Result<Vec<Contact>, DirectoryError> {
        (**self).fetch_all().await
    }

    async fn create(&self, candidate: &NewContact) -> Result<Contact, DirectoryError> {
        (**self).create(candidate).await
    }

    async fn remove(&self, id: &ContactId) -> Result<(), DirectoryError> {
        (**self).remove(id).await
    }
}
