use anyhow::Result;
use async_trait::async_trait;
use server_api::{create_person, delete_person, list_persons, ApiContext};
use shared::{
    domain::{Contact, ContactId, NewContact},
    error::{ApiError, ErrorCode},
};
use storage::Storage;

use crate::directory::{DirectoryClient, DirectoryError};

/// Offline directory: applies the backend's rules against a local SQLite
/// store, so identifiers are assigned on this machine.
#[derive(Clone)]
pub struct LocalDirectory {
    api: ApiContext,
}

impl LocalDirectory {
    pub fn new(storage: Storage) -> Self {
        Self {
            api: ApiContext { storage },
        }
    }

    pub async fn open(database_url: &str) -> Result<Self> {
        Ok(Self::new(Storage::new(database_url).await?))
    }
}

fn directory_error(err: ApiError, id: Option<&ContactId>) -> DirectoryError {
    match (err.code, id) {
        (ErrorCode::NotFound, Some(id)) => DirectoryError::NotFound(id.clone()),
        (ErrorCode::Validation | ErrorCode::Malformed, _) => {
            DirectoryError::RemoteValidation(err.message)
        }
        (ErrorCode::NotFound, None) => DirectoryError::Unexpected {
            status: 404,
            message: err.message,
        },
        (ErrorCode::Internal, _) => DirectoryError::Unexpected {
            status: 500,
            message: err.message,
        },
    }
}

#[async_trait]
impl DirectoryClient for LocalDirectory {
    async fn fetch_all(&self) -> Result<Vec<Contact>, DirectoryError> {
        list_persons(&self.api)
            .await
            .map_err(|e| directory_error(e, None))
    }

    async fn create(&self, candidate: &NewContact) -> Result<Contact, DirectoryError> {
        create_person(&self.api, candidate.clone())
            .await
            .map_err(|e| directory_error(e, None))
    }

    async fn remove(&self, id: &ContactId) -> Result<(), DirectoryError> {
        delete_person(&self.api, id)
            .await
            .map_err(|e| directory_error(e, Some(id)))
    }
}
