use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{Contact, ContactId, NewContact},
    error::ApiError,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::directory::{DirectoryClient, DirectoryError};

pub const DEFAULT_BASE_PATH: &str = "/api/persons";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `DirectoryClient` over the REST collection at `{server_url}{base_path}`.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    http: Client,
    persons_url: Url,
}

impl HttpDirectoryClient {
    pub fn new(server_url: &str, base_path: &str) -> Result<Self> {
        Self::with_timeout(server_url, base_path, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server_url: &str, base_path: &str, timeout: Duration) -> Result<Self> {
        let persons_url = persons_url(server_url, base_path)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, persons_url })
    }

    pub fn persons_url(&self) -> &Url {
        &self.persons_url
    }

    fn item_url(&self, id: &ContactId) -> Result<Url, DirectoryError> {
        let mut url = self.persons_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DirectoryError::Network(format!("cannot address {id} under {}", self.persons_url))
            })?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }
}

fn persons_url(server_url: &str, base_path: &str) -> Result<Url> {
    let base = Url::parse(server_url.trim())
        .with_context(|| format!("invalid server url '{server_url}'"))?;
    if base.cannot_be_a_base() {
        return Err(anyhow!("server url '{server_url}' cannot be used as a base"));
    }
    base.join(base_path.trim())
        .with_context(|| format!("invalid base path '{base_path}'"))
}

/// Pulls the `{error}` message out of a failed response, falling back to the
/// raw body or the status reason.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
        return api_error.message;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn fetch_all(&self) -> Result<Vec<Contact>, DirectoryError> {
        let response = self.http.get(self.persons_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            warn!(status = status.as_u16(), %message, "directory: fetch_all rejected");
            return Err(DirectoryError::Unexpected {
                status: status.as_u16(),
                message,
            });
        }
        let contacts: Vec<Contact> = response.json().await?;
        debug!(count = contacts.len(), "directory: fetched contacts");
        Ok(contacts)
    }

    async fn create(&self, candidate: &NewContact) -> Result<Contact, DirectoryError> {
        let response = self
            .http
            .post(self.persons_url.clone())
            .json(candidate)
            .send()
            .await?;
        let status = response.status();
        if status.is_client_error() {
            let message = error_message(response).await;
            info!(status = status.as_u16(), %message, "directory: create rejected by server");
            return Err(DirectoryError::RemoteValidation(message));
        }
        if !status.is_success() {
            let message = error_message(response).await;
            warn!(status = status.as_u16(), %message, "directory: create failed");
            return Err(DirectoryError::Unexpected {
                status: status.as_u16(),
                message,
            });
        }
        let contact: Contact = response.json().await?;
        info!(contact_id = %contact.id, "directory: contact created");
        Ok(contact)
    }

    async fn remove(&self, id: &ContactId) -> Result<(), DirectoryError> {
        let url = self.item_url(id)?;
        let response = self.http.delete(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            info!(contact_id = %id, "directory: contact already removed on server");
            return Err(DirectoryError::NotFound(id.clone()));
        }
        if !status.is_success() {
            let message = error_message(response).await;
            warn!(contact_id = %id, status = status.as_u16(), %message, "directory: remove failed");
            return Err(DirectoryError::Unexpected {
                status: status.as_u16(),
                message,
            });
        }
        info!(contact_id = %id, "directory: contact removed");
        Ok(())
    }
}
