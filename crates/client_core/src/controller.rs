//! Contact list state machine: cached directory, pending form fields, filter
//! and the current notification.
//!
//! Every flow catches its own failures and turns them into a notification;
//! the returned outcome only reports what happened.

use std::{str::FromStr, time::Duration};

use shared::{
    domain::{Contact, ContactId, NewContact},
    rules::{check_name_length, check_name_unique, LocalValidationError},
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    directory::{DirectoryClient, DirectoryError},
    filter::filter_contacts,
    notification::{Notification, NotificationKind, NotificationSlot, NOTIFICATION_TTL},
};

/// Where add-flow validation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Check length and duplicates before calling the backend.
    #[default]
    Local,
    /// Send every candidate and rely on the backend's error message.
    RemoteOnly,
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" | "remote-only" | "remote_only" => Ok(Self::RemoteOnly),
            other => Err(format!(
                "unknown validation policy '{other}' (expected 'local' or 'remote-only')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub validation: ValidationPolicy,
    pub notification_ttl: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            validation: ValidationPolicy::default(),
            notification_ttl: NOTIFICATION_TTL,
        }
    }
}

/// Blocking yes/no question asked before a delete is sent.
pub trait ConfirmationGate {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> ConfirmationGate for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Failed(DirectoryError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(Contact),
    RejectedLocally(LocalValidationError),
    RejectedRemotely(DirectoryError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Contact),
    /// The remote call failed; the entry was dropped locally anyway.
    Reconciled {
        contact: Contact,
        error: DirectoryError,
    },
    Declined,
    UnknownContact(ContactId),
}

pub struct ContactListController<D> {
    directory: D,
    contacts: Vec<Contact>,
    new_name: String,
    new_number: String,
    filter: String,
    notifications: NotificationSlot,
    validation: ValidationPolicy,
}

impl<D: DirectoryClient> ContactListController<D> {
    pub fn new(directory: D) -> Self {
        Self::with_options(directory, ControllerOptions::default())
    }

    pub fn with_options(directory: D, options: ControllerOptions) -> Self {
        Self {
            directory,
            contacts: Vec::new(),
            new_name: String::new(),
            new_number: String::new(),
            filter: String::new(),
            notifications: NotificationSlot::new(options.notification_ttl),
            validation: options.validation,
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn find_contact(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| &c.id == id)
    }

    pub fn visible_contacts(&self) -> Vec<&Contact> {
        filter_contacts(&self.contacts, &self.filter)
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    pub fn set_new_name(&mut self, name: impl Into<String>) {
        self.new_name = name.into();
    }

    pub fn new_number(&self) -> &str {
        &self.new_number
    }

    pub fn set_new_number(&mut self, number: impl Into<String>) {
        self.new_number = number.into();
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current(Instant::now())
    }

    pub fn clear_expired_notification(&mut self) -> bool {
        self.notifications.clear_expired(Instant::now())
    }

    /// Replaces the cached directory with the backend's list.
    pub async fn load(&mut self) -> LoadOutcome {
        match self.directory.fetch_all().await {
            Ok(contacts) => {
                let count = contacts.len();
                self.contacts = contacts;
                info!(count, "controller: directory loaded");
                LoadOutcome::Loaded(count)
            }
            Err(error) => {
                warn!(%error, "controller: directory load failed");
                self.notify(
                    NotificationKind::Error,
                    format!("Failed to load phonebook: {error}"),
                );
                LoadOutcome::Failed(error)
            }
        }
    }

    /// Adds the contact described by the pending name and number fields.
    pub async fn submit(&mut self) -> AddOutcome {
        let candidate = NewContact::new(self.new_name.clone(), self.new_number.clone());
        self.add_contact(candidate).await
    }

    pub async fn add_contact(&mut self, candidate: NewContact) -> AddOutcome {
        if self.validation == ValidationPolicy::Local {
            if let Err(rejection) = self.validate_locally(&candidate) {
                debug!(name = %candidate.name, %rejection, "controller: candidate rejected locally");
                self.notify(NotificationKind::Error, rejection.to_string());
                return AddOutcome::RejectedLocally(rejection);
            }
        }

        match self.directory.create(&candidate).await {
            Ok(contact) => {
                info!(contact_id = %contact.id, "controller: contact added");
                self.notify(NotificationKind::Success, format!("Added {}", contact.name));
                self.contacts.push(contact.clone());
                self.new_name.clear();
                self.new_number.clear();
                AddOutcome::Added(contact)
            }
            Err(error) => {
                warn!(name = %candidate.name, %error, "controller: create failed");
                let message = match &error {
                    DirectoryError::RemoteValidation(message) => message.clone(),
                    other => format!("Failed to add {}: {other}", candidate.name),
                };
                self.notify(NotificationKind::Error, message);
                AddOutcome::RejectedRemotely(error)
            }
        }
    }

    /// Two phases: ask the backend to delete, then drop the entry locally
    /// whichever way the call went. Both paths end with the id absent.
    pub async fn delete_contact<G>(&mut self, id: &ContactId, gate: &mut G) -> DeleteOutcome
    where
        G: ConfirmationGate + ?Sized,
    {
        let Some(contact) = self.find_contact(id).cloned() else {
            debug!(contact_id = %id, "controller: delete requested for unknown contact");
            return DeleteOutcome::UnknownContact(id.clone());
        };

        if !gate.confirm(&format!("Delete {}?", contact.name)) {
            debug!(contact_id = %id, "controller: delete declined");
            return DeleteOutcome::Declined;
        }

        let result = self.directory.remove(id).await;
        self.contacts.retain(|c| &c.id != id);

        match result {
            Ok(()) => {
                info!(contact_id = %id, "controller: contact deleted");
                self.notify(
                    NotificationKind::Success,
                    format!("Deleted {}", contact.name),
                );
                DeleteOutcome::Deleted(contact)
            }
            Err(error) => {
                warn!(contact_id = %id, %error, "controller: delete failed, dropped locally");
                let message = match &error {
                    DirectoryError::NotFound(_) => format!(
                        "Information of {} has already been removed from server",
                        contact.name
                    ),
                    other => format!("Could not confirm deletion of {}: {other}", contact.name),
                };
                self.notify(NotificationKind::Error, message);
                DeleteOutcome::Reconciled { contact, error }
            }
        }
    }

    fn validate_locally(&self, candidate: &NewContact) -> Result<(), LocalValidationError> {
        check_name_length(&candidate.name)?;
        check_name_unique(&candidate.name, &self.contacts)
    }

    fn notify(&mut self, kind: NotificationKind, message: String) {
        self.notifications.post(kind, message, Instant::now());
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
