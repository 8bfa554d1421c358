//! Phonebook client core: the remote directory seam and the controller that
//! keeps a cached contact list in step with it.

pub mod controller;
pub mod directory;
pub mod filter;
pub mod http;
pub mod local;
pub mod notification;

pub use controller::{
    AddOutcome, ConfirmationGate, ContactListController, ControllerOptions, DeleteOutcome,
    LoadOutcome, ValidationPolicy,
};
pub use directory::{DirectoryClient, DirectoryError};
pub use filter::filter_contacts;
pub use http::{HttpDirectoryClient, DEFAULT_BASE_PATH, DEFAULT_REQUEST_TIMEOUT};
pub use local::LocalDirectory;
pub use notification::{Notification, NotificationKind, NotificationSlot, NOTIFICATION_TTL};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
