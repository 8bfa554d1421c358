use chrono::{DateTime, Utc};
use shared::{
    domain::{Contact, ContactId, NewContact},
    error::{ApiError, ErrorCode},
    rules::{check_name_length, LocalValidationError},
};
use storage::Storage;
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_persons(ctx: &ApiContext) -> Result<Vec<Contact>, ApiError> {
    let contacts = ctx.storage.list_contacts().await.map_err(internal)?;
    Ok(contacts
        .into_iter()
        .map(|stored| stored.into_contact())
        .collect())
}

pub async fn get_person(ctx: &ApiContext, id: &ContactId) -> Result<Contact, ApiError> {
    let contact_id = parse_contact_id(id)?;
    ctx.storage
        .get_contact(contact_id)
        .await
        .map_err(internal)?
        .map(|stored| stored.into_contact())
        .ok_or_else(|| ApiError::not_found(format!("contact {id} not found")))
}

pub async fn create_person(ctx: &ApiContext, candidate: NewContact) -> Result<Contact, ApiError> {
    check_name_length(&candidate.name).map_err(|e| ApiError::validation(e.to_string()))?;
    if candidate.number.trim().is_empty() {
        return Err(ApiError::validation("number missing"));
    }

    let existing = ctx
        .storage
        .find_contact_by_name(&candidate.name)
        .await
        .map_err(internal)?;
    if existing.is_some() {
        return Err(duplicate_name(candidate.name));
    }

    // A concurrent create can still take the name between the check and
    // the insert.
    let Some(stored) = ctx
        .storage
        .insert_contact(&candidate.name, &candidate.number)
        .await
        .map_err(internal)?
    else {
        return Err(duplicate_name(candidate.name));
    };
    info!(contact_id = stored.contact_id, "api: contact created");
    Ok(stored.into_contact())
}

pub async fn delete_person(ctx: &ApiContext, id: &ContactId) -> Result<(), ApiError> {
    let contact_id = parse_contact_id(id)?;
    let removed = ctx
        .storage
        .delete_contact(contact_id)
        .await
        .map_err(internal)?;
    if !removed {
        return Err(ApiError::not_found(format!("contact {id} not found")));
    }
    info!(contact_id, "api: contact deleted");
    Ok(())
}

pub async fn phonebook_info(ctx: &ApiContext, now: DateTime<Utc>) -> Result<String, ApiError> {
    let count = ctx.storage.count_contacts().await.map_err(internal)?;
    Ok(format!(
        "Phonebook has info for {count} people\n{}",
        now.to_rfc2822()
    ))
}

/// Ids that are not integers cannot exist in storage, so they are reported
/// as missing rather than malformed.
fn parse_contact_id(id: &ContactId) -> Result<i64, ApiError> {
    id.as_str()
        .parse::<i64>()
        .map_err(|_| ApiError::new(ErrorCode::NotFound, format!("contact {id} not found")))
}

fn duplicate_name(name: String) -> ApiError {
    ApiError::validation(LocalValidationError::DuplicateName(name).to_string())
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(err.to_string())
}
