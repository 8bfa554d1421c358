//! Contact rules shared by the client's local validation and the backend.

use thiserror::Error;

use crate::domain::Contact;

pub const MIN_NAME_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocalValidationError {
    #[error("Name must be at least 3 characters long")]
    NameTooShort,
    #[error("{0} is already added to phonebook")]
    DuplicateName(String),
}

pub fn check_name_length(name: &str) -> Result<(), LocalValidationError> {
    if name.chars().count() < MIN_NAME_LEN {
        return Err(LocalValidationError::NameTooShort);
    }
    Ok(())
}

/// Names compare exactly; "ada" and "Ada" are different contacts.
pub fn check_name_unique<'a>(
    name: &str,
    existing: impl IntoIterator<Item = &'a Contact>,
) -> Result<(), LocalValidationError> {
    if existing.into_iter().any(|contact| contact.name == name) {
        return Err(LocalValidationError::DuplicateName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContactId;

    fn arto() -> Contact {
        Contact {
            id: ContactId::from(1),
            name: "Arto Hellas".into(),
            number: "040-123456".into(),
        }
    }

    #[test]
    fn rejects_names_shorter_than_three_chars() {
        assert_eq!(
            check_name_length("Al"),
            Err(LocalValidationError::NameTooShort)
        );
        assert!(check_name_length("Ada").is_ok());
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(
            check_name_length("Åö"),
            Err(LocalValidationError::NameTooShort)
        );
    }

    #[test]
    fn duplicate_message_names_the_contact() {
        let err = check_name_unique("Arto Hellas", [&arto()]).expect_err("duplicate");
        assert_eq!(err.to_string(), "Arto Hellas is already added to phonebook");
        assert!(check_name_unique("arto hellas", [&arto()]).is_ok());
    }
}
