use shared::domain::Contact;

/// Case-insensitive substring match on the contact name. An empty query
/// keeps every contact; order is preserved.
pub fn filter_contacts<'a>(contacts: &'a [Contact], query: &str) -> Vec<&'a Contact> {
    if query.is_empty() {
        return contacts.iter().collect();
    }
    let needle = query.to_lowercase();
    contacts
        .iter()
        .filter(|contact| contact.name.to_lowercase().contains(&needle))
        .collect()
}
