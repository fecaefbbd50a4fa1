//! Contact list grouping.

use serde::Serialize;

use taskboard_proto::Contact;

/// Contacts that share the first letter of their first name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactGroup<'a> {
    /// Uppercase initial the group is headed by.
    pub letter: char,
    /// Contacts sorted by first name, then last name.
    pub contacts: Vec<&'a Contact>,
}

/// Groups contacts alphabetically by the initial of their first name.
///
/// Sorting ignores case. Contacts with a first name that does not start
/// with a letter are grouped under `'#'`, after the letters.
#[must_use]
pub fn group_contacts_by_initial(contacts: &[Contact]) -> Vec<ContactGroup<'_>> {
    let mut sorted: Vec<&Contact> = contacts.iter().collect();
    sorted.sort_by_cached_key(|c| {
        (
            initial(c) == '#',
            c.fields.firstname.to_lowercase(),
            c.fields.lastname.to_lowercase(),
        )
    });

    let mut groups: Vec<ContactGroup<'_>> = Vec::new();
    for contact in sorted {
        let letter = initial(contact);
        match groups.last_mut() {
            Some(group) if group.letter == letter => group.contacts.push(contact),
            _ => groups.push(ContactGroup {
                letter,
                contacts: vec![contact],
            }),
        }
    }
    groups
}

fn initial(contact: &Contact) -> char {
    contact
        .fields
        .firstname
        .chars()
        .next()
        .filter(|c| c.is_alphabetic())
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('#')
}
