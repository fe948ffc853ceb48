use super::models::Person;
use std::collections::HashMap;
use tracing::debug;

/// Email to phone number lookup built from the user's contacts
#[derive(Debug, Clone, Default)]
pub struct ContactDirectory {
    phones: HashMap<String, String>,
}

impl ContactDirectory {
    /// Build the directory from raw connection records.
    ///
    /// Only the first email and the first phone of each person are used, and
    /// people missing either are left out. When two people share an email the
    /// later one wins.
    pub fn build<'a, I>(connections: I, country_prefix: &str) -> Self
    where
        I: IntoIterator<Item = &'a Person>,
    {
        let mut phones = HashMap::new();
        for person in connections {
            let (Some(email), Some(phone)) = (person.first_email(), person.first_phone()) else {
                debug!("Skipping contact {} without email or phone", person.resource_name);
                continue;
            };
            phones.insert(email.to_string(), normalize_phone(phone, country_prefix));
        }
        Self { phones }
    }

    /// Phone number of the contact with the given email
    pub fn phone_for(&self, email: &str) -> Option<&str> {
        self.phones.get(email).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.phones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }
}

/// Remove every whitespace character and make sure the number carries the country prefix
pub fn normalize_phone(raw: &str, country_prefix: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.starts_with(country_prefix) {
        compact
    } else {
        format!("{}{}", country_prefix, compact)
    }
}
