use serde::{Deserialize, Serialize};

/// Connection record from the People v1 API, reduced to the fields we request
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub resource_name: String,
    #[serde(default)]
    pub email_addresses: Vec<FieldValue>,
    #[serde(default)]
    pub phone_numbers: Vec<FieldValue>,
}

/// A single email address or phone number entry
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FieldValue {
    #[serde(default)]
    pub value: String,
}

impl Person {
    /// First listed email address, if non-empty
    pub fn first_email(&self) -> Option<&str> {
        first_value(&self.email_addresses)
    }

    /// First listed phone number, if non-empty
    pub fn first_phone(&self) -> Option<&str> {
        first_value(&self.phone_numbers)
    }
}

fn first_value(values: &[FieldValue]) -> Option<&str> {
    values
        .first()
        .map(|v| v.value.as_str())
        .filter(|v| !v.trim().is_empty())
}

/// One page of a connections listing
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsPage {
    #[serde(default)]
    pub connections: Vec<Person>,
    pub next_page_token: Option<String>,
}
