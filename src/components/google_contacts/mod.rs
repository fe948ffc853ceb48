pub mod client;
pub mod directory;
pub mod models;

pub use client::{ContactsProvider, GoogleContactsClient, CONTACT_FIELDS, OWN_CONNECTIONS};
pub use directory::{normalize_phone, ContactDirectory};
pub use models::Person;
