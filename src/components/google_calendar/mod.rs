pub mod client;
pub mod models;
pub mod time;
pub mod token;

pub use client::{CalendarProvider, EventQuery, GoogleCalendarClient, OrderBy, SendUpdates};
pub use models::{Attendee, CalendarEvent, EventTime};
pub use token::{CredentialProvider, StoredToken, TokenManager};
