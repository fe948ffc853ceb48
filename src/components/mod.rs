// Export components
pub mod google_calendar;
pub mod google_contacts;
pub mod reminder;
pub mod sms;

pub use google_calendar::{CalendarProvider, CredentialProvider, GoogleCalendarClient, TokenManager};
pub use google_contacts::{ContactDirectory, ContactsProvider, GoogleContactsClient};
pub use reminder::ReminderOrchestrator;
pub use sms::{SmsDispatcher, SmsSender};
