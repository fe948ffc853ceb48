mod dispatcher;

pub use dispatcher::{DispatchOutcome, SmsDispatcher, SmsSender, API_KEY_HEADER, MESSAGES_PATH};
