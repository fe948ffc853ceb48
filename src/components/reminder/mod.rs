pub mod composer;
pub mod marker;
pub mod orchestrator;
pub mod policy;

pub use composer::MessageComposer;
pub use marker::{MarkerCodec, PrefixMarker, REMINDED_MARKER};
pub use orchestrator::{
    EventOutcome, ReminderOrchestrator, ReminderReport, RunSettings, RunState, RunSummary,
};
pub use policy::{ReminderPolicy, Rule, Verdict};
