use super::marker::{MarkerCodec, PrefixMarker};
use crate::components::google_calendar::models::CalendarEvent;
use crate::config::ReminderRules;
use std::sync::Arc;

/// What a rule decided about an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Remind,
    Skip,
}

/// A single title or description check.
///
/// Rules are evaluated in order and the first one that returns a verdict wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Title equals the test title: always remind
    SentinelMatch(String),
    /// Description already carries the reminder marker: skip
    AlreadyMarkedMatch,
    /// Title equals one of the listed titles: remind
    ExactTitleMatch(Vec<String>),
    /// Title contains one of the needles: remind.
    /// Case-insensitive matching compares against the uppercased title, so
    /// needles are expected in uppercase.
    SubstringMatch {
        needles: Vec<String>,
        case_insensitive: bool,
    },
}

impl Rule {
    /// Apply the rule, `None` when it does not apply
    pub fn evaluate(&self, event: &CalendarEvent, marker: &dyn MarkerCodec) -> Option<Verdict> {
        let title = event.summary.as_str();
        let matched = match self {
            Rule::SentinelMatch(sentinel) => title == sentinel,
            Rule::AlreadyMarkedMatch => {
                return marker
                    .is_marked(event.description.as_deref())
                    .then_some(Verdict::Skip);
            }
            Rule::ExactTitleMatch(titles) => titles.iter().any(|t| t == title),
            Rule::SubstringMatch {
                needles,
                case_insensitive: false,
            } => needles.iter().any(|n| title.contains(n.as_str())),
            Rule::SubstringMatch {
                needles,
                case_insensitive: true,
            } => {
                let upper = title.to_uppercase();
                needles.iter().any(|n| upper.contains(n.as_str()))
            }
        };
        matched.then_some(Verdict::Remind)
    }
}

/// Decides which events need an SMS reminder
#[derive(Clone)]
pub struct ReminderPolicy {
    rules: Vec<Rule>,
    marker: Arc<dyn MarkerCodec>,
}

impl std::fmt::Debug for ReminderPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderPolicy")
            .field("rules", &self.rules)
            .finish()
    }
}

impl ReminderPolicy {
    pub fn new(rules: Vec<Rule>, marker: Arc<dyn MarkerCodec>) -> Self {
        Self { rules, marker }
    }

    /// Standard rule order built from the configured word lists
    pub fn from_rules(config: &ReminderRules, marker: Arc<dyn MarkerCodec>) -> Self {
        let mut rules = Vec::with_capacity(5);
        // An empty word would match every title
        if !config.sentinel_title.is_empty() {
            rules.push(Rule::SentinelMatch(config.sentinel_title.clone()));
        }
        rules.push(Rule::AlreadyMarkedMatch);
        rules.push(Rule::ExactTitleMatch(config.service_shifts.clone()));
        rules.push(Rule::SubstringMatch {
            needles: non_empty(std::iter::once(config.on_call_keyword.clone())),
            case_insensitive: false,
        });
        rules.push(Rule::SubstringMatch {
            needles: non_empty(config.keywords.iter().map(|k| k.to_uppercase())),
            case_insensitive: true,
        });
        Self::new(rules, marker)
    }

    /// Whether the event needs a reminder
    pub fn needs_reminder(&self, event: &CalendarEvent) -> bool {
        self.rules
            .iter()
            .find_map(|rule| rule.evaluate(event, self.marker.as_ref()))
            == Some(Verdict::Remind)
    }
}

fn non_empty(words: impl Iterator<Item = String>) -> Vec<String> {
    words.filter(|w| !w.is_empty()).collect()
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self::from_rules(&ReminderRules::default(), Arc::new(PrefixMarker))
    }
}
