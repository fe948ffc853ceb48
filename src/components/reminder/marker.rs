/// Token written into event descriptions once reminders have been sent
pub const REMINDED_MARKER: &str = "REMINDED";
/// Separator between the marker and the previous description
pub const MARKER_SEPARATOR: &str = " | ";

/// Reads and writes the "already reminded" flag stored in an event description
pub trait MarkerCodec: Send + Sync {
    /// Whether the description carries the flag
    fn is_marked(&self, description: Option<&str>) -> bool;

    /// Description with the flag applied
    fn apply_marker(&self, description: Option<&str>) -> String;
}

/// Marker stored as a text prefix: `REMINDED` or `REMINDED | <previous description>`
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixMarker;

impl MarkerCodec for PrefixMarker {
    fn is_marked(&self, description: Option<&str>) -> bool {
        description.is_some_and(|d| d.contains(REMINDED_MARKER))
    }

    fn apply_marker(&self, description: Option<&str>) -> String {
        match description {
            Some(previous) => format!("{}{}{}", REMINDED_MARKER, MARKER_SEPARATOR, previous),
            None => REMINDED_MARKER.to_string(),
        }
    }
}
