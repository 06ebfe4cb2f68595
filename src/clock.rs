use chrono::{DateTime, Local, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A server-assigned instant. Ordering is chronological regardless of the
/// offset the server rendered it in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, Ord, PartialOrd, Eq, PartialEq)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    #[cfg(test)]
    pub fn parse(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| Self(t.with_timezone(&Utc)))
    }

    pub fn local_time_label(&self) -> String {
        self.0.with_timezone(&Local).format("%H:%M").to_string()
    }
}
