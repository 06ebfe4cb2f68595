use derive_more::{AsRef, Deref, Display};
use serde::Serialize;

/// Text that is non-blank after trimming. Holds the trimmed form.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Deref, AsRef, Display, Serialize)]
#[serde(transparent)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    pub fn trimmed(data: &str) -> Option<Self> {
        let data = data.trim();
        if data.is_empty() {
            return None;
        }

        Some(Self(data.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
