use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Stable subject identifier issued by the identity provider (`sub` claim).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// `None` for blank subjects
    pub fn new(subject: impl Into<String>) -> Option<Self> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            None
        } else {
            Some(Self(subject))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
