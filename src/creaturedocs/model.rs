use serde::{Deserialize, Serialize};

/// The structured payload of one creature document.
///
/// A record has no identity of its own; identity lives in the location of
/// the [`Document`](crate::document::Document) that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    /// Expected to be between 0 and 5; not enforced.
    pub rating: f32,
}

impl Record {
    pub fn new(title: impl Into<String>, rating: f32) -> Self {
        Self {
            title: title.into(),
            rating,
        }
    }
}
