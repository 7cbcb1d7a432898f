use mongodb::bson::{Bson, DateTime, Document};
use serde::{Deserialize, Serialize};

/// A climbing problem: a route-setting record with a per-collection unique
/// name, a free-form grade, and an opaque hold configuration.
///
/// `is_loop` and `loop_order` describe an ordered sequence of moves; both are
/// fixed at creation. `timestamp` is assigned the first time the document is
/// persisted and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub grade: String,
    pub grips: Document,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "isLoop", skip_serializing_if = "Option::is_none")]
    pub is_loop: Option<bool>,
    #[serde(rename = "loopOrder", skip_serializing_if = "Option::is_none")]
    pub loop_order: Option<Vec<Bson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime>,
}

impl Problem {
    /// Assign the creation timestamp if it has not been assigned yet.
    ///
    /// Called on every save path so re-saving an existing document is a
    /// no-op: the timestamp is set exactly once, at first persistence.
    pub fn touch_timestamp(&mut self) {
        if self.timestamp.is_none() {
            self.timestamp = Some(DateTime::now());
        }
    }
}
