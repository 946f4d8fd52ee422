//! Journal domain — operation headlines, full journals and their records.

pub mod client;
pub mod state;

use crate::shared::serde_util::{timestamp, timestamp_opt};
use crate::shared::JournalId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub use state::HeadlineList;

/// Summary of one journaled operation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Headline {
    pub id: JournalId,
    pub operation: String,
    pub description: String,
    #[serde(with = "timestamp")]
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp_opt")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Run time in seconds, set once the operation finishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl Headline {
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Run time of a finished operation.
    ///
    /// Prefers the reported `duration`, falling back to the timestamps.
    pub fn elapsed(&self) -> Option<Duration> {
        if let Some(secs) = self.duration {
            return Duration::try_from_secs_f64(secs).ok();
        }
        let finished = self.finished_at?;
        (finished - self.started_at).to_std().ok()
    }
}

/// A headline together with every record written during the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Journal {
    #[serde(flatten)]
    pub headline: Headline,
    pub records: Vec<Record>,
}

/// One message recorded inside a journal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub message: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Structured fields attached to the message.
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}

/// Filter for the journal history listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl Query {
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn failed(mut self, failed: bool) -> Self {
        self.failed = Some(failed);
        self
    }

    pub fn pending(mut self, pending: bool) -> Self {
        self.pending = Some(pending);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.get_or_insert_with(Vec::new).push(label.into());
        self
    }

    /// Whether a headline passes the `operation`, `failed` and `pending`
    /// filters. Labels are matched server-side only.
    pub fn matches(&self, headline: &Headline) -> bool {
        if let Some(operation) = &self.operation {
            if &headline.operation != operation {
                return false;
            }
        }
        if let Some(failed) = self.failed {
            if headline.is_failed() != failed {
                return false;
            }
        }
        if let Some(pending) = self.pending {
            if headline.is_finished() == pending {
                return false;
            }
        }
        true
    }
}
