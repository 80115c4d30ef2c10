//! In-memory record of the most recent fetch, kept so the console can
//! redisplay it. Nothing here outlives the process.

use chrono::{DateTime, Utc};

use crate::client::ConnectionDescriptor;
use crate::fetch::FetchResult;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub descriptor: ConnectionDescriptor,
    pub result: FetchResult,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Session {
    last: Option<Snapshot>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored result with a new one.
    pub fn record(&mut self, descriptor: ConnectionDescriptor, result: FetchResult) -> &Snapshot {
        self.last.insert(Snapshot {
            descriptor,
            result,
            fetched_at: Utc::now(),
        })
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.last.as_ref()
    }

    /// Drop the stored result. Returns whether there was one.
    pub fn clear(&mut self) -> bool {
        self.last.take().is_some()
    }
}
