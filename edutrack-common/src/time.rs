//! Event timestamps
//!
//! Data-layer records carry ISO-8601 UTC strings with millisecond
//! precision. Within one session they must never go backwards, even if the
//! host clock is stepped; [`SessionClock`] enforces that.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a timestamp the way the data layer carries it (`2025-03-14T09:26:53.000Z`)
pub fn to_iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Wall clock that never steps backwards
#[derive(Debug, Default, Clone)]
pub struct SessionClock {
    last: Option<DateTime<Utc>>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the current time
    pub fn stamp(&mut self) -> DateTime<Utc> {
        self.observe(Utc::now())
    }

    /// Stamp `candidate`, held at the previous stamp if it is earlier
    pub fn observe(&mut self, candidate: DateTime<Utc>) -> DateTime<Utc> {
        let stamped = match self.last {
            Some(last) if last > candidate => last,
            _ => candidate,
        };
        self.last = Some(stamped);
        stamped
    }

    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.last
    }
}
