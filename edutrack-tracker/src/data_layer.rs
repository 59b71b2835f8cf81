//! Append-only data layer
//!
//! Every dispatched event is appended here as a [`DataLayerRecord`]; the
//! server-side tag-management relay drains it. Append is the only mutation:
//! records are never edited or removed, and the log grows for the lifetime
//! of its session.
//!
//! Appends also go out on a broadcast channel so a live relay can follow
//! the log without polling (same pattern as a lossy event bus: no
//! subscribers is fine).

use edutrack_common::events::{Params, UserData};
use edutrack_common::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Broadcast buffer for live subscribers
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Wire record read by the server-side relay
///
/// Field names are a contract with the relay container and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataLayerRecord {
    pub event: String,
    pub event_name: String,
    pub user_data: UserData,
    pub custom_data: Params,
    /// ISO-8601 UTC
    pub timestamp: String,
}

/// Destination for data-layer appends
///
/// Implementations report failures as errors; the dispatcher logs and
/// swallows them.
pub trait DataLayerSink: Send + Sync {
    fn push(&self, record: DataLayerRecord) -> Result<()>;
}

/// In-memory data layer
pub struct DataLayer {
    records: Mutex<Vec<DataLayerRecord>>,
    tx: broadcast::Sender<DataLayerRecord>,
}

static GLOBAL: Lazy<Arc<DataLayer>> =
    Lazy::new(|| Arc::new(DataLayer::new(DEFAULT_BROADCAST_CAPACITY)));

impl DataLayer {
    pub fn new(broadcast_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(broadcast_capacity.max(1));
        Self {
            records: Mutex::new(Vec::new()),
            tx,
        }
    }

    /// Process-wide data layer
    ///
    /// Initialised on first access; later calls return the same instance,
    /// so repeated initialisation (e.g. a hot reload) is harmless.
    pub fn global() -> Arc<DataLayer> {
        Arc::clone(&GLOBAL)
    }

    /// Copy of every record appended so far, in append order
    pub fn snapshot(&self) -> Vec<DataLayerRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.records.lock() {
            Ok(records) => records.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Follow records appended after this call
    pub fn subscribe(&self) -> broadcast::Receiver<DataLayerRecord> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for DataLayer {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

impl DataLayerSink for DataLayer {
    fn push(&self, record: DataLayerRecord) -> Result<()> {
        {
            let mut records = self
                .records
                .lock()
                .map_err(|_| Error::DataLayer("data layer lock poisoned".to_string()))?;
            records.push(record.clone());
        }
        // No live subscriber is not an error
        let _ = self.tx.send(record);
        Ok(())
    }
}
