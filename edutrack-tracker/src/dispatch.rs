//! Dual-sink dispatcher
//!
//! Delivers one [`TrackedEvent`] through two independent channels:
//!
//! 1. the client-side pixel, attempted only when it reports itself available
//! 2. the data layer, attempted unconditionally
//!
//! Each step runs inside its own failure boundary. Errors and panics from
//! either sink are logged and swallowed; a pixel failure never prevents the
//! data-layer append, and `dispatch` never fails its caller. Within one call
//! the pixel attempt always precedes the append.

use edutrack_common::events::{Params, TrackedEvent};
use edutrack_common::time::{self, SessionClock};
use edutrack_common::{Error, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::data_layer::{DataLayerRecord, DataLayerSink};
use crate::pixel::PixelSdk;

/// What happened to the pixel step of one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOutcome {
    Delivered,
    /// Pixel not available; no call attempted
    Skipped,
    Failed,
}

/// Result of one dispatch, for diagnostics only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub pixel: PixelOutcome,
    pub appended: bool,
}

pub struct Dispatcher {
    pixel: Arc<dyn PixelSdk>,
    data_layer: Arc<dyn DataLayerSink>,
    /// Fixed `event` key for records; event name when `None`
    event_key: Option<String>,
    clock: Mutex<SessionClock>,
}

impl Dispatcher {
    pub fn new(pixel: Arc<dyn PixelSdk>, data_layer: Arc<dyn DataLayerSink>) -> Self {
        Self {
            pixel,
            data_layer,
            event_key: None,
            clock: Mutex::new(SessionClock::new()),
        }
    }

    /// Use a fixed `event` key in data-layer records
    pub fn with_event_key(mut self, event_key: Option<String>) -> Self {
        self.event_key = event_key;
        self
    }

    /// Deliver `event` to both sinks
    pub fn dispatch(&self, event: &TrackedEvent) -> DispatchOutcome {
        let params = event.custom_data().to_params();

        let pixel = self.deliver_to_pixel(event, &params);
        let appended = self.append_to_data_layer(event, &params);

        DispatchOutcome { pixel, appended }
    }

    fn deliver_to_pixel(&self, event: &TrackedEvent, params: &Result<Params>) -> PixelOutcome {
        if !self.pixel.is_available() {
            debug!("Pixel unavailable, skipping {}", event.name());
            return PixelOutcome::Skipped;
        }

        let params = match params {
            Ok(params) => params,
            Err(e) => {
                warn!("Pixel call for {} skipped: {}", event.name(), e);
                return PixelOutcome::Failed;
            }
        };

        let attempt = catch_unwind(AssertUnwindSafe(|| {
            self.pixel.track(event.name(), params, event.user_data())
        }));

        match attempt {
            Ok(Ok(())) => {
                debug!("Pixel tracked {}", event.name());
                PixelOutcome::Delivered
            }
            Ok(Err(e)) => {
                warn!("Pixel tracking failed for {}: {}", event.name(), e);
                PixelOutcome::Failed
            }
            Err(panic) => {
                warn!(
                    "Pixel panicked while tracking {}: {}",
                    event.name(),
                    panic_message(panic.as_ref())
                );
                PixelOutcome::Failed
            }
        }
    }

    fn append_to_data_layer(&self, event: &TrackedEvent, params: &Result<Params>) -> bool {
        let attempt = catch_unwind(AssertUnwindSafe(|| -> Result<()> {
            let custom_data = match params {
                Ok(params) => params.clone(),
                Err(e) => return Err(Error::DataLayer(format!("cannot serialize custom data: {}", e))),
            };
            let record = DataLayerRecord {
                event: self
                    .event_key
                    .clone()
                    .unwrap_or_else(|| event.name().to_string()),
                event_name: event.name().to_string(),
                user_data: event.user_data().clone(),
                custom_data,
                timestamp: time::to_iso8601(self.next_timestamp()),
            };
            self.data_layer.push(record)
        }));

        match attempt {
            Ok(Ok(())) => {
                debug!("Data layer appended {}", event.name());
                true
            }
            Ok(Err(e)) => {
                warn!("Data layer append failed for {}: {}", event.name(), e);
                false
            }
            Err(panic) => {
                warn!(
                    "Data layer panicked while appending {}: {}",
                    event.name(),
                    panic_message(panic.as_ref())
                );
                false
            }
        }
    }

    /// Wall-clock time, clamped to never go backwards within this dispatcher
    fn next_timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        match self.clock.lock() {
            Ok(mut clock) => clock.stamp(),
            Err(poisoned) => poisoned.into_inner().stamp(),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
