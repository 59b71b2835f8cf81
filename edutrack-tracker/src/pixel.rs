//! Advertising pixel capability
//!
//! The dispatcher talks to the pixel only through [`PixelSdk`]. An
//! unavailable pixel (blocked script, consent not granted, no endpoint
//! configured) is just an implementation whose `is_available` is false.

use edutrack_common::config::PixelSettings;
use edutrack_common::events::{EventName, Params, UserData};
use edutrack_common::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Client-side pixel interface
pub trait PixelSdk: Send + Sync {
    /// Whether calls should be attempted at all
    fn is_available(&self) -> bool;

    /// Report one event
    ///
    /// Standard event names go through the pixel's standard call, others
    /// through its custom-event call (`event_name.is_standard()`).
    fn track(&self, event_name: &EventName, params: &Params, user_data: &UserData) -> Result<()>;
}

/// Pixel that is never available
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPixel;

impl PixelSdk for NoopPixel {
    fn is_available(&self) -> bool {
        false
    }

    fn track(&self, _event_name: &EventName, _params: &Params, _user_data: &UserData) -> Result<()> {
        Ok(())
    }
}

/// One call received by a [`RecordingPixel`]
#[derive(Debug, Clone, PartialEq)]
pub struct PixelCall {
    pub event_name: String,
    pub custom: bool,
    pub params: Params,
}

/// Pixel that records calls in memory
#[derive(Debug, Default)]
pub struct RecordingPixel {
    calls: Mutex<Vec<PixelCall>>,
}

impl RecordingPixel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PixelCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl PixelSdk for RecordingPixel {
    fn is_available(&self) -> bool {
        true
    }

    fn track(&self, event_name: &EventName, params: &Params, _user_data: &UserData) -> Result<()> {
        let mut calls = self
            .calls
            .lock()
            .map_err(|_| Error::Pixel("recording pixel lock poisoned".to_string()))?;
        calls.push(PixelCall {
            event_name: event_name.to_string(),
            custom: !event_name.is_standard(),
            params: params.clone(),
        });
        Ok(())
    }
}

/// Wraps a pixel and only exposes it while tracking consent is granted
pub struct ConsentGatedPixel {
    inner: Arc<dyn PixelSdk>,
    granted: AtomicBool,
}

impl ConsentGatedPixel {
    pub fn new(inner: Arc<dyn PixelSdk>, granted: bool) -> Self {
        Self {
            inner,
            granted: AtomicBool::new(granted),
        }
    }

    pub fn set_consent(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
        debug!("Pixel consent {}", if granted { "granted" } else { "revoked" });
    }

    pub fn consent_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }
}

impl PixelSdk for ConsentGatedPixel {
    fn is_available(&self) -> bool {
        self.consent_granted() && self.inner.is_available()
    }

    fn track(&self, event_name: &EventName, params: &Params, user_data: &UserData) -> Result<()> {
        if !self.consent_granted() {
            return Ok(());
        }
        self.inner.track(event_name, params, user_data)
    }
}

/// Body posted by [`HttpPixel`]
#[derive(Debug, Serialize)]
struct PixelPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pixel_id: Option<&'a str>,
    event_name: &'a str,
    custom: bool,
    event_time: i64,
    action_source: &'static str,
    user_data: BTreeMap<&'static str, String>,
    custom_data: &'a Params,
}

/// Forwards pixel calls to a conversions endpoint over HTTP
///
/// Identifiers are sent SHA-256 hashed. Delivery runs on the tokio runtime
/// in the background; `track` only reports whether the request was queued.
pub struct HttpPixel {
    client: reqwest::Client,
    endpoint: String,
    pixel_id: Option<String>,
}

impl HttpPixel {
    pub fn new(endpoint: String, pixel_id: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Pixel(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint,
            pixel_id,
        })
    }

    /// `None` when no endpoint is configured
    pub fn from_settings(settings: &PixelSettings) -> Result<Option<Self>> {
        match &settings.endpoint {
            Some(endpoint) => Ok(Some(Self::new(
                endpoint.clone(),
                settings.pixel_id.clone(),
                Duration::from_millis(settings.timeout_ms),
            )?)),
            None => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PixelSdk for HttpPixel {
    fn is_available(&self) -> bool {
        true
    }

    fn track(&self, event_name: &EventName, params: &Params, user_data: &UserData) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| Error::Pixel("no async runtime for pixel delivery".to_string()))?;

        let payload = PixelPayload {
            pixel_id: self.pixel_id.as_deref(),
            event_name: event_name.as_str(),
            custom: !event_name.is_standard(),
            event_time: chrono::Utc::now().timestamp(),
            action_source: "website",
            user_data: user_data.hashed(),
            custom_data: params,
        };
        let body = serde_json::to_vec(&payload)?;

        let request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        let name = event_name.to_string();

        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Pixel delivered {}", name);
                }
                Ok(response) => {
                    warn!("Pixel endpoint rejected {}: HTTP {}", name, response.status());
                }
                Err(e) => {
                    warn!("Pixel delivery of {} failed: {}", name, e);
                }
            }
        });

        Ok(())
    }
}
