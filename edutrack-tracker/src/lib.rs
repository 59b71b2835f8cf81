//! edutrack-tracker - client-side event tracking
//!
//! Delivers marketing events for the study-abroad site through two
//! independent sinks: the advertising pixel and the append-only data layer
//! drained by the server-side tag-management relay.
//!
//! - [`routes`]: exact-path route classifier
//! - [`data_layer`]: append-only event log
//! - [`pixel`]: pixel capability interface and implementations
//! - [`dispatch`]: dual-sink dispatcher
//! - [`settle`]: cancellable settle timer and debounce state machine
//! - [`page_views`] / [`entity`]: navigation and entity page-view gates
//! - [`tracker`]: facade exposing the tracking calls pages make

pub mod data_layer;
pub mod dispatch;
pub mod entity;
pub mod page_views;
pub mod pixel;
pub mod routes;
pub mod settle;
pub mod tracker;

pub use data_layer::{DataLayer, DataLayerRecord, DataLayerSink};
pub use dispatch::{DispatchOutcome, Dispatcher, PixelOutcome};
pub use entity::EntityViewTracker;
pub use page_views::PageViewGate;
pub use pixel::{ConsentGatedPixel, HttpPixel, NoopPixel, PixelSdk, RecordingPixel};
pub use routes::RouteTable;
pub use settle::{SettleState, SettleTimer, TimerHandle};
pub use tracker::Tracker;
