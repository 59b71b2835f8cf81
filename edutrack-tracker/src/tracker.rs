//! Tracking facade used by pages
//!
//! Bundles the dispatcher, route table, event defaults and settle delay.
//! Every `track_*` call builds its event and dispatches it immediately;
//! none of them can fail the caller.

use edutrack_common::config::TomlConfig;
use edutrack_common::events::{
    build_custom_event, AddToCartFields, ConversionFields, EventDefaults, Extensions,
    FormSubmissionFields, LeadFields, SearchFields, ViewContentFields,
};
use edutrack_common::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::data_layer::DataLayerSink;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::entity::EntityViewTracker;
use crate::page_views::PageViewGate;
use crate::pixel::PixelSdk;
use crate::routes::RouteTable;
use crate::settle::SettleTimer;

#[derive(Clone)]
pub struct Tracker {
    dispatcher: Arc<Dispatcher>,
    routes: Arc<RouteTable>,
    defaults: Arc<EventDefaults>,
    timer: SettleTimer,
}

impl Tracker {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        routes: Arc<RouteTable>,
        defaults: EventDefaults,
        settle_delay: Duration,
    ) -> Self {
        Self {
            dispatcher,
            routes,
            defaults: Arc::new(defaults),
            timer: SettleTimer::new(settle_delay),
        }
    }

    /// Tracker for one session, configured from `config`
    pub fn from_config(
        config: &TomlConfig,
        routes: Arc<RouteTable>,
        pixel: Arc<dyn PixelSdk>,
        data_layer: Arc<dyn DataLayerSink>,
    ) -> Self {
        let dispatcher = Dispatcher::new(pixel, data_layer)
            .with_event_key(config.data_layer.event_key.clone());
        Self::new(
            Arc::new(dispatcher),
            routes,
            config.tracking.event_defaults(),
            config.tracking.settle_delay(),
        )
    }

    /// Default configuration and routes, delivering into the process-wide data layer
    pub fn with_global_data_layer(pixel: Arc<dyn PixelSdk>) -> Result<Self> {
        let config = TomlConfig::default();
        let routes = Arc::new(RouteTable::from_config(&config)?);
        Ok(Self::from_config(
            &config,
            routes,
            pixel,
            crate::data_layer::DataLayer::global(),
        ))
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    pub fn settle_delay(&self) -> Duration {
        self.timer.delay()
    }

    /// Immediate page-view dispatch for `pathname`; `None` for untracked pages
    pub fn track_page_view(&self, pathname: &str) -> Option<DispatchOutcome> {
        self.routes
            .page_view_event(pathname)
            .map(|event| self.dispatcher.dispatch(&event))
    }

    pub fn track_view_content(&self, fields: ViewContentFields) -> DispatchOutcome {
        self.dispatcher.dispatch(&self.defaults.view_content_event(fields))
    }

    pub fn track_lead(&self, fields: LeadFields) -> DispatchOutcome {
        self.dispatcher.dispatch(&self.defaults.lead_event(fields))
    }

    pub fn track_form_submission(&self, fields: FormSubmissionFields) -> DispatchOutcome {
        self.dispatcher
            .dispatch(&self.defaults.form_submission_event(fields))
    }

    pub fn track_search(&self, fields: SearchFields) -> DispatchOutcome {
        self.dispatcher.dispatch(&self.defaults.search_event(fields))
    }

    pub fn track_add_to_cart(&self, fields: AddToCartFields) -> DispatchOutcome {
        self.dispatcher.dispatch(&self.defaults.add_to_cart_event(fields))
    }

    pub fn track_conversion(&self, fields: ConversionFields) -> DispatchOutcome {
        self.dispatcher.dispatch(&self.defaults.conversion_event(fields))
    }

    pub fn track_custom_event(&self, name: &str, params: Extensions) -> DispatchOutcome {
        self.dispatcher.dispatch(&build_custom_event(name, params))
    }

    /// Mount the navigation hook (debounced page views)
    pub fn mount_page_views(&self) -> PageViewGate {
        PageViewGate::mount(Arc::clone(&self.routes), Arc::clone(&self.dispatcher), self.timer)
    }

    /// Mount an entity view tracker for a dynamic page showing `entity_type`
    pub fn mount_entity_view(&self, entity_type: &str) -> EntityViewTracker {
        EntityViewTracker::mount(entity_type, Arc::clone(&self.dispatcher), self.timer)
    }
}
