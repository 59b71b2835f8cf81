//! Navigation-triggered page-view tracking
//!
//! A [`PageViewGate`] is mounted by the navigation-observing component.
//! Each path change starts a settle timer; when it elapses the path is
//! classified and, if the route table knows it, one page-view event is
//! dispatched. A path change before the delay elapses cancels the pending
//! fire, so pages the visitor merely passed through are never tracked.
//! Dropping the gate (unmount) cancels any pending fire.

use std::sync::Arc;
use tracing::{debug, info};

use crate::dispatch::Dispatcher;
use crate::routes::RouteTable;
use crate::settle::{Debouncer, SettleState, SettleTimer};

pub struct PageViewGate {
    debouncer: Debouncer<String>,
    routes: Arc<RouteTable>,
    dispatcher: Arc<Dispatcher>,
}

impl PageViewGate {
    pub fn mount(routes: Arc<RouteTable>, dispatcher: Arc<Dispatcher>, timer: SettleTimer) -> Self {
        Self {
            debouncer: Debouncer::new(timer),
            routes,
            dispatcher,
        }
    }

    /// Observe the current path
    ///
    /// Returns whether a settle timer was started (false when the path did
    /// not change).
    pub fn navigate(&mut self, pathname: &str) -> bool {
        let routes = Arc::clone(&self.routes);
        let dispatcher = Arc::clone(&self.dispatcher);

        self.debouncer.trigger(pathname.to_string(), move |path| {
            match routes.page_view_event(path) {
                Some(event) => {
                    info!("Tracking page view for {}", path);
                    dispatcher.dispatch(&event);
                }
                None => debug!("Page {} settled, not in route table", path),
            }
        })
    }

    pub fn state(&self) -> SettleState<String> {
        self.debouncer.state()
    }

    /// Tear down, cancelling any pending fire
    pub fn unmount(mut self) {
        self.debouncer.reset();
    }
}
