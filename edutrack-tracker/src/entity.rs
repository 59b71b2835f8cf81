//! Entity view tracking for dynamic pages
//!
//! Pages for a single data entity (one university, one success story) are
//! not in the route table. They mount an [`EntityViewTracker`] and report
//! the entity they show; a ViewContent event named `"<Type>: <name>"` is
//! dispatched after the settle delay. Reporting the same entity again while
//! mounted does nothing; a different id or name re-fires. A fresh mount
//! tracks again.

use edutrack_common::events::build_entity_view_event;
use std::sync::Arc;
use tracing::info;

use crate::dispatch::Dispatcher;
use crate::settle::{Debouncer, SettleState, SettleTimer};

/// Identity of the entity currently shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

pub struct EntityViewTracker {
    entity_type: String,
    debouncer: Debouncer<EntityRef>,
    dispatcher: Arc<Dispatcher>,
}

impl EntityViewTracker {
    pub fn mount(entity_type: &str, dispatcher: Arc<Dispatcher>, timer: SettleTimer) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            debouncer: Debouncer::new(timer),
            dispatcher,
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Report the entity being displayed
    ///
    /// Returns whether a settle timer was started.
    pub fn track_entity_view(&mut self, entity_id: &str, entity_name: &str) -> bool {
        let entity_type = self.entity_type.clone();
        let dispatcher = Arc::clone(&self.dispatcher);
        let entity = EntityRef {
            id: entity_id.to_string(),
            name: entity_name.to_string(),
        };

        self.debouncer.trigger(entity, move |entity| {
            info!("Tracking {} view for {}", entity_type, entity.id);
            let event = build_entity_view_event(&entity_type, &entity.id, &entity.name);
            dispatcher.dispatch(&event);
        })
    }

    pub fn state(&self) -> SettleState<EntityRef> {
        self.debouncer.state()
    }

    /// Tear down, cancelling any pending fire
    pub fn unmount(mut self) {
        self.debouncer.reset();
    }
}
