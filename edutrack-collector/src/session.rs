//! Tracking sessions
//!
//! One session per browser tab. Each session owns its own data layer, its
//! consent switch, its navigation gate and at most one mounted entity view
//! tracker. Removing a session tears all of them down, cancelling any
//! pending settle timers. Tabs that close without ending their session are
//! caught by the idle sweep.

use chrono::{DateTime, Utc};
use edutrack_common::config::TomlConfig;
use edutrack_tracker::data_layer::DEFAULT_BROADCAST_CAPACITY;
use edutrack_tracker::{
    ConsentGatedPixel, DataLayer, EntityViewTracker, PageViewGate, PixelSdk, RouteTable, Tracker,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub tracker: Tracker,
    pub data_layer: Arc<DataLayer>,
    consent: Arc<ConsentGatedPixel>,
    page_views: Mutex<Option<PageViewGate>>,
    entity_view: Mutex<Option<EntityViewTracker>>,
    last_seen: Mutex<Instant>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl Session {
    fn new(config: &TomlConfig, routes: Arc<RouteTable>, pixel: Arc<dyn PixelSdk>) -> Self {
        let data_layer = Arc::new(DataLayer::new(DEFAULT_BROADCAST_CAPACITY));
        let consent = Arc::new(ConsentGatedPixel::new(pixel, config.pixel.consent_default));
        let tracker = Tracker::from_config(config, routes, consent.clone(), data_layer.clone());
        let page_views = tracker.mount_page_views();

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            tracker,
            data_layer,
            consent,
            page_views: Mutex::new(Some(page_views)),
            entity_view: Mutex::new(None),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    /// Mark the session active
    pub fn touch(&self) {
        *lock(&self.last_seen) = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        lock(&self.last_seen).elapsed()
    }

    /// Report the tab's current path to the navigation gate
    pub fn navigate(&self, path: &str) -> bool {
        match lock(&self.page_views).as_mut() {
            Some(gate) => gate.navigate(path),
            None => false,
        }
    }

    /// Report the entity shown on a dynamic page
    ///
    /// A different entity type remounts the tracker (a different page).
    pub fn show_entity(&self, entity_type: &str, entity_id: &str, entity_name: &str) -> bool {
        let mut slot = lock(&self.entity_view);
        let remount = match slot.as_ref() {
            Some(view) => view.entity_type() != entity_type,
            None => true,
        };
        if remount {
            if let Some(previous) = slot.take() {
                previous.unmount();
            }
            *slot = Some(self.tracker.mount_entity_view(entity_type));
        }
        match slot.as_mut() {
            Some(view) => view.track_entity_view(entity_id, entity_name),
            None => false,
        }
    }

    /// Leave the dynamic page; returns whether a tracker was mounted
    pub fn hide_entity(&self) -> bool {
        match lock(&self.entity_view).take() {
            Some(view) => {
                view.unmount();
                true
            }
            None => false,
        }
    }

    pub fn set_consent(&self, granted: bool) {
        self.consent.set_consent(granted);
    }

    pub fn consent_granted(&self) -> bool {
        self.consent.consent_granted()
    }

    /// Cancel pending timers and unmount everything
    pub fn teardown(&self) {
        if let Some(gate) = lock(&self.page_views).take() {
            gate.unmount();
        }
        self.hide_entity();
        debug!("Session {} torn down", self.id);
    }
}

/// Live sessions keyed by id
pub struct SessionRegistry {
    config: Arc<TomlConfig>,
    routes: Arc<RouteTable>,
    pixel: Arc<dyn PixelSdk>,
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new(config: Arc<TomlConfig>, routes: Arc<RouteTable>, pixel: Arc<dyn PixelSdk>) -> Self {
        Self {
            config,
            routes,
            pixel,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new(
            &self.config,
            Arc::clone(&self.routes),
            Arc::clone(&self.pixel),
        ));
        self.sessions
            .write()
            .await
            .insert(session.id, Arc::clone(&session));
        info!("Session {} started", session.id);
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Remove and tear down a session
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.teardown();
                info!("Session {} ended", id);
                true
            }
            None => false,
        }
    }

    /// Tear down every session idle for at least `ttl`; returns how many
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let expired: Vec<Arc<Session>> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .values()
                .filter(|session| session.idle_for() >= ttl)
                .map(|session| session.id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &expired {
            session.teardown();
            info!("Session {} expired after {:?} idle", session.id, ttl);
        }
        expired.len()
    }

    /// Periodically evict idle sessions until the registry is dropped
    pub fn spawn_idle_sweep(self: &Arc<Self>, ttl: Duration) -> JoinHandle<()> {
        let registry: Weak<SessionRegistry> = Arc::downgrade(self);
        let period = (ttl / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                let evicted = registry.evict_idle(ttl).await;
                if evicted > 0 {
                    debug!("Idle sweep evicted {} sessions", evicted);
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
