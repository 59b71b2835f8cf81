//! Static per-path tracking descriptors

use serde::{Deserialize, Serialize};

use crate::{Error, EventName, Result};

/// Event kind a tracked route emits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteEventKind {
    #[default]
    ViewContent,
    Custom(String),
}

impl RouteEventKind {
    pub fn event_name(&self) -> EventName {
        match self {
            RouteEventKind::ViewContent => EventName::ViewContent,
            RouteEventKind::Custom(name) => EventName::Custom(name.clone()),
        }
    }
}

/// Tracking payload configured for one exact path
///
/// Immutable after construction; `content_ids` always holds at least one id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTrackingDescriptor {
    event_kind: RouteEventKind,
    content_name: String,
    content_category: String,
    content_ids: Vec<String>,
}

impl RouteTrackingDescriptor {
    pub fn new(
        event_kind: RouteEventKind,
        content_name: impl Into<String>,
        content_category: impl Into<String>,
        content_ids: Vec<String>,
    ) -> Result<Self> {
        let content_name = content_name.into();
        let content_category = content_category.into();

        if content_name.trim().is_empty() {
            return Err(Error::InvalidInput("route content_name is empty".to_string()));
        }
        if content_category.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "route '{}' has empty content_category",
                content_name
            )));
        }
        if content_ids.is_empty() {
            return Err(Error::InvalidInput(format!(
                "route '{}' needs at least one content id",
                content_name
            )));
        }

        Ok(Self {
            event_kind,
            content_name,
            content_category,
            content_ids,
        })
    }

    /// ViewContent descriptor with a single content id
    pub fn view_content(content_name: &str, content_category: &str, content_id: &str) -> Self {
        Self {
            event_kind: RouteEventKind::ViewContent,
            content_name: content_name.to_string(),
            content_category: content_category.to_string(),
            content_ids: vec![content_id.to_string()],
        }
    }

    /// Custom-event descriptor with a single content id
    pub fn custom(event_name: &str, content_name: &str, content_category: &str, content_id: &str) -> Self {
        Self {
            event_kind: RouteEventKind::Custom(event_name.to_string()),
            content_name: content_name.to_string(),
            content_category: content_category.to_string(),
            content_ids: vec![content_id.to_string()],
        }
    }

    pub fn event_kind(&self) -> &RouteEventKind {
        &self.event_kind
    }

    pub fn content_name(&self) -> &str {
        &self.content_name
    }

    pub fn content_category(&self) -> &str {
        &self.content_category
    }

    pub fn content_ids(&self) -> &[String] {
        &self.content_ids
    }
}
