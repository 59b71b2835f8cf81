//! Route classifier
//!
//! Maps a navigation path to its static tracking descriptor. Lookup is an
//! exact string match: no trailing-slash or query-string normalisation and
//! no dynamic segments, so `/contact` and `/contact/` are different keys
//! and `/universities/{id}` pages are tracked by the entity tracker instead.

use edutrack_common::config::TomlConfig;
use edutrack_common::events::{build_page_view_event, RouteTrackingDescriptor, TrackedEvent};
use edutrack_common::Result;
use std::collections::HashMap;
use tracing::debug;

/// Immutable path → descriptor table
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it
/// after that.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteTrackingDescriptor>,
}

impl RouteTable {
    /// Empty table (every path is untracked)
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table for the site's static pages
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (path, name, category, id) in DEFAULT_ROUTES {
            table.insert(path, RouteTrackingDescriptor::view_content(name, category, id));
        }
        table.insert(
            "/updates",
            RouteTrackingDescriptor::custom("UpdatesFeedView", "Latest Updates", "News", "updates"),
        );
        table
    }

    /// Defaults (unless disabled) overlaid with `[[routes]]` from configuration
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        let mut table = if config.tracking.include_default_routes {
            Self::with_defaults()
        } else {
            Self::new()
        };
        for entry in &config.routes {
            table.insert(&entry.path, entry.to_descriptor()?);
        }
        Ok(table)
    }

    /// Add or replace a route while building the table
    pub fn insert(&mut self, path: &str, descriptor: RouteTrackingDescriptor) {
        self.routes.insert(path.to_string(), descriptor);
    }

    /// Exact-match lookup; a miss is the defined "do not track" case
    pub fn classify(&self, pathname: &str) -> Option<&RouteTrackingDescriptor> {
        let found = self.routes.get(pathname);
        if found.is_none() {
            debug!("No tracking route for {}", pathname);
        }
        found
    }

    /// Page-view event for `pathname`, or `None` for untracked pages
    pub fn page_view_event(&self, pathname: &str) -> Option<TrackedEvent> {
        self.classify(pathname).map(build_page_view_event)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// (path, content_name, content_category, content_id)
const DEFAULT_ROUTES: &[(&str, &str, &str, &str)] = &[
    ("/", "Home Page", "Homepage", "home"),
    ("/about", "About Us", "Company Information", "about"),
    ("/contact", "Contact Page", "Lead Generation", "contact"),
    ("/services", "Our Services", "Services", "services"),
    ("/apply", "Application Form", "Lead Generation", "apply"),
    ("/book-consultation", "Book a Consultation", "Lead Generation", "consultation"),
    ("/destinations", "Study Destinations", "Destinations", "destinations"),
    ("/destinations/uk", "Study in UK", "Destination", "uk"),
    ("/destinations/usa", "Study in USA", "Destination", "usa"),
    ("/destinations/canada", "Study in Canada", "Destination", "canada"),
    ("/destinations/australia", "Study in Australia", "Destination", "australia"),
    ("/destinations/new-zealand", "Study in New Zealand", "Destination", "new-zealand"),
    ("/universities", "Partner Universities", "Universities", "universities"),
    ("/success-stories", "Success Stories", "Social Proof", "success-stories"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use edutrack_common::EventName;

    #[test]
    fn test_default_table_covers_static_pages() {
        let table = RouteTable::with_defaults();
        assert_eq!(table.len(), DEFAULT_ROUTES.len() + 1);

        let contact = table.classify("/contact").expect("contact is tracked");
        assert_eq!(contact.content_name(), "Contact Page");
        assert_eq!(contact.content_category(), "Lead Generation");
        assert_eq!(contact.content_ids(), &["contact".to_string()]);
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let table = RouteTable::with_defaults();

        assert!(table.classify("/contact").is_some());
        assert!(table.classify("/contact/").is_none(), "trailing slash is a different key");
        assert!(table.classify("/contact?ref=ad").is_none(), "query strings are not stripped");
        assert!(table.classify("/CONTACT").is_none());
        assert!(table.classify("/universities/42").is_none(), "no dynamic segments");
    }

    #[test]
    fn test_custom_route_event_kind() {
        let table = RouteTable::with_defaults();
        let event = table.page_view_event("/updates").unwrap();
        assert_eq!(event.name(), &EventName::Custom("UpdatesFeedView".to_string()));
    }

    #[test]
    fn test_page_view_event_miss() {
        assert!(RouteTable::new().page_view_event("/").is_none());
    }

    #[test]
    fn test_from_config_overrides_and_extends() {
        let config = TomlConfig::from_toml_str(
            r#"
            [[routes]]
            path = "/contact"
            content_name = "Talk to an Advisor"
            content_category = "Lead Generation"
            content_ids = ["contact", "advisor"]

            [[routes]]
            path = "/scholarships"
            content_name = "Scholarships"
            content_category = "Funding"
            content_ids = ["scholarships"]
            "#,
        )
        .unwrap();

        let table = RouteTable::from_config(&config).unwrap();
        assert_eq!(
            table.classify("/contact").unwrap().content_name(),
            "Talk to an Advisor"
        );
        assert!(table.classify("/scholarships").is_some());
        assert!(table.classify("/about").is_some());
    }

    #[test]
    fn test_from_config_without_defaults() {
        let config = TomlConfig::from_toml_str(
            "[tracking]\ninclude_default_routes = false\n",
        )
        .unwrap();

        let table = RouteTable::from_config(&config).unwrap();
        assert!(table.is_empty());
    }
}
