//! Event taxonomy for edutrack
//!
//! Defines the fixed vocabulary of trackable actions and the immutable
//! [`TrackedEvent`] record that every sink receives.
//!
//! Each event kind carries its own [`CustomData`] variant so the fields a
//! kind requires are enforced by the type system, while the free-form
//! marketing attributes (destination, study level, program type) travel in
//! an open extension map of flat values.

mod builders;
mod custom_data;
mod route;
mod user_data;

pub use builders::{
    build_add_to_cart_event, build_conversion_event, build_custom_event,
    build_entity_view_event, build_form_submission_event, build_lead_event,
    build_page_view_event, build_search_event, build_view_content_event, lead_transaction_id,
    AddToCartFields, ConversionFields, EventDefaults, FormSubmissionFields, LeadFields,
    SearchFields, ViewContentFields,
};
pub use custom_data::{
    AddToCartData, ContentData, ConversionData, CustomData, Extensions, FormSubmissionData,
    LeadData, ParamValue, Params, SearchData,
};
pub use route::{RouteEventKind, RouteTrackingDescriptor};
pub use user_data::UserData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Trackable event names
///
/// Standard variants map onto the advertising platform's standard event
/// names. Anything else is a `Custom` event and is delivered through the
/// pixel's custom-event call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    PageView,
    ViewContent,
    Lead,
    CompleteRegistration,
    Search,
    AddToCart,
    Purchase,
    Custom(String),
}

impl EventName {
    /// Wire name of the event
    pub fn as_str(&self) -> &str {
        match self {
            EventName::PageView => "PageView",
            EventName::ViewContent => "ViewContent",
            EventName::Lead => "Lead",
            EventName::CompleteRegistration => "CompleteRegistration",
            EventName::Search => "Search",
            EventName::AddToCart => "AddToCart",
            EventName::Purchase => "Purchase",
            EventName::Custom(name) => name,
        }
    }

    /// Whether the pixel knows this event as one of its standard events
    pub fn is_standard(&self) -> bool {
        !matches!(self, EventName::Custom(_))
    }

    /// Resolve a wire name, falling back to `Custom` for unknown names
    pub fn parse(name: &str) -> Self {
        match name {
            "PageView" => EventName::PageView,
            "ViewContent" => EventName::ViewContent,
            "Lead" => EventName::Lead,
            "CompleteRegistration" => EventName::CompleteRegistration,
            "Search" => EventName::Search,
            "AddToCart" => EventName::AddToCart,
            "Purchase" => EventName::Purchase,
            other => EventName::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(EventName::parse(&name))
    }
}

/// The atomic unit dispatched to every sink
///
/// Immutable once constructed: fields are only readable, and sinks receive
/// a shared reference to the same record. The delivery timestamp is
/// assigned by the dispatcher, not here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEvent {
    name: EventName,
    user_data: UserData,
    custom_data: CustomData,
}

impl TrackedEvent {
    pub fn new(name: EventName, user_data: UserData, custom_data: CustomData) -> Self {
        Self {
            name,
            user_data,
            custom_data,
        }
    }

    pub fn name(&self) -> &EventName {
        &self.name
    }

    pub fn user_data(&self) -> &UserData {
        &self.user_data
    }

    pub fn custom_data(&self) -> &CustomData {
        &self.custom_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_wire_names() {
        let names = vec![
            (EventName::PageView, "PageView"),
            (EventName::ViewContent, "ViewContent"),
            (EventName::Lead, "Lead"),
            (EventName::CompleteRegistration, "CompleteRegistration"),
            (EventName::Search, "Search"),
            (EventName::AddToCart, "AddToCart"),
            (EventName::Purchase, "Purchase"),
            (EventName::Custom("BrochureDownload".to_string()), "BrochureDownload"),
        ];

        for (name, expected) in names {
            assert_eq!(name.as_str(), expected);
            assert_eq!(name.to_string(), expected);
        }
    }

    #[test]
    fn test_event_name_parse_falls_back_to_custom() {
        assert_eq!(EventName::parse("Lead"), EventName::Lead);
        assert_eq!(EventName::parse("Purchase"), EventName::Purchase);
        assert_eq!(
            EventName::parse("WebinarSignup"),
            EventName::Custom("WebinarSignup".to_string())
        );
    }

    #[test]
    fn test_only_custom_events_are_non_standard() {
        assert!(EventName::Lead.is_standard());
        assert!(EventName::PageView.is_standard());
        assert!(!EventName::Custom("Scroll75".to_string()).is_standard());
    }

    #[test]
    fn test_event_name_serializes_as_plain_string() {
        let json = serde_json::to_string(&EventName::CompleteRegistration).unwrap();
        assert_eq!(json, "\"CompleteRegistration\"");

        let parsed: EventName = serde_json::from_str("\"ChatOpened\"").unwrap();
        assert_eq!(parsed, EventName::Custom("ChatOpened".to_string()));
    }
}
