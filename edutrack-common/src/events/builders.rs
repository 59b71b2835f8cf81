//! Event builders with marketing defaults
//!
//! Builders never fail: missing optional fields are omitted or defaulted,
//! never rejected. Data quality is the calling page's responsibility; a
//! partial event is preferred over a dropped one.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::custom_data::{
    AddToCartData, ContentData, ConversionData, CustomData, Extensions, FormSubmissionData,
    LeadData, SearchData,
};
use super::route::RouteTrackingDescriptor;
use super::user_data::UserData;
use super::{EventName, TrackedEvent};

/// Fallback values applied by the builders
#[derive(Debug, Clone, PartialEq)]
pub struct EventDefaults {
    pub content_category: String,
    pub currency: String,
    pub value: f64,
    pub form_name: String,
    pub form_type: String,
    pub conversion_event_name: String,
}

impl Default for EventDefaults {
    fn default() -> Self {
        Self {
            content_category: "Education".to_string(),
            currency: "USD".to_string(),
            value: 1.0,
            form_name: "Contact Form".to_string(),
            form_type: "Lead Generation".to_string(),
            conversion_event_name: "Purchase".to_string(),
        }
    }
}

/// Fields accepted by [`build_lead_event`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LeadFields {
    pub user_data: UserData,
    pub content_name: Option<String>,
    pub content_category: Option<String>,
    pub value: Option<f64>,
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: Extensions,
}

/// Fields accepted by [`build_form_submission_event`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormSubmissionFields {
    pub user_data: UserData,
    pub form_name: Option<String>,
    pub form_type: Option<String>,
    #[serde(flatten)]
    pub extra: Extensions,
}

/// Fields accepted by [`build_conversion_event`]
///
/// `transaction_id` must be unique per logical conversion for the ad
/// platform to deduplicate; see [`lead_transaction_id`]. Nothing here
/// enforces uniqueness.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversionFields {
    pub user_data: UserData,
    pub event_name: Option<String>,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub transaction_id: Option<String>,
    pub content_name: Option<String>,
    #[serde(flatten)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchFields {
    pub search_string: String,
    pub content_category: Option<String>,
    #[serde(flatten)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddToCartFields {
    pub content_name: Option<String>,
    pub content_ids: Vec<String>,
    pub value: Option<f64>,
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewContentFields {
    pub content_name: String,
    pub content_category: Option<String>,
    pub content_ids: Vec<String>,
    #[serde(flatten)]
    pub extra: Extensions,
}

impl EventDefaults {
    pub fn lead_event(&self, fields: LeadFields) -> TrackedEvent {
        TrackedEvent::new(
            EventName::Lead,
            fields.user_data,
            CustomData::Lead(LeadData {
                content_name: fields.content_name,
                content_category: fields
                    .content_category
                    .unwrap_or_else(|| self.content_category.clone()),
                value: monetary(fields.value, self.value),
                currency: fields.currency.unwrap_or_else(|| self.currency.clone()),
                extra: fields.extra,
            }),
        )
    }

    pub fn form_submission_event(&self, fields: FormSubmissionFields) -> TrackedEvent {
        TrackedEvent::new(
            EventName::CompleteRegistration,
            fields.user_data,
            CustomData::FormSubmission(FormSubmissionData {
                form_name: fields.form_name.unwrap_or_else(|| self.form_name.clone()),
                form_type: fields.form_type.unwrap_or_else(|| self.form_type.clone()),
                extra: fields.extra,
            }),
        )
    }

    pub fn conversion_event(&self, fields: ConversionFields) -> TrackedEvent {
        let name = fields
            .event_name
            .as_deref()
            .unwrap_or(&self.conversion_event_name);

        TrackedEvent::new(
            EventName::parse(name),
            fields.user_data,
            CustomData::Conversion(ConversionData {
                value: monetary(fields.value, self.value),
                currency: fields.currency.unwrap_or_else(|| self.currency.clone()),
                transaction_id: fields.transaction_id,
                content_name: fields.content_name,
                extra: fields.extra,
            }),
        )
    }

    pub fn search_event(&self, fields: SearchFields) -> TrackedEvent {
        TrackedEvent::new(
            EventName::Search,
            UserData::default(),
            CustomData::Search(SearchData {
                search_string: fields.search_string,
                content_category: fields.content_category,
                extra: fields.extra,
            }),
        )
    }

    pub fn add_to_cart_event(&self, fields: AddToCartFields) -> TrackedEvent {
        TrackedEvent::new(
            EventName::AddToCart,
            UserData::default(),
            CustomData::AddToCart(AddToCartData {
                content_name: fields.content_name,
                content_ids: fields.content_ids,
                value: monetary(fields.value, self.value),
                currency: fields.currency.unwrap_or_else(|| self.currency.clone()),
                extra: fields.extra,
            }),
        )
    }

    pub fn view_content_event(&self, fields: ViewContentFields) -> TrackedEvent {
        TrackedEvent::new(
            EventName::ViewContent,
            UserData::default(),
            CustomData::Content(ContentData {
                content_name: fields.content_name,
                content_category: fields
                    .content_category
                    .unwrap_or_else(|| self.content_category.clone()),
                content_ids: fields.content_ids,
                extra: fields.extra,
            }),
        )
    }
}

/// Missing, negative or non-finite amounts fall back to a non-negative value
fn monetary(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        Some(_) => 0.0,
        None => default.max(0.0),
    }
}

/// Lead event: `content_category` "Education", `value` 1, `currency` "USD" unless given
pub fn build_lead_event(fields: LeadFields) -> TrackedEvent {
    EventDefaults::default().lead_event(fields)
}

/// Form submission: `form_name` "Contact Form", `form_type` "Lead Generation" unless given
pub fn build_form_submission_event(fields: FormSubmissionFields) -> TrackedEvent {
    EventDefaults::default().form_submission_event(fields)
}

/// Conversion: event name "Purchase" unless given
pub fn build_conversion_event(fields: ConversionFields) -> TrackedEvent {
    EventDefaults::default().conversion_event(fields)
}

pub fn build_search_event(fields: SearchFields) -> TrackedEvent {
    EventDefaults::default().search_event(fields)
}

pub fn build_add_to_cart_event(fields: AddToCartFields) -> TrackedEvent {
    EventDefaults::default().add_to_cart_event(fields)
}

pub fn build_view_content_event(fields: ViewContentFields) -> TrackedEvent {
    EventDefaults::default().view_content_event(fields)
}

/// Custom event, always delivered through the pixel's custom-event call
pub fn build_custom_event(name: &str, params: Extensions) -> TrackedEvent {
    TrackedEvent::new(
        EventName::Custom(name.to_string()),
        UserData::default(),
        CustomData::Custom(params),
    )
}

/// Page-view event for a route found in the route table
pub fn build_page_view_event(descriptor: &RouteTrackingDescriptor) -> TrackedEvent {
    TrackedEvent::new(
        descriptor.event_kind().event_name(),
        UserData::default(),
        CustomData::Content(ContentData {
            content_name: descriptor.content_name().to_string(),
            content_category: descriptor.content_category().to_string(),
            content_ids: descriptor.content_ids().to_vec(),
            extra: Extensions::new(),
        }),
    )
}

/// ViewContent for one data entity (a university, a destination) on a dynamic page
pub fn build_entity_view_event(entity_type: &str, entity_id: &str, entity_name: &str) -> TrackedEvent {
    TrackedEvent::new(
        EventName::ViewContent,
        UserData::default(),
        CustomData::Content(ContentData {
            content_name: format!("{}: {}", entity_type, entity_name),
            content_category: entity_type.to_string(),
            content_ids: vec![entity_id.to_string()],
            extra: Extensions::new(),
        }),
    )
}

/// Conventional conversion id for a lead: `lead_<epoch-millis>`
///
/// Not collision-proof under double submission within the same millisecond.
pub fn lead_transaction_id(at: DateTime<Utc>) -> String {
    format!("lead_{}", at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RouteEventKind;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_lead_event_defaults_on_empty_input() {
        let event = build_lead_event(LeadFields::default());

        assert_eq!(event.name(), &EventName::Lead);
        assert!(event.user_data().is_empty());
        match event.custom_data() {
            CustomData::Lead(data) => {
                assert_eq!(data.content_category, "Education");
                assert_eq!(data.value, 1.0);
                assert_eq!(data.currency, "USD");
                assert!(data.content_name.is_none());
            }
            other => panic!("expected lead data, got {:?}", other),
        }
    }

    #[test]
    fn test_lead_event_keeps_caller_values() {
        let mut extra = Extensions::new();
        extra.insert("destination".to_string(), "Canada".into());
        extra.insert("study_level".to_string(), "Postgraduate".into());

        let event = build_lead_event(LeadFields {
            user_data: UserData {
                email: Some("bikash@example.com".to_string()),
                ..Default::default()
            },
            content_name: Some("Free Consultation".to_string()),
            content_category: Some("Consultation".to_string()),
            value: Some(25.0),
            currency: Some("NPR".to_string()),
            extra,
        });

        let params = event.custom_data().to_params().unwrap();
        assert_eq!(params["content_name"], json!("Free Consultation"));
        assert_eq!(params["content_category"], json!("Consultation"));
        assert_eq!(params["value"], json!(25.0));
        assert_eq!(params["currency"], json!("NPR"));
        assert_eq!(params["destination"], json!("Canada"));
        assert_eq!(params["study_level"], json!("Postgraduate"));
        assert_eq!(event.user_data().email.as_deref(), Some("bikash@example.com"));
    }

    #[test]
    fn test_negative_value_is_clamped() {
        let event = build_lead_event(LeadFields {
            value: Some(-5.0),
            ..Default::default()
        });
        let params = event.custom_data().to_params().unwrap();
        assert_eq!(params["value"], json!(0.0));

        let event = build_add_to_cart_event(AddToCartFields {
            value: Some(f64::NAN),
            ..Default::default()
        });
        let params = event.custom_data().to_params().unwrap();
        assert_eq!(params["value"], json!(0.0));
    }

    #[test]
    fn test_form_submission_defaults() {
        let event = build_form_submission_event(FormSubmissionFields::default());
        assert_eq!(event.name(), &EventName::CompleteRegistration);

        let params = event.custom_data().to_params().unwrap();
        assert_eq!(params["form_name"], json!("Contact Form"));
        assert_eq!(params["form_type"], json!("Lead Generation"));
    }

    #[test]
    fn test_conversion_defaults_to_purchase() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let event = build_conversion_event(ConversionFields {
            transaction_id: Some(lead_transaction_id(at)),
            ..Default::default()
        });

        assert_eq!(event.name(), &EventName::Purchase);
        let params = event.custom_data().to_params().unwrap();
        assert_eq!(params["transaction_id"], json!("lead_1748764800000"));
        assert_eq!(params["currency"], json!("USD"));
    }

    #[test]
    fn test_conversion_extension_cannot_override_value() {
        let mut extra = Extensions::new();
        extra.insert("value".to_string(), 5000.0_f64.into());
        extra.insert("transaction_id".to_string(), "forged".into());
        let event = build_conversion_event(ConversionFields {
            value: Some(50.0),
            extra,
            ..Default::default()
        });

        let params = event.custom_data().to_params().unwrap();
        assert_eq!(params["value"], json!(50.0));
        assert!(!params.contains_key("transaction_id"));
    }

    #[test]
    fn test_conversion_custom_name() {
        let event = build_conversion_event(ConversionFields {
            event_name: Some("ApplicationSubmitted".to_string()),
            ..Default::default()
        });
        assert_eq!(
            event.name(),
            &EventName::Custom("ApplicationSubmitted".to_string())
        );
    }

    #[test]
    fn test_configured_defaults_apply() {
        let defaults = EventDefaults {
            currency: "AUD".to_string(),
            content_category: "Study Abroad".to_string(),
            ..Default::default()
        };
        let params = defaults
            .lead_event(LeadFields::default())
            .custom_data()
            .to_params()
            .unwrap();
        assert_eq!(params["currency"], json!("AUD"));
        assert_eq!(params["content_category"], json!("Study Abroad"));
    }

    #[test]
    fn test_page_view_event_from_descriptor() {
        let descriptor = RouteTrackingDescriptor::new(
            RouteEventKind::ViewContent,
            "Contact Page",
            "Lead Generation",
            vec!["contact".to_string()],
        )
        .unwrap();

        let event = build_page_view_event(&descriptor);
        assert_eq!(event.name(), &EventName::ViewContent);
        let params = event.custom_data().to_params().unwrap();
        assert_eq!(params["content_name"], json!("Contact Page"));
        assert_eq!(params["content_category"], json!("Lead Generation"));
        assert_eq!(params["content_ids"], json!(["contact"]));
    }

    #[test]
    fn test_entity_view_event_naming() {
        let event = build_entity_view_event("University", "uni-42", "University of Sydney");
        let params = event.custom_data().to_params().unwrap();
        assert_eq!(params["content_name"], json!("University: University of Sydney"));
        assert_eq!(params["content_ids"], json!(["uni-42"]));
    }

    #[test]
    fn test_lead_fields_deserialize_with_extensions() {
        let fields: LeadFields = serde_json::from_value(json!({
            "user_data": { "email": "a@b.co" },
            "value": 3,
            "program_type": "MBA"
        }))
        .unwrap();

        assert_eq!(fields.user_data.email.as_deref(), Some("a@b.co"));
        assert_eq!(fields.value, Some(3.0));
        assert_eq!(fields.extra.len(), 1);
        assert!(fields.extra.contains_key("program_type"));
    }
}
