//! Explicit tracking calls made by pages

use edutrack_common::config::TomlConfig;
use edutrack_common::events::{
    AddToCartFields, ConversionFields, Extensions, FormSubmissionFields, LeadFields,
    SearchFields, UserData, ViewContentFields,
};
use edutrack_tracker::{ConsentGatedPixel, DataLayer, NoopPixel, RecordingPixel, RouteTable, Tracker};
use serde_json::json;
use std::sync::Arc;

fn tracker_with(config: &TomlConfig) -> (Tracker, Arc<DataLayer>, Arc<RecordingPixel>) {
    let pixel = Arc::new(RecordingPixel::new());
    let layer = Arc::new(DataLayer::default());
    let routes = Arc::new(RouteTable::from_config(config).unwrap());
    let tracker = Tracker::from_config(config, routes, pixel.clone(), layer.clone());
    (tracker, layer, pixel)
}

#[test]
fn test_lead_with_no_fields() {
    let (tracker, layer, pixel) = tracker_with(&TomlConfig::default());

    tracker.track_lead(LeadFields::default());

    let record = &layer.snapshot()[0];
    assert_eq!(record.event_name, "Lead");
    assert_eq!(record.custom_data["content_category"], "Education");
    assert_eq!(record.custom_data["value"], json!(1.0));
    assert_eq!(record.custom_data["currency"], "USD");
    assert!(record.user_data.is_empty());

    let call = &pixel.calls()[0];
    assert_eq!(call.event_name, "Lead");
    assert!(!call.custom);
}

#[test]
fn test_full_set_of_tracking_calls() {
    let (tracker, layer, pixel) = tracker_with(&TomlConfig::default());

    tracker.track_form_submission(FormSubmissionFields {
        user_data: UserData {
            email: Some("ram@example.com".to_string()),
            phone: Some("+977 9800000000".to_string()),
            first_name: Some("Ram".to_string()),
            ..Default::default()
        },
        form_name: Some("Free Counselling".to_string()),
        ..Default::default()
    });
    tracker.track_search(SearchFields {
        search_string: "nursing in australia".to_string(),
        content_category: Some("Programs".to_string()),
        ..Default::default()
    });
    tracker.track_add_to_cart(AddToCartFields {
        content_name: Some("MSc Data Science".to_string()),
        content_ids: vec!["prog-19".to_string()],
        ..Default::default()
    });
    tracker.track_conversion(ConversionFields {
        transaction_id: Some("lead_1700000000000".to_string()),
        value: Some(50.0),
        ..Default::default()
    });
    tracker.track_view_content(ViewContentFields {
        content_name: "Scholarship Guide".to_string(),
        content_ids: vec!["guide-1".to_string()],
        ..Default::default()
    });
    let mut params = Extensions::new();
    params.insert("source".to_string(), "whatsapp".into());
    tracker.track_custom_event("ChatOpened", params);

    let names: Vec<_> = layer.snapshot().into_iter().map(|r| r.event_name).collect();
    assert_eq!(
        names,
        vec![
            "CompleteRegistration",
            "Search",
            "AddToCart",
            "Purchase",
            "ViewContent",
            "ChatOpened"
        ]
    );

    let records = layer.snapshot();
    assert_eq!(records[0].custom_data["form_name"], "Free Counselling");
    assert_eq!(records[0].custom_data["form_type"], "Lead Generation");
    assert_eq!(records[0].user_data.first_name.as_deref(), Some("Ram"));
    assert_eq!(records[1].custom_data["search_string"], "nursing in australia");
    assert_eq!(records[2].custom_data["content_ids"], json!(["prog-19"]));
    assert_eq!(records[3].custom_data["transaction_id"], "lead_1700000000000");
    assert_eq!(records[4].custom_data["content_category"], "Education");
    assert_eq!(records[5].custom_data["source"], "whatsapp");

    let calls = pixel.calls();
    assert_eq!(calls.len(), 6);
    assert!(calls[5].custom, "ChatOpened goes through the custom-event call");
}

#[test]
fn test_immediate_page_view() {
    let (tracker, layer, _pixel) = tracker_with(&TomlConfig::default());

    assert!(tracker.track_page_view("/about").is_some());
    assert!(tracker.track_page_view("/not-a-page").is_none());
    assert_eq!(layer.len(), 1);
}

#[test]
fn test_configured_defaults_and_event_key() {
    let config = TomlConfig::from_toml_str(
        r#"
        [tracking]
        default_currency = "GBP"
        settle_delay_ms = 300

        [data_layer]
        event_key = "capi_event"
        "#,
    )
    .unwrap();
    let (tracker, layer, _pixel) = tracker_with(&config);

    assert_eq!(tracker.settle_delay().as_millis(), 300);
    tracker.track_lead(LeadFields::default());

    let record = &layer.snapshot()[0];
    assert_eq!(record.event, "capi_event");
    assert_eq!(record.custom_data["currency"], "GBP");
}

#[test]
fn test_revoked_consent_still_appends() {
    let config = TomlConfig::default();
    let inner = Arc::new(RecordingPixel::new());
    let gated = Arc::new(ConsentGatedPixel::new(inner.clone(), false));
    let layer = Arc::new(DataLayer::default());
    let routes = Arc::new(RouteTable::from_config(&config).unwrap());
    let tracker = Tracker::from_config(&config, routes, gated.clone(), layer.clone());

    tracker.track_lead(LeadFields::default());
    assert_eq!(layer.len(), 1);
    assert!(inner.calls().is_empty());

    gated.set_consent(true);
    tracker.track_lead(LeadFields::default());
    assert_eq!(layer.len(), 2);
    assert_eq!(inner.calls().len(), 1);
}

#[test]
fn test_global_data_layer_tracker() {
    let tracker = Tracker::with_global_data_layer(Arc::new(NoopPixel)).unwrap();
    let before = DataLayer::global().len();

    tracker.track_lead(LeadFields::default());

    assert!(DataLayer::global().len() > before);
}
