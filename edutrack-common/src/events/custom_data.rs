//! Event-specific attributes, one variant per event kind

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::debug;

/// Flat parameter value accepted by the pixel and the data layer
///
/// Nested objects are not representable on purpose: the pixel only takes
/// primitives and string arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

/// Open extension map for free-form marketing attributes
pub type Extensions = BTreeMap<String, ParamValue>;

/// Flattened parameter object as handed to sinks
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Content descriptor used by page views, ViewContent and route events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentData {
    pub content_name: String,
    pub content_category: String,
    pub content_ids: Vec<String>,
    #[serde(skip)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_name: Option<String>,
    pub content_category: String,
    pub value: f64,
    pub currency: String,
    #[serde(skip)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSubmissionData {
    pub form_name: String,
    pub form_type: String,
    #[serde(skip)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchData {
    pub search_string: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_category: Option<String>,
    #[serde(skip)]
    pub extra: Extensions,
}

/// Interest in a specific program or university ("add to shortlist")
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddToCartData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content_ids: Vec<String>,
    pub value: f64,
    pub currency: String,
    #[serde(skip)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionData {
    pub value: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_name: Option<String>,
    #[serde(skip)]
    pub extra: Extensions,
}

/// Event-specific attributes
///
/// Serializes as one flat object: the variant tag never appears on the wire.
/// Extension keys that name a typed field of the variant are dropped, so
/// the typed field always wins, whether or not it is set.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomData {
    Content(ContentData),
    Lead(LeadData),
    FormSubmission(FormSubmissionData),
    Search(SearchData),
    AddToCart(AddToCartData),
    Conversion(ConversionData),
    Custom(Extensions),
}

impl CustomData {
    /// Flatten into the parameter object handed to sinks
    pub fn to_params(&self) -> crate::Result<Params> {
        let (typed, reserved) = match self {
            CustomData::Content(d) => (serde_json::to_value(d)?, CONTENT_FIELDS),
            CustomData::Lead(d) => (serde_json::to_value(d)?, LEAD_FIELDS),
            CustomData::FormSubmission(d) => (serde_json::to_value(d)?, FORM_FIELDS),
            CustomData::Search(d) => (serde_json::to_value(d)?, SEARCH_FIELDS),
            CustomData::AddToCart(d) => (serde_json::to_value(d)?, ADD_TO_CART_FIELDS),
            CustomData::Conversion(d) => (serde_json::to_value(d)?, CONVERSION_FIELDS),
            CustomData::Custom(_) => (serde_json::Value::Object(Params::new()), &[][..]),
        };
        let mut params = match typed {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(crate::Error::Internal(format!(
                    "custom data serialized to non-object: {}",
                    other
                )))
            }
        };

        for (key, value) in self.extra() {
            if reserved.contains(&key.as_str()) {
                debug!("Dropping extension key {} shadowing a typed field", key);
                continue;
            }
            params.insert(key.clone(), serde_json::to_value(value)?);
        }
        Ok(params)
    }

    /// Free-form extension fields of this event
    pub fn extra(&self) -> &Extensions {
        match self {
            CustomData::Content(d) => &d.extra,
            CustomData::Lead(d) => &d.extra,
            CustomData::FormSubmission(d) => &d.extra,
            CustomData::Search(d) => &d.extra,
            CustomData::AddToCart(d) => &d.extra,
            CustomData::Conversion(d) => &d.extra,
            CustomData::Custom(extra) => extra,
        }
    }
}

const CONTENT_FIELDS: &[&str] = &["content_name", "content_category", "content_ids"];
const LEAD_FIELDS: &[&str] = &["content_name", "content_category", "value", "currency"];
const FORM_FIELDS: &[&str] = &["form_name", "form_type"];
const SEARCH_FIELDS: &[&str] = &["search_string", "content_category"];
const ADD_TO_CART_FIELDS: &[&str] = &["content_name", "content_ids", "value", "currency"];
const CONVERSION_FIELDS: &[&str] = &["value", "currency", "transaction_id", "content_name"];

impl Serialize for CustomData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_params()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
