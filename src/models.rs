use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Top-level keys that only appear in the nested (location/quote/vehicles) payload shape.
const NESTED_MARKERS: [&str; 3] = ["location", "quote", "vehicles"];

/// Wire shape of a quote submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputLayout {
    /// `first_name`, `last_name`, `source`, `vehicle {..}` at the top level.
    Flat,
    /// `location {..}`, `quote {..}`, `vehicles [..]`.
    Nested,
}

impl fmt::Display for InputLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputLayout::Flat => write!(f, "flat"),
            InputLayout::Nested => write!(f, "nested"),
        }
    }
}

/// A decoded quote submission.
///
/// Kept as a JSON object rather than a typed struct: every field is optional and
/// the two payload shapes are resolved through the field mapping tables.
/// Deserializing anything other than a JSON object fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteInput(Map<String, Value>);

impl QuoteInput {
    /// Detects which payload shape this submission uses.
    pub fn layout(&self) -> InputLayout {
        if NESTED_MARKERS.iter().any(|key| self.0.contains_key(*key)) {
            InputLayout::Nested
        } else {
            InputLayout::Flat
        }
    }

    /// Resolves a dotted path such as `location.firstName` or `vehicles.0.year`.
    ///
    /// Object segments are looked up by key, array segments by numeric index.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;

        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Top-level field names, for audit logging without dumping contact data.
    pub fn summary(&self) -> String {
        let keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        format!("layout={} fields=[{}]", self.layout(), keys.join(", "))
    }
}

impl From<Map<String, Value>> for QuoteInput {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for QuoteInput {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

/// A quote accepted through the online channel, as held by the quote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuote {
    pub id: String,
    pub xml: String,
    /// RFC 3339 UTC timestamp of acceptance.
    pub timestamp: String,
    pub raw_input: QuoteInput,
}

impl StoredQuote {
    /// Builds a record stamped with the current time.
    pub fn new(id: String, xml: String, raw_input: QuoteInput) -> Self {
        Self {
            id,
            xml,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            raw_input,
        }
    }
}

/// Body returned for an accepted quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub status: String,
    pub data: AcceptedQuote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedQuote {
    pub quote_id: String,
    pub xml: String,
    pub message: String,
}

/// Body returned when a quote is not from the online channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoredResponse {
    pub status: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> QuoteInput {
        QuoteInput::try_from(value).unwrap()
    }

    #[test]
    fn test_layout_detection() {
        assert_eq!(
            input(json!({"first_name": "John", "source": "online"})).layout(),
            InputLayout::Flat
        );
        assert_eq!(
            input(json!({"location": {"firstName": "John"}})).layout(),
            InputLayout::Nested
        );
        assert_eq!(input(json!({"vehicles": []})).layout(), InputLayout::Nested);
        assert_eq!(input(json!({})).layout(), InputLayout::Flat);
    }

    #[test]
    fn test_lookup_traverses_objects_and_arrays() {
        let quote = input(json!({
            "location": {"lastName": "Doe"},
            "vehicles": [{"vinNumber": "VIN1"}, {"vinNumber": "VIN2"}]
        }));

        assert_eq!(quote.lookup("location.lastName"), Some(&json!("Doe")));
        assert_eq!(quote.lookup("vehicles.0.vinNumber"), Some(&json!("VIN1")));
        assert_eq!(quote.lookup("vehicles.1.vinNumber"), Some(&json!("VIN2")));
        assert_eq!(quote.lookup("vehicles.2.vinNumber"), None);
        assert_eq!(quote.lookup("vehicles.first.vinNumber"), None);
        assert_eq!(quote.lookup("location.lastName.extra"), None);
        assert_eq!(quote.lookup("missing"), None);
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(QuoteInput::try_from(json!([1, 2, 3])).is_err());
        assert!(QuoteInput::try_from(json!("online")).is_err());
        assert!(QuoteInput::try_from(json!(null)).is_err());
    }

    #[test]
    fn test_summary_lists_keys_not_values() {
        let quote = input(json!({"email": "john.doe@example.com", "source": "online"}));
        let summary = quote.summary();
        assert!(summary.contains("layout=flat"));
        assert!(summary.contains("email"));
        assert!(!summary.contains("john.doe@example.com"));
    }

    #[test]
    fn test_stored_quote_timestamp_is_rfc3339() {
        let record = StoredQuote::new("id-1".to_string(), "<ACORD/>".to_string(), input(json!({})));
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
        assert!(record.timestamp.ends_with('Z'));
    }
}
