//! Field mapping tables from ACORD elements to quote input paths.
//!
//! Each payload shape gets one [`FieldMap`]: an ordered list of output sections,
//! each listing its elements with candidate input paths and a default. The XML
//! transformer walks the table; it has no per-shape extraction code of its own.

use crate::models::{InputLayout, QuoteInput};
use serde_json::Value;

/// One output element and where its value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    /// ACORD element name.
    pub element: String,
    /// Dotted input paths, tried in order. The first one holding a scalar wins.
    pub paths: Vec<String>,
    /// Value used when no candidate path resolves. `None` leaves the field unresolved.
    pub default: Option<String>,
}

impl FieldRule {
    pub fn new(element: &str, paths: &[&str], default: Option<&str>) -> Self {
        Self {
            element: element.to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
            default: default.map(str::to_string),
        }
    }

    /// Resolves the rule against an input: first present candidate, else the default.
    pub fn resolve(&self, input: &QuoteInput) -> Option<String> {
        self.paths
            .iter()
            .find_map(|path| input.lookup(path).and_then(scalar_text))
            .or_else(|| self.default.clone())
    }
}

/// A group of elements under one parent, e.g. `Insured` or `Vehicle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRule {
    pub element: String,
    /// Path that must hold a JSON object for the section to be emitted.
    /// `None` means the section is always emitted.
    pub presence: Option<String>,
    pub fields: Vec<FieldRule>,
}

impl SectionRule {
    pub fn new(element: &str, presence: Option<&str>, fields: Vec<FieldRule>) -> Self {
        Self {
            element: element.to_string(),
            presence: presence.map(str::to_string),
            fields,
        }
    }

    pub fn is_present(&self, input: &QuoteInput) -> bool {
        match &self.presence {
            None => true,
            Some(path) => matches!(input.lookup(path), Some(Value::Object(_))),
        }
    }
}

/// Complete mapping for one payload shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    pub layout: InputLayout,
    /// Rule that yields the submission channel checked by the dispatcher.
    pub channel: FieldRule,
    pub sections: Vec<SectionRule>,
}

impl FieldMap {
    /// Mapping for flat payloads (`first_name`, `vehicle.vin`, ...).
    ///
    /// The channel has no default here: a flat payload without `source` is not online.
    pub fn flat() -> Self {
        Self {
            layout: InputLayout::Flat,
            channel: FieldRule::new("Source", &["source"], None),
            sections: vec![
                SectionRule::new(
                    "Insured",
                    None,
                    vec![
                        FieldRule::new("Name", &["last_name"], Some("Unknown")),
                        FieldRule::new("FirstName", &["first_name"], Some("")),
                        FieldRule::new("Email", &["email"], Some("")),
                        FieldRule::new("Phone", &["phone"], Some("")),
                    ],
                ),
                SectionRule::new(
                    "Policy",
                    None,
                    vec![
                        FieldRule::new("PolicyType", &["policy_type"], Some("auto")),
                        FieldRule::new("QuoteAmount", &["quote_amount"], Some("0")),
                        FieldRule::new("Source", &["source"], Some("online")),
                    ],
                ),
                SectionRule::new(
                    "Vehicle",
                    Some("vehicle"),
                    vec![
                        FieldRule::new("VIN", &["vehicle.vin"], Some("")),
                        FieldRule::new("Make", &["vehicle.make"], Some("")),
                        FieldRule::new("Model", &["vehicle.model"], Some("")),
                        FieldRule::new("Year", &["vehicle.year"], Some("")),
                    ],
                ),
            ],
        }
    }

    /// Mapping for nested payloads (`location.*`, `quote.totalAmount`, `vehicles[0].*`).
    ///
    /// Policy type and source have no input path in this shape and are written as constants.
    pub fn nested() -> Self {
        Self {
            layout: InputLayout::Nested,
            channel: FieldRule::new("Source", &["location.source"], Some("online")),
            sections: vec![
                SectionRule::new(
                    "Insured",
                    None,
                    vec![
                        FieldRule::new("Name", &["location.lastName"], Some("Unknown")),
                        FieldRule::new("FirstName", &["location.firstName"], Some("")),
                        FieldRule::new("Email", &["location.email"], Some("")),
                        FieldRule::new("Phone", &["location.phone"], Some("")),
                    ],
                ),
                SectionRule::new(
                    "Policy",
                    None,
                    vec![
                        FieldRule::new("PolicyType", &[], Some("auto")),
                        FieldRule::new("QuoteAmount", &["quote.totalAmount"], Some("0")),
                        FieldRule::new("Source", &[], Some("online")),
                    ],
                ),
                SectionRule::new(
                    "Vehicle",
                    Some("vehicles.0"),
                    vec![
                        FieldRule::new("VIN", &["vehicles.0.vinNumber"], Some("")),
                        FieldRule::new("Make", &["vehicles.0.makeDescription"], Some("")),
                        FieldRule::new("Model", &["vehicles.0.modelDescription"], Some("")),
                        FieldRule::new("Year", &["vehicles.0.year"], Some("")),
                    ],
                ),
            ],
        }
    }

    pub fn for_layout(layout: InputLayout) -> Self {
        match layout {
            InputLayout::Flat => Self::flat(),
            InputLayout::Nested => Self::nested(),
        }
    }

    /// Overrides the default of every output element named `element`.
    pub fn with_default(mut self, element: &str, default: impl Into<String>) -> Self {
        let default = default.into();
        for field in self
            .sections
            .iter_mut()
            .flat_map(|section| section.fields.iter_mut())
            .filter(|field| field.element == element)
        {
            field.default = Some(default.clone());
        }
        self
    }

    /// Overrides the channel default used by the online gate.
    pub fn with_channel_default(mut self, default: Option<&str>) -> Self {
        self.channel.default = default.map(str::to_string);
        self
    }

    /// The submission channel of `input`, if one can be determined.
    pub fn channel(&self, input: &QuoteInput) -> Option<String> {
        self.channel.resolve(input)
    }
}

/// Text form of a scalar JSON value. Null, arrays and objects have none.
///
/// Numbers keep their JSON rendering, so `1500.00` becomes `1500.0` and `2000` stays `2000`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
