//! ACORD XML generation.
//!
//! Output shape:
//!
//! ```text
//! <ACORD xmlns="http://www.acord.org/standards">
//!   <InsuranceSvcRq><QuoteRq>
//!     <Insured>Name FirstName Email Phone</Insured>
//!     <Policy>PolicyType QuoteAmount Source</Policy>
//!     <Vehicle>VIN Make Model Year</Vehicle>   (only with vehicle data)
//!   </QuoteRq></InsuranceSvcRq>
//! </ACORD>
//! ```
//!
//! The document is written on one line with no declaration. Empty values are
//! written as `<Tag></Tag>`.

use std::borrow::Cow;

use crate::mapping::FieldMap;
use crate::models::{InputLayout, QuoteInput};

pub const ACORD_NAMESPACE: &str = "http://www.acord.org/standards";

/// Stateless quote → ACORD XML transformer, one field map per payload shape.
#[derive(Debug, Clone)]
pub struct AcordTransformer {
    flat: FieldMap,
    nested: FieldMap,
}

impl Default for AcordTransformer {
    fn default() -> Self {
        Self::new(FieldMap::flat(), FieldMap::nested())
    }
}

impl AcordTransformer {
    pub fn new(flat: FieldMap, nested: FieldMap) -> Self {
        Self { flat, nested }
    }

    pub fn field_map(&self, layout: InputLayout) -> &FieldMap {
        match layout {
            InputLayout::Flat => &self.flat,
            InputLayout::Nested => &self.nested,
        }
    }

    /// Renders `input` as an ACORD document. Never fails: missing fields take their defaults.
    pub fn transform(&self, input: &QuoteInput) -> String {
        render(self.field_map(input.layout()), input)
    }
}

/// Transforms with the default field maps.
pub fn transform(input: &QuoteInput) -> String {
    AcordTransformer::default().transform(input)
}

fn render(map: &FieldMap, input: &QuoteInput) -> String {
    let mut xml = String::with_capacity(512);

    xml.push_str("<ACORD xmlns=\"");
    xml.push_str(&escape_attr(ACORD_NAMESPACE));
    xml.push_str("\"><InsuranceSvcRq><QuoteRq>");

    for section in map.sections.iter().filter(|s| s.is_present(input)) {
        open_tag(&mut xml, &section.element);
        for field in &section.fields {
            let value = field.resolve(input).unwrap_or_default();
            open_tag(&mut xml, &field.element);
            xml.push_str(&escape_text(&value));
            close_tag(&mut xml, &field.element);
        }
        close_tag(&mut xml, &section.element);
    }

    xml.push_str("</QuoteRq></InsuranceSvcRq></ACORD>");
    xml
}

fn open_tag(xml: &mut String, name: &str) {
    xml.push('<');
    xml.push_str(name);
    xml.push('>');
}

fn close_tag(xml: &mut String, name: &str) {
    xml.push_str("</");
    xml.push_str(name);
    xml.push('>');
}

/// Escapes `&`, `<` and `>` for use as element text.
pub fn escape_text(value: &str) -> Cow<'_, str> {
    escape(value, false)
}

/// Escapes `&`, `<`, `>` and `"` for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> Cow<'_, str> {
    escape(value, true)
}

fn escape(value: &str, quotes: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '&' | '<' | '>') || (quotes && c == '"');
    if !value.contains(needs_escape) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if quotes => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn input(value: Value) -> QuoteInput {
        QuoteInput::try_from(value).unwrap()
    }

    #[test]
    fn test_full_flat_quote() {
        let xml = transform(&input(json!({
            "first_name": "John",
            "last_name": "Doe",
            "email": "john.doe@example.com",
            "phone": "123-456-7890",
            "source": "online",
            "quote_amount": 1500.00,
            "policy_type": "auto",
            "vehicle": {
                "vin": "1HGCM82633A004352",
                "make": "Honda",
                "model": "Accord",
                "year": 2020
            }
        })));

        assert_eq!(
            xml,
            "<ACORD xmlns=\"http://www.acord.org/standards\"><InsuranceSvcRq><QuoteRq>\
             <Insured><Name>Doe</Name><FirstName>John</FirstName>\
             <Email>john.doe@example.com</Email><Phone>123-456-7890</Phone></Insured>\
             <Policy><PolicyType>auto</PolicyType><QuoteAmount>1500.0</QuoteAmount>\
             <Source>online</Source></Policy>\
             <Vehicle><VIN>1HGCM82633A004352</VIN><Make>Honda</Make><Model>Accord</Model>\
             <Year>2020</Year></Vehicle>\
             </QuoteRq></InsuranceSvcRq></ACORD>"
        );
    }

    #[test]
    fn test_incomplete_flat_quote_uses_defaults() {
        let xml = transform(&input(json!({"last_name": "Smith", "source": "online"})));

        assert!(xml.contains("<Name>Smith</Name><FirstName></FirstName>"));
        assert!(xml.contains("<Email></Email><Phone></Phone>"));
        assert!(xml.contains("<PolicyType>auto</PolicyType>"));
        assert!(xml.contains("<QuoteAmount>0</QuoteAmount>"));
        assert!(!xml.contains("<Vehicle>"));
    }

    #[test]
    fn test_empty_input_defaults() {
        let xml = transform(&input(json!({})));
        assert!(xml.contains("<Name>Unknown</Name>"));
        assert!(xml.contains("<Source>online</Source>"));
        assert!(!xml.contains("Vehicle"));
    }

    #[test]
    fn test_nested_quote_uses_first_vehicle_only() {
        let xml = transform(&input(json!({
            "location": {
                "firstName": "Ana",
                "lastName": "Lima",
                "email": "ana@example.com",
                "phone": "555-0100",
                "source": "online"
            },
            "quote": {"totalAmount": 899.5},
            "vehicles": [
                {"vinNumber": "VIN-A", "makeDescription": "Ford", "modelDescription": "Focus", "year": 2018},
                {"vinNumber": "VIN-B", "makeDescription": "Kia", "modelDescription": "Rio", "year": 2021}
            ]
        })));

        assert!(xml.contains("<Name>Lima</Name><FirstName>Ana</FirstName>"));
        assert!(xml.contains("<QuoteAmount>899.5</QuoteAmount>"));
        assert!(xml.contains("<PolicyType>auto</PolicyType>"));
        assert!(xml.contains(
            "<Vehicle><VIN>VIN-A</VIN><Make>Ford</Make><Model>Focus</Model><Year>2018</Year></Vehicle>"
        ));
        assert!(!xml.contains("VIN-B"));
        assert_eq!(xml.matches("<Vehicle>").count(), 1);
    }

    #[test]
    fn test_nested_source_is_not_copied_from_input() {
        let xml = transform(&input(json!({"location": {"source": "kiosk"}})));
        assert!(xml.contains("<Source>online</Source>"));
        assert!(!xml.contains("kiosk"));
    }

    #[test]
    fn test_empty_vehicle_list_omits_vehicle() {
        let xml = transform(&input(json!({"location": {}, "vehicles": []})));
        assert!(!xml.contains("Vehicle"));
    }

    #[test]
    fn test_string_amount_is_verbatim() {
        let xml = transform(&input(json!({"quote_amount": "1,250.00"})));
        assert!(xml.contains("<QuoteAmount>1,250.00</QuoteAmount>"));
    }

    #[test]
    fn test_values_are_escaped() {
        let xml = transform(&input(json!({
            "last_name": "O'Neil & <Sons>",
            "first_name": "\"Quoted\""
        })));
        assert!(xml.contains("<Name>O'Neil &amp; &lt;Sons&gt;</Name>"));
        assert!(xml.contains("<FirstName>\"Quoted\"</FirstName>"));
    }

    #[test]
    fn test_escape_attr_escapes_quotes() {
        assert_eq!(escape_attr("a\"b&c"), "a&quot;b&amp;c");
        assert_eq!(escape_text("a\"b"), "a\"b");
        assert!(matches!(escape_text("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_custom_field_map() {
        let transformer =
            AcordTransformer::new(FieldMap::flat().with_default("PolicyType", "home"), FieldMap::nested());
        let xml = transformer.transform(&input(json!({"source": "online"})));
        assert!(xml.contains("<PolicyType>home</PolicyType>"));
    }
}
