//! Document -> existing settings, in place.
//!
//! Population walks the document, not the schema:
//!
//! 1. each field is matched against the members' serialized names (exact,
//!    case-sensitive)
//! 2. unknown fields are skipped
//! 3. matched fields are decoded with the member's converter, serde, or the
//!    section's own schema, and applied only when the value differs
//!
//! Members without a field keep their current value. A decode failure stops the
//! walk; fields before it stay applied and are reported as changed, including
//! the fields of a section that failed partway through.

use serde_json::Value;

use crate::codec::Document;
use crate::error::Result;
use crate::inventory::{Schema, Settings};
use crate::member::MemberDescriptor;

/// Outcome of a successful populate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Document fields that matched a member.
    pub applied: usize,
    /// Members whose value changed, in document order.
    pub changed: Vec<&'static str>,
    /// Document fields with no matching member.
    pub skipped: Vec<String>,
}

/// Apply `document` onto `settings` without replacing it.
pub fn populate<S: Settings>(
    schema: &Schema<S>,
    settings: &mut S,
    document: &Document,
) -> Result<PopulateReport> {
    populate_members(schema, settings, document.fields(), &mut |_| {})
}

/// Walk `fields`, calling `on_change` as soon as each member changes.
pub(crate) fn populate_members<'a, S: Settings>(
    schema: &Schema<S>,
    settings: &mut S,
    fields: impl IntoIterator<Item = (&'a str, &'a Value)>,
    on_change: &mut dyn FnMut(&MemberDescriptor),
) -> Result<PopulateReport> {
    let mut report = PopulateReport::default();

    for (name, value) in fields {
        let Some(member) = schema.find_serialized(name) else {
            tracing::debug!("Skipping unknown field '{}' for {}", name, schema.type_name());
            report.skipped.push(name.to_string());
            continue;
        };

        report.applied += 1;
        let decoded = member.access.decode_into(name, settings, value);
        if decoded.changed {
            report.changed.push(member.descriptor.name);
            on_change(&member.descriptor);
        }
        decoded.result?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettingsError;
    use crate::filter::{Member, Section};
    use crate::inventory::{SchemaBuilder, inventory};
    use crate::field;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Window {
        width: u32,
        height: u32,
    }

    impl Settings for Window {
        fn declare(schema: &mut SchemaBuilder<Self>) {
            schema.field(field!(Window, width)).field(field!(Window, height));
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Sample {
        count: i32,
        title: String,
        hidden: String,
        window: Window,
    }

    impl Settings for Sample {
        fn declare(schema: &mut SchemaBuilder<Self>) {
            schema
                .field(field!(Sample, count))
                .member(Member::new(field!(Sample, title)).rename("Title"))
                .member(Member::new(field!(Sample, hidden)).ignore())
                .section(Section::new(field!(Sample, window)));
        }
    }

    fn sample() -> Sample {
        Sample {
            count: 5,
            title: "Hello World".into(),
            hidden: "keep".into(),
            window: Window {
                width: 800,
                height: 600,
            },
        }
    }

    fn document(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => Document::from_map(map),
            _ => unreachable!("test documents are objects"),
        }
    }

    #[test]
    fn test_missing_fields_are_left_untouched() {
        let schema = inventory::<Sample>().unwrap();
        let mut settings = sample();

        let report = populate(schema, &mut settings, &document(json!({ "count": 13 }))).unwrap();

        assert_eq!(settings.count, 13);
        assert_eq!(settings.title, "Hello World");
        assert_eq!(report.changed, ["count"]);
    }

    #[test]
    fn test_unknown_and_ignored_fields_are_skipped() {
        let schema = inventory::<Sample>().unwrap();
        let mut settings = sample();

        let report = populate(
            schema,
            &mut settings,
            &document(json!({ "future": true, "hidden": "overwritten", "title": "wrong case" })),
        )
        .unwrap();

        assert_eq!(settings, sample());
        assert_eq!(report.applied, 0);
        assert_eq!(report.skipped, ["future", "hidden", "title"]);
    }

    #[test]
    fn test_equal_values_are_not_reported_as_changes() {
        let schema = inventory::<Sample>().unwrap();
        let mut settings = sample();

        let report = populate(schema, &mut settings, &document(json!({ "count": 5 }))).unwrap();

        assert_eq!(report.applied, 1);
        assert!(report.changed.is_empty());
    }

    #[test]
    fn test_sections_populate_in_place() {
        let schema = inventory::<Sample>().unwrap();
        let mut settings = sample();

        let report = populate(
            schema,
            &mut settings,
            &document(json!({ "window": { "height": 1080, "depth": 3 } })),
        )
        .unwrap();

        assert_eq!(settings.window, Window { width: 800, height: 1080 });
        assert_eq!(report.changed, ["window"]);
    }

    #[test]
    fn test_failure_keeps_earlier_fields() {
        let schema = inventory::<Sample>().unwrap();
        let mut settings = sample();
        let mut seen = Vec::new();

        let err = populate_members(
            schema,
            &mut settings,
            document(json!({ "count": 7, "Title": 42, "window": { "width": 1 } })).fields(),
            &mut |d| seen.push(d.name()),
        )
        .unwrap_err();

        assert!(matches!(err, SettingsError::Decode { .. }));
        assert_eq!(err.member(), Some("Title"));
        assert_eq!(settings.count, 7);
        assert_eq!(settings.title, "Hello World");
        assert_eq!(settings.window.width, 800);
        assert_eq!(seen, ["count"]);
    }

    #[test]
    fn test_section_type_mismatch() {
        let schema = inventory::<Sample>().unwrap();
        let mut settings = sample();

        let err = populate(schema, &mut settings, &document(json!({ "window": null }))).unwrap_err();
        assert_eq!(err.member(), Some("window"));
    }

    #[test]
    fn test_nested_decode_failure_path() {
        let schema = inventory::<Sample>().unwrap();
        let mut settings = sample();

        let err = populate(
            schema,
            &mut settings,
            &document(json!({ "window": { "width": "wide" } })),
        )
        .unwrap_err();
        assert_eq!(err.member(), Some("window.width"));
    }

    #[test]
    fn test_partly_applied_section_is_reported() {
        let schema = inventory::<Sample>().unwrap();
        let mut settings = sample();
        let mut seen = Vec::new();

        let err = populate_members(
            schema,
            &mut settings,
            document(json!({ "window": { "width": 1, "height": "tall" } })).fields(),
            &mut |d| seen.push(d.name()),
        )
        .unwrap_err();

        assert_eq!(err.member(), Some("window.height"));
        assert_eq!(settings.window.width, 1);
        assert_eq!(seen, ["window"]);
    }
}
