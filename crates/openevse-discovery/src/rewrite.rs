//! Key abbreviation rewriter.
//!
//! Renames every key of a discovery document to its compact form. The generic
//! table applies at every level, except the level reached directly through a
//! key named `device`, which uses the device table. Only the immediate parent
//! key decides; the path above it is not considered.
//!
//! Keys without an entry in the active table are kept as-is. Lists and scalar
//! values are never touched.

use serde_json::{Map, Value as JsonValue};

use crate::abbreviations::{AbbreviationTable, AbbreviationTables};
use crate::document::CanonicalDocument;

/// Key whose object value switches to the device table.
pub const DEVICE_KEY: &str = "device";

/// Rewrite `doc` into its abbreviated form.
pub fn abbreviate_document(
    doc: &CanonicalDocument,
    tables: &AbbreviationTables,
) -> CanonicalDocument {
    rewrite_level(doc, None, tables, |table, key| table.abbreviate(key), DEVICE_KEY)
}

/// Undo [`abbreviate_document`].
///
/// Context is taken from the canonical form of the parent key, so an
/// abbreviated `dev` object is expanded with the device table.
pub fn expand_document(
    doc: &CanonicalDocument,
    tables: &AbbreviationTables,
) -> CanonicalDocument {
    let device_abbr = tables.generic.abbreviate(DEVICE_KEY).unwrap_or(DEVICE_KEY);
    rewrite_level(doc, None, tables, |table, key| table.expand(key), device_abbr)
}

fn rewrite_level<'t, F>(
    doc: &Map<String, JsonValue>,
    parent_key: Option<&str>,
    tables: &'t AbbreviationTables,
    rename: F,
    device_key: &str,
) -> Map<String, JsonValue>
where
    F: Fn(&'t AbbreviationTable, &str) -> Option<&'t str> + Copy,
{
    let table = if parent_key == Some(device_key) {
        &tables.device
    } else {
        &tables.generic
    };

    doc.iter()
        .map(|(key, value)| {
            let new_key = rename(table, key).unwrap_or(key.as_str()).to_string();
            let new_value = match value {
                JsonValue::Object(child) => JsonValue::Object(rewrite_level(
                    child,
                    Some(key.as_str()),
                    tables,
                    rename,
                    device_key,
                )),
                other => other.clone(),
            };
            (new_key, new_value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: JsonValue) -> CanonicalDocument {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_top_level_and_device_tables() {
        let tables = AbbreviationTables::home_assistant();
        let canonical = doc(json!({
            "unique_id": "openevse-AABBCC-amp",
            "device": {
                "identifiers": ["AABBCC"],
                "manufacturer": "OpenEVSE LLC",
                "name": "OpenEVSE AABBCC"
            }
        }));

        let rewritten = abbreviate_document(&canonical, &tables);
        assert_eq!(
            JsonValue::Object(rewritten),
            json!({
                "uniq_id": "openevse-AABBCC-amp",
                "dev": {
                    "ids": ["AABBCC"],
                    "mf": "OpenEVSE LLC",
                    "name": "OpenEVSE AABBCC"
                }
            })
        );
    }

    #[test]
    fn test_same_key_differs_by_context() {
        let tables = AbbreviationTables::home_assistant();
        // `model` only has an entry in the device table, `unique_id` only in the generic one.
        let canonical = doc(json!({
            "model": "outer",
            "unique_id": "outer",
            "device": { "model": "inner", "unique_id": "inner" }
        }));

        let rewritten = abbreviate_document(&canonical, &tables);
        assert_eq!(rewritten["model"], "outer");
        assert_eq!(rewritten["uniq_id"], "outer");
        assert_eq!(rewritten["dev"]["mdl"], "inner");
        assert_eq!(rewritten["dev"]["unique_id"], "inner");
    }

    #[test]
    fn test_non_device_nesting_keeps_generic_table() {
        let tables = AbbreviationTables::home_assistant();
        let canonical = doc(json!({
            "availability": { "topic": "t", "identifiers": "x" }
        }));

        let rewritten = abbreviate_document(&canonical, &tables);
        assert_eq!(
            JsonValue::Object(rewritten),
            json!({ "avty": { "t": "t", "identifiers": "x" } })
        );
    }

    #[test]
    fn test_shallow_device_rule() {
        let tables = AbbreviationTables::home_assistant();
        // Any object found under a `device` key uses the device table, at any depth,
        // and the table resets to generic one level further down.
        let canonical = doc(json!({
            "json_attributes": {
                "device": { "serial_number": "1", "state_topic": "s" }
            },
            "device": {
                "hw_version": "1.0",
                "via": { "state_topic": "s", "model": "m" }
            }
        }));

        let rewritten = abbreviate_document(&canonical, &tables);
        assert_eq!(
            JsonValue::Object(rewritten),
            json!({
                "json_attr": {
                    "dev": { "sn": "1", "state_topic": "s" }
                },
                "dev": {
                    "hw": "1.0",
                    "via": { "stat_t": "s", "model": "m" }
                }
            })
        );
    }

    #[test]
    fn test_unknown_keys_unchanged() {
        let tables = AbbreviationTables::home_assistant();
        let canonical = doc(json!({
            "~": "openevse/AABBCC",
            "not_a_real_attribute": 1,
            "device": { "also_unknown": true }
        }));

        let rewritten = abbreviate_document(&canonical, &tables);
        assert_eq!(rewritten["~"], "openevse/AABBCC");
        assert_eq!(rewritten["not_a_real_attribute"], 1);
        assert_eq!(rewritten["dev"]["also_unknown"], true);
    }

    #[test]
    fn test_values_untouched() {
        let tables = AbbreviationTables::home_assistant();
        let template = "{{ value_json.state_topic }}";
        let canonical = doc(json!({
            "value_template": template,
            "state_topic": "unique_id",
            "device": { "connections": [["mac", "identifiers"]] }
        }));

        let rewritten = abbreviate_document(&canonical, &tables);
        assert_eq!(rewritten["val_tpl"], template);
        assert_eq!(rewritten["stat_t"], "unique_id");
        assert_eq!(rewritten["dev"]["cns"], json!([["mac", "identifiers"]]));
    }

    #[test]
    fn test_preserves_order() {
        let tables = AbbreviationTables::home_assistant();
        let canonical = doc(json!({
            "state_topic": "a",
            "name": "b",
            "unique_id": "c",
            "device_class": "d"
        }));

        let rewritten = abbreviate_document(&canonical, &tables);
        let keys: Vec<_> = rewritten.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["stat_t", "name", "uniq_id", "dev_cla"]);
    }

    #[test]
    fn test_idempotent() {
        let tables = AbbreviationTables::home_assistant();
        let canonical = doc(json!({
            "unique_id": "x",
            "enabled_by_default": false,
            "device": { "identifiers": ["x"], "configuration_url": "http://x" }
        }));

        let once = abbreviate_document(&canonical, &tables);
        let twice = abbreviate_document(&once, &tables);
        // The `dev` key is not `device`, so the nested level is read with the
        // generic table on the second pass; none of its keys are generic names.
        assert_eq!(once, twice);
    }

    #[test]
    fn test_idempotent_for_built_documents() {
        use crate::announce::AnnouncePayload;
        use crate::catalog::SensorCatalog;
        use crate::document::DiscoveryBuilder;

        let tables = AbbreviationTables::home_assistant();
        let payload = AnnouncePayload::new("AABBCC", "openevse/AABBCC", "http://1.2.3.4");
        let docs = DiscoveryBuilder::new("homeassistant", SensorCatalog::openevse())
            .build("openevse/announce/AABBCC", &payload);
        assert_eq!(docs.len(), SensorCatalog::openevse().len());

        for built in docs {
            let once = abbreviate_document(&built.body, &tables);
            let twice = abbreviate_document(&once, &tables);
            assert_eq!(once, twice, "{}", built.key);
        }
    }

    #[test]
    fn test_expand_round_trip() {
        let tables = AbbreviationTables::home_assistant();
        let canonical = doc(json!({
            "unique_id": "x",
            "unknown": "y",
            "device": { "identifiers": ["x"], "model": "m", "name": "n" }
        }));

        let rewritten = abbreviate_document(&canonical, &tables);
        assert_eq!(expand_document(&rewritten, &tables), canonical);
    }

    #[test]
    fn test_empty_tables_are_identity() {
        let tables =
            AbbreviationTables::new(AbbreviationTable::default(), AbbreviationTable::default());
        let canonical = doc(json!({ "unique_id": "x", "device": { "identifiers": ["x"] } }));
        assert_eq!(abbreviate_document(&canonical, &tables), canonical);
        assert_eq!(expand_document(&canonical, &tables), canonical);
    }
}
