use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::entity::Entity;

/// Accepts a bare array of entities, an object wrapping them in a
/// `characters` array, or a single entity object.
pub(super) fn parse_entities(raw: &str) -> Result<Vec<Entity>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in entity file")?;

    match parsed {
        Value::Array(items) => parse_entity_list(items),
        Value::Object(mut object) => {
            if let Some(characters) = object.remove("characters") {
                let Value::Array(items) = characters else {
                    return Err(anyhow!("`characters` must be an array of entities"));
                };
                return parse_entity_list(items);
            }

            let entity = Entity::deserialize(Value::Object(object))
                .context("entity object has an unexpected shape")?;
            Ok(vec![entity])
        }
        _ => Err(anyhow!(
            "unexpected JSON type in entity file; expected an array or an object"
        )),
    }
}

fn parse_entity_list(items: Vec<Value>) -> Result<Vec<Entity>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            Entity::deserialize(value).with_context(|| format!("entity #{index} is malformed"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        let raw = r#"[
            {"name": "A", "bio": ["b"], "knowledge": [], "relationships": [{"name": "B", "relationship": "ally", "details": "old friends"}]},
            {"name": "B"}
        ]"#;

        let entities = parse_entities(raw).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].relationships[0].target_name(), Some("B"));
        assert_eq!(entities[0].relationships[0].details, "old friends");
        assert!(entities[1].relationships.is_empty());
    }

    #[test]
    fn parses_wrapped_and_single_objects() {
        let wrapped = r#"{"characters": [{"name": "A"}, {"name": "B"}], "lore": "ignored"}"#;
        assert_eq!(parse_entities(wrapped).unwrap().len(), 2);

        let single = r#"{"name": "Solo", "topics": ["extra fields are ignored"]}"#;
        let entities = parse_entities(single).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "Solo");
    }

    #[test]
    fn relationship_without_name_still_parses() {
        let raw = r#"[{"name": "A", "relationships": [{"relationship": "ally"}]}]"#;
        let entities = parse_entities(raw).unwrap();
        assert_eq!(entities[0].relationships[0].target_name(), None);
    }

    #[test]
    fn rejects_non_collection_json() {
        assert!(parse_entities("42").is_err());
        assert!(parse_entities("not json").is_err());
        assert!(parse_entities(r#"{"characters": {"name": "A"}}"#).is_err());
        assert!(parse_entities(r#"[{"name": ["not", "a", "string"]}]"#).is_err());
    }
}
