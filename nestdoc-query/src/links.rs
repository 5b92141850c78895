//! Discoverability links on plain reads.

use nestdoc_types::is_object_array;
use serde_json::{Map, Value};

/// Field attached to returned objects.
pub const LINKS_FIELD: &str = "_links";

/// Attaches navigation links to the objects of a non-paginated read.
///
/// Every object with nested collections (arrays of objects) gets
/// `_links.collections`, mapping each such field to its child resource
/// path. When the read addressed exactly one document, that document also
/// gets `_links.self`. Arrays of primitives are never linked.
///
/// `resource` is the read's own path. A document read links its children as
/// `resource/<field>`. A collection read does not: `resource/<field>` would
/// name no collection there, so each member's children are linked below
/// the member as `resource/<id>/<field>`. A member without a string id
/// falls back to `resource/<field>`.
pub fn augment_links(
    items: &mut [Value],
    resource: &str,
    addressed_document: bool,
    id_field: &str,
) {
    for item in items {
        let Value::Object(entity) = item else {
            continue;
        };

        let base = if addressed_document {
            resource.to_string()
        } else {
            match entity.get(id_field).and_then(Value::as_str) {
                Some(id) => format!("{resource}/{id}"),
                None => resource.to_string(),
            }
        };

        let collections: Map<String, Value> = entity
            .iter()
            .filter(|(_, value)| is_object_array(value))
            .map(|(field, _)| (field.clone(), Value::String(format!("{base}/{field}"))))
            .collect();

        let mut links = Map::new();
        if addressed_document {
            links.insert("self".to_string(), Value::String(resource.to_string()));
        }
        if !collections.is_empty() {
            links.insert("collections".to_string(), Value::Object(collections));
        }
        if !links.is_empty() {
            entity.insert(LINKS_FIELD.to_string(), Value::Object(links));
        }
    }
}
