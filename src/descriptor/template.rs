//! Template expansion for descriptor arrays.
//!
//! A record carrying `"ref": "<id>"` is replaced by a copy of the record
//! whose `id` matches, with the referencing record's own fields layered on
//! top. Expansion is single-level: templates are looked up in the records
//! as they were read, so a template that itself carries `ref` contributes
//! its raw fields only.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// A record after expansion, paired with its 1-based position in the file
#[derive(Debug, Clone, PartialEq)]
pub struct Expanded {
    pub seq: usize,
    pub record: Value,
}

/// Expand `ref` fields and number every record by its original position.
pub fn expand(records: Vec<Value>) -> Vec<Expanded> {
    let templates: HashMap<String, Map<String, Value>> = records
        .iter()
        .filter_map(|record| {
            let object = record.as_object()?;
            let id = object.get("id")?.as_str()?;
            Some((id.to_string(), object.clone()))
        })
        .collect();

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let record = match record {
                Value::Object(own) => Value::Object(inherit(&templates, own)),
                other => other,
            };
            Expanded {
                seq: index + 1,
                record,
            }
        })
        .collect()
}

fn inherit(templates: &HashMap<String, Map<String, Value>>, own: Map<String, Value>) -> Map<String, Value> {
    let template = own
        .get("ref")
        .and_then(Value::as_str)
        .and_then(|id| templates.get(id));
    let Some(template) = template else {
        return own;
    };

    let mut merged = template.clone();
    merged.extend(own);
    // The copy must not be mistaken for the template it came from
    merged.remove("id");
    merged
}
