use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use crate::document::{Document, kind_of};
use crate::error::MalformedDocumentError;

/// Separator the upstream generator places between tag and operation name.
pub const TAG_SEPARATOR: char = '-';

/// One operationId that was rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub path: String,
    pub method: String,
    pub tag: String,
    pub from: String,
    pub to: String,
}

/// Location of an operation sharing its operationId with another one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationRef {
    pub path: String,
    pub method: String,
}

/// Outcome of a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// Operations visited.
    pub operations: usize,
    pub renames: Vec<Rename>,
    /// Resulting operationIds that are used by more than one operation.
    pub collisions: IndexMap<String, Vec<OperationRef>>,
}

impl NormalizeReport {
    pub fn is_unchanged(&self) -> bool {
        self.renames.is_empty()
    }
}

/// Strip the `"<firstTag>-"` prefix from every operationId in the document.
///
/// Only the first tag of an operation is consulted. Operations without tags,
/// without a string operationId, or whose id does not begin with the exact
/// prefix are left alone. Non-object entries of a path item (`parameters`,
/// `summary`, ...) are skipped.
pub fn normalize_operation_ids(
    doc: &mut Document,
) -> Result<NormalizeReport, MalformedDocumentError> {
    let mut report = NormalizeReport::default();
    let mut seen: IndexMap<String, Vec<OperationRef>> = IndexMap::new();

    for (path, item) in doc.paths_mut()? {
        let found = kind_of(item);
        let Value::Object(item) = item else {
            return Err(MalformedDocumentError::PathItemNotObject {
                path: path.clone(),
                found,
            });
        };

        for (method, operation) in item.iter_mut() {
            let Value::Object(operation) = operation else {
                continue;
            };
            report.operations += 1;

            let tag = first_tag(operation.get("tags"));
            if let (Some(tag), Some(Value::String(id))) = (tag, operation.get_mut("operationId"))
                && let Some(stripped) = strip_tag_prefix(id, &tag)
            {
                let stripped = stripped.to_string();
                debug!("{method} {path}: {id} -> {stripped}");
                report.renames.push(Rename {
                    path: path.clone(),
                    method: method.clone(),
                    tag,
                    from: std::mem::replace(id, stripped.clone()),
                    to: stripped,
                });
            }

            if let Some(Value::String(id)) = operation.get("operationId") {
                seen.entry(id.clone()).or_default().push(OperationRef {
                    path: path.clone(),
                    method: method.clone(),
                });
            }
        }
    }

    report.collisions = seen.into_iter().filter(|(_, refs)| refs.len() > 1).collect();
    for (id, refs) in &report.collisions {
        warn!("operationId `{id}` is shared by {} operations", refs.len());
    }

    Ok(report)
}

/// The first element of `tags`, if it is a string.
fn first_tag(tags: Option<&Value>) -> Option<String> {
    match tags? {
        Value::Array(tags) => tags.first()?.as_str().map(str::to_string),
        _ => None,
    }
}

/// Return the remainder of `operation_id` after `"<tag>-"`, if it starts with it.
pub fn strip_tag_prefix<'a>(operation_id: &'a str, tag: &str) -> Option<&'a str> {
    operation_id
        .strip_prefix(tag)?
        .strip_prefix(TAG_SEPARATOR)
}
