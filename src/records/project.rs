use serde_json::{Map, Value};

use crate::config::FailurePolicy;
use crate::error::{AppError, Result};
use crate::fetch::FetchedDocument;

use super::table::Table;

/// Flatten the list stored under `key` in every document into one table.
///
/// Rows keep document order and, within a document, entry order. A document without the
/// list (or with non-object entries) is a schema error under `Abort` and skipped under
/// `Isolate`.
pub fn project(documents: &[FetchedDocument], key: &str, policy: FailurePolicy) -> Result<Table> {
    let mut table = Table::new();
    let mut skipped = 0usize;

    for document in documents {
        match project_document(document, key) {
            Ok(rows) => table.extend(rows),
            Err(err) if policy == FailurePolicy::Isolate => {
                log::warn!("skipping document {}: {err}", document.url);
                skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    log::debug!(
        "projected {} row(s) from {} document(s) under `{key}` ({skipped} skipped)",
        table.len(),
        documents.len()
    );
    Ok(table)
}

fn project_document(document: &FetchedDocument, key: &str) -> Result<Table> {
    let entries = document
        .body
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::schema(document.url.clone(), key))?;

    let mut table = Table::new();
    for entry in entries {
        let fields = entry
            .as_object()
            .ok_or_else(|| AppError::schema(document.url.clone(), format!("{key}[] object")))?;
        table.push_row(flatten_object(fields));
    }
    Ok(table)
}

/// Flatten nested objects into dotted column names (`market.lowestAsk`). Arrays and scalars
/// are kept as cell values.
pub fn flatten_object(fields: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut cells = Vec::with_capacity(fields.len());
    flatten_into(None, fields, &mut cells);
    cells
}

fn flatten_into(prefix: Option<&str>, fields: &Map<String, Value>, cells: &mut Vec<(String, Value)>) {
    for (name, value) in fields {
        let column = match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(Some(&column), nested, cells),
            other => cells.push((column, other.clone())),
        }
    }
}
