use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::fetch::documents::PRODUCT_ID_FIELD;

use super::table::Table;

pub const PRODUCT_KEY_COLUMN: &str = "id";
const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

/// Attach product columns to every sales row.
///
/// The sales table's product id column is forward-filled first, then left-joined on
/// `sales.productId == products.id`. A non-empty product table must have the key column.
pub fn join(mut sales: Table, products: &Table) -> Result<Table> {
    if !products.is_empty() && !products.has_column(PRODUCT_KEY_COLUMN) {
        return Err(AppError::schema("product table", PRODUCT_KEY_COLUMN));
    }

    forward_fill(&mut sales, PRODUCT_ID_FIELD);
    Ok(left_join(
        &sales,
        products,
        PRODUCT_ID_FIELD,
        PRODUCT_KEY_COLUMN,
    ))
}

/// Replace each null in `column` with the nearest non-null value above it.
///
/// Leading nulls stay null.
pub fn forward_fill(table: &mut Table, column: &str) {
    let mut last: Option<Value> = None;
    for row in table.rows_mut() {
        match row.get(column).filter(|value| !value.is_null()).cloned() {
            Some(value) => last = Some(value),
            None => {
                if let Some(value) = &last {
                    row.insert(column.to_string(), value.clone());
                }
            }
        }
    }
}

/// Relational left join. Every left row is kept once per matching right row, or once with
/// null right columns when nothing matches. Null keys never match.
///
/// Column names present on both sides get `_x` (left) and `_y` (right) suffixes.
pub fn left_join(left: &Table, right: &Table, left_on: &str, right_on: &str) -> Table {
    let left_names: HashSet<&str> = left.columns().iter().map(String::as_str).collect();
    let right_names: HashSet<&str> = right.columns().iter().map(String::as_str).collect();

    let left_columns: Vec<(&str, String)> = left
        .columns()
        .iter()
        .map(|name| (name.as_str(), suffixed(name, LEFT_SUFFIX, &right_names)))
        .collect();
    let right_columns: Vec<(&str, String)> = right
        .columns()
        .iter()
        .map(|name| (name.as_str(), suffixed(name, RIGHT_SUFFIX, &left_names)))
        .collect();

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (position, value) in right.column_values(right_on).enumerate() {
        if let Some(key) = join_key(value) {
            index.entry(key).or_default().push(position);
        }
    }

    let mut joined = Table::with_columns(
        left_columns
            .iter()
            .chain(right_columns.iter())
            .map(|(_, output)| output.clone()),
    );

    for row in 0..left.len() {
        let left_cells = left_columns
            .iter()
            .map(|(source, output)| (output.clone(), left.cell(row, source).clone()));

        let matches = join_key(left.cell(row, left_on))
            .and_then(|key| index.get(&key))
            .map(Vec::as_slice)
            .unwrap_or_default();

        if matches.is_empty() {
            joined.push_row(left_cells.collect());
            continue;
        }

        for &right_row in matches {
            let right_cells = right_columns
                .iter()
                .map(|(source, output)| (output.clone(), right.cell(right_row, source).clone()));
            joined.push_row(left_cells.clone().chain(right_cells).collect());
        }
    }

    joined
}

fn suffixed(name: &str, suffix: &str, other_side: &HashSet<&str>) -> String {
    if other_side.contains(name) {
        format!("{name}{suffix}")
    } else {
        name.to_string()
    }
}

/// Canonical text of a key cell; numbers and strings with the same text match.
fn join_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(rows: Value) -> Table {
        let mut table = Table::new();
        for row in rows.as_array().unwrap() {
            table.push_row(
                row.as_object()
                    .unwrap()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            );
        }
        table
    }

    #[test]
    fn forward_fill_carries_last_seen_id() {
        let mut sales = table(json!([
            { "productId": "A", "v": 1 },
            { "productId": null, "v": 2 },
            { "productId": "B", "v": 3 },
            { "v": 4 }
        ]));

        forward_fill(&mut sales, "productId");

        let ids: Vec<&Value> = sales.column_values("productId").collect();
        assert_eq!(ids, [&json!("A"), &json!("A"), &json!("B"), &json!("B")]);
    }

    #[test]
    fn forward_fill_leaves_leading_nulls() {
        let mut sales = table(json!([{ "productId": null }, { "productId": "A" }]));
        forward_fill(&mut sales, "productId");
        assert!(sales.cell(0, "productId").is_null());
    }

    #[test]
    fn unmatched_sales_rows_keep_null_product_columns() {
        let sales = table(json!([
            { "productId": "A", "amount": 100 },
            { "productId": "X", "amount": 250 }
        ]));
        let products = table(json!([
            { "id": "A", "title": "Jordan 1", "market.lowestAsk": 180 }
        ]));

        let joined = join(sales, &products).expect("joins");

        assert_eq!(joined.len(), 2);
        assert_eq!(
            joined.columns(),
            ["productId", "amount", "id", "title", "market.lowestAsk"]
        );
        assert_eq!(joined.cell(0, "title"), &json!("Jordan 1"));
        assert_eq!(joined.cell(1, "amount"), &json!(250));
        for column in ["id", "title", "market.lowestAsk"] {
            assert!(joined.cell(1, column).is_null(), "{column} should be null");
        }
    }

    #[test]
    fn fills_before_joining() {
        let sales = table(json!([
            { "productId": "A", "amount": 1 },
            { "productId": null, "amount": 2 }
        ]));
        let products = table(json!([{ "id": "A", "title": "Jordan 1" }]));

        let joined = join(sales, &products).expect("joins");

        assert_eq!(joined.cell(1, "productId"), &json!("A"));
        assert_eq!(joined.cell(1, "title"), &json!("Jordan 1"));
    }

    #[test]
    fn shared_column_names_get_suffixes() {
        let sales = table(json!([{ "productId": "A", "id": 7, "state": "sold" }]));
        let products = table(json!([{ "id": "A", "state": "active" }]));

        let joined = join(sales, &products).expect("joins");

        assert_eq!(
            joined.columns(),
            ["productId", "id_x", "state_x", "id_y", "state_y"]
        );
        assert_eq!(joined.cell(0, "id_x"), &json!(7));
        assert_eq!(joined.cell(0, "id_y"), &json!("A"));
        assert_eq!(joined.cell(0, "state_y"), &json!("active"));
    }

    #[test]
    fn product_table_needs_its_key_column() {
        let sales = table(json!([{ "productId": "A" }]));
        let products = table(json!([{ "sku": "A" }]));

        let err = join(sales, &products).expect_err("no id column");
        assert!(matches!(err, AppError::Schema { .. }));
    }

    #[test]
    fn duplicate_product_rows_repeat_the_sale() {
        let sales = table(json!([{ "productId": "A" }]));
        let products = table(json!([
            { "id": "A", "page": 1 },
            { "id": "A", "page": 2 }
        ]));

        let joined = join(sales, &products).expect("joins");
        assert_eq!(joined.len(), 2);
    }
}
