//! Markdown rendering of query results.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use crate::dto::QueryResult;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders a result as a Markdown document with one table.
pub fn render(result: &QueryResult) -> String {
    let mut md = String::from("# SQL Query Result\n\n");
    md.push_str(&format!("**Query:** `{}`\n\n", result.query));

    if result.row_count == 0 {
        md.push_str("**Result:** No rows returned\n");
        return md;
    }

    md.push_str(&format!("**Rows returned:** {}\n\n", result.row_count));
    md.push_str("---\n\n");

    md.push_str(&format!("| {} |\n", result.columns.join(" | ")));
    let rule: Vec<&str> = result.columns.iter().map(|_| "---").collect();
    md.push_str(&format!("|{}|\n", rule.join("|")));

    for row in &result.rows {
        let cells: Vec<String> = result
            .columns
            .iter()
            .map(|col| format_cell(row.get(col).unwrap_or(&Value::Null)))
            .collect();
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    md
}

pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "*NULL*".to_string(),
        Value::Bool(true) => "✅".to_string(),
        Value::Bool(false) => "❌".to_string(),
        Value::Object(_) | Value::Array(_) => format!("`{}`", value),
        Value::String(s) => format_datetime(s).unwrap_or_else(|| s.clone()),
        Value::Number(n) => n.to_string(),
    }
}

/// PostgreSQL renders `timestamp` and `timestamptz` in JSON as ISO 8601.
fn format_datetime(s: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.format(DATETIME_FORMAT).to_string());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn result(columns: &[&str], rows: Vec<Value>) -> QueryResult {
        let rows: Vec<Map<String, Value>> = rows
            .into_iter()
            .filter_map(|r| r.as_object().cloned())
            .collect();
        QueryResult {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            row_count: rows.len(),
            rows,
            query: "SELECT * FROM runs".into(),
            message: None,
        }
    }

    #[test]
    fn test_empty_result() {
        let md = render(&result(&[], vec![]));
        assert_eq!(
            md,
            "# SQL Query Result\n\n**Query:** `SELECT * FROM runs`\n\n**Result:** No rows returned\n"
        );
    }

    #[test]
    fn test_table_layout() {
        let md = render(&result(
            &["id", "name"],
            vec![json!({"id": 1, "name": "alpha"}), json!({"id": 2, "name": null})],
        ));
        let expected = "# SQL Query Result\n\n\
            **Query:** `SELECT * FROM runs`\n\n\
            **Rows returned:** 2\n\n\
            ---\n\n\
            | id | name |\n\
            |---|---|\n\
            | 1 | alpha |\n\
            | 2 | *NULL* |\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_cell_formatting() {
        assert_eq!(format_cell(&json!(true)), "✅");
        assert_eq!(format_cell(&json!(false)), "❌");
        assert_eq!(format_cell(&json!({"k": [1, 2]})), "`{\"k\":[1,2]}`");
        assert_eq!(format_cell(&json!(["a"])), "`[\"a\"]`");
        assert_eq!(format_cell(&json!(2.5)), "2.5");
        assert_eq!(format_cell(&json!("plain text")), "plain text");
        assert_eq!(format_cell(&json!("2025-01-10")), "2025-01-10");
    }

    #[test]
    fn test_datetime_cells() {
        assert_eq!(format_cell(&json!("2025-01-10T12:30:45.123456")), "2025-01-10 12:30:45");
        assert_eq!(format_cell(&json!("2025-01-10T12:30:45+03:00")), "2025-01-10 12:30:45");
    }
}
