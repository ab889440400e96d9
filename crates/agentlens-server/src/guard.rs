//! Read-only gate for user-submitted SQL.
//!
//! Keyword matching is by substring, so a column such as `created_at` is
//! rejected for containing `create`.

/// Checked in this order; the first hit is reported.
pub const FORBIDDEN_KEYWORDS: [&str; 7] = [
    "drop", "delete", "truncate", "insert", "update", "alter", "create",
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectedQuery {
    #[error("Only SELECT queries are allowed for security reasons")]
    NotSelect,

    #[error("Query contains forbidden keyword: {0}")]
    ForbiddenKeyword(&'static str),
}

pub fn check(sql: &str) -> Result<(), RejectedQuery> {
    let lowered = sql.trim().to_lowercase();
    if !lowered.starts_with("select") {
        return Err(RejectedQuery::NotSelect);
    }

    match FORBIDDEN_KEYWORDS.iter().find(|kw| lowered.contains(*kw)) {
        Some(kw) => Err(RejectedQuery::ForbiddenKeyword(kw)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_select() {
        assert_eq!(check("  SELECT * FROM agent_runs WHERE id = 1"), Ok(()));
        assert_eq!(check("select count(*) from steps;"), Ok(()));
    }

    #[test]
    fn test_rejects_non_select() {
        assert_eq!(check("WITH x AS (SELECT 1) SELECT * FROM x"), Err(RejectedQuery::NotSelect));
        assert_eq!(check(""), Err(RejectedQuery::NotSelect));
        assert_eq!(
            RejectedQuery::NotSelect.to_string(),
            "Only SELECT queries are allowed for security reasons"
        );
    }

    #[test]
    fn test_reports_first_keyword_in_order() {
        let err = check("SELECT 1; CREATE TABLE t(); DROP TABLE t").unwrap_err();
        assert_eq!(err, RejectedQuery::ForbiddenKeyword("drop"));
        assert_eq!(err.to_string(), "Query contains forbidden keyword: drop");
    }

    #[test]
    fn test_substring_false_positive() {
        assert_eq!(
            check("SELECT created_at FROM runs"),
            Err(RejectedQuery::ForbiddenKeyword("create"))
        );
        assert_eq!(
            check("SELECT last_update FROM runs"),
            Err(RejectedQuery::ForbiddenKeyword("update"))
        );
    }
}
