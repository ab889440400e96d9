//! PostgreSQL catalog access.
//!
//! Handlers only see the [`SchemaCatalog`] trait; [`PgCatalog`] implements it
//! over a bounded `sqlx` pool restricted to the `public` schema.

use std::time::Duration;

use agentlens_config::DatabaseSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info};

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

/// One base table of the public schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TableInfo {
    pub table_name: String,
    pub table_type: String,
    /// Human-readable total relation size, e.g. `"16 kB"`.
    pub table_size: Option<String>,
    pub column_count: i64,
    pub table_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub character_maximum_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
    /// `"YES"` or `"NO"`, as reported by `information_schema`.
    pub is_nullable: String,
    pub column_default: Option<String>,
    pub ordinal_position: i32,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub column_comment: Option<String>,
}

/// One indexed column; multi-column indexes yield one row per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct IndexInfo {
    pub index_name: String,
    pub column_name: String,
    pub is_unique: bool,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub table_comment: Option<String>,
    pub columns: Vec<ColumnInfo>,
    pub indexes: Vec<IndexInfo>,
    pub column_count: usize,
}

/// A page of tables plus the unpaged total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePage {
    pub tables: Vec<TableInfo>,
    pub total_count: i64,
}

/// Read access to database metadata and data.
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Round-trips a trivial statement.
    async fn ping(&self) -> Result<(), DbError>;

    /// Base tables of the public schema ordered by name.
    async fn list_tables(&self, limit: i64, offset: i64) -> Result<TablePage, DbError>;

    async fn table_schema(&self, table_name: &str) -> Result<TableSchema, DbError>;

    /// Runs an already-vetted `SELECT` and returns its rows as ordered maps.
    async fn run_select(&self, sql: &str) -> Result<Vec<Map<String, Value>>, DbError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ─────────────────────────────────────────────────────────────────────────────

const COUNT_TABLES: &str = "
    SELECT COUNT(*)
    FROM information_schema.tables
    WHERE table_schema = 'public'
      AND table_type = 'BASE TABLE'";

const LIST_TABLES: &str = "
    SELECT
        t.table_name::text AS table_name,
        t.table_type::text AS table_type,
        pg_size_pretty(pg_total_relation_size(quote_ident(t.table_name::text)::regclass)) AS table_size,
        (SELECT COUNT(*)
         FROM information_schema.columns c
         WHERE c.table_name = t.table_name
           AND c.table_schema = 'public') AS column_count,
        obj_description(quote_ident(t.table_name::text)::regclass, 'pg_class') AS table_comment
    FROM information_schema.tables t
    WHERE t.table_schema = 'public'
      AND t.table_type = 'BASE TABLE'
    ORDER BY t.table_name
    LIMIT $1 OFFSET $2";

const TABLE_EXISTS: &str = "
    SELECT EXISTS (
        SELECT 1
        FROM information_schema.tables
        WHERE table_schema = 'public'
          AND table_name = $1::text
    )";

const TABLE_COLUMNS: &str = "
    SELECT
        c.column_name::text AS column_name,
        c.data_type::text AS data_type,
        c.character_maximum_length::int4 AS character_maximum_length,
        c.numeric_precision::int4 AS numeric_precision,
        c.numeric_scale::int4 AS numeric_scale,
        c.is_nullable::text AS is_nullable,
        c.column_default::text AS column_default,
        c.ordinal_position::int4 AS ordinal_position,
        (pk.column_name IS NOT NULL) AS is_primary_key,
        (fk.column_name IS NOT NULL) AS is_foreign_key,
        col_description(quote_ident($1::text)::regclass, c.ordinal_position::int4) AS column_comment
    FROM information_schema.columns c
    LEFT JOIN (
        SELECT DISTINCT ku.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage ku
          ON tc.constraint_name = ku.constraint_name
         AND tc.table_schema = ku.table_schema
        WHERE tc.constraint_type = 'PRIMARY KEY'
          AND tc.table_name = $1::text
          AND tc.table_schema = 'public'
    ) pk ON c.column_name = pk.column_name
    LEFT JOIN (
        SELECT DISTINCT ku.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage ku
          ON tc.constraint_name = ku.constraint_name
         AND tc.table_schema = ku.table_schema
        WHERE tc.constraint_type = 'FOREIGN KEY'
          AND tc.table_name = $1::text
          AND tc.table_schema = 'public'
    ) fk ON c.column_name = fk.column_name
    WHERE c.table_name = $1::text
      AND c.table_schema = 'public'
    ORDER BY c.ordinal_position";

const TABLE_INDEXES: &str = "
    SELECT
        i.relname::text AS index_name,
        a.attname::text AS column_name,
        ix.indisunique AS is_unique,
        ix.indisprimary AS is_primary
    FROM pg_class t
    JOIN pg_namespace n ON n.oid = t.relnamespace
    JOIN pg_index ix ON t.oid = ix.indrelid
    JOIN pg_class i ON i.oid = ix.indexrelid
    JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)
    WHERE t.relname = $1::text
      AND n.nspname = 'public'
    ORDER BY i.relname, a.attnum";

const TABLE_COMMENT: &str =
    "SELECT obj_description(quote_ident($1::text)::regclass, 'pg_class')";

/// Wraps a user query so every row comes back as one JSON object whose keys
/// keep the select-list order. The newlines keep a trailing line comment from
/// swallowing the closing parenthesis.
fn wrap_as_json_rows(sql: &str) -> String {
    let body = sql.trim().trim_end_matches(';').trim_end();
    format!("SELECT row_to_json(q) FROM (\n{}\n) AS q", body)
}

/// [`SchemaCatalog`] over a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Creates the pool. Connections open on first use, so the server starts
    /// even while the database is unreachable and `/health` reports it.
    pub fn connect(settings: &DatabaseSettings) -> Self {
        let timeout = Duration::from_secs(settings.command_timeout_secs);
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.name)
            .username(&settings.user)
            .password(&settings.password)
            .options([("statement_timeout", format!("{}s", settings.command_timeout_secs))]);

        let pool = PgPoolOptions::new()
            .min_connections(settings.min_connections)
            .max_connections(settings.max_connections)
            .acquire_timeout(timeout)
            .connect_lazy_with(options);

        info!(
            host = %settings.host,
            port = settings.port,
            database = %settings.name,
            max_connections = settings.max_connections,
            "PostgreSQL pool configured"
        );
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        debug!("PostgreSQL pool closed");
    }
}

#[async_trait]
impl SchemaCatalog for PgCatalog {
    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_tables(&self, limit: i64, offset: i64) -> Result<TablePage, DbError> {
        let total_count: i64 = sqlx::query_scalar(COUNT_TABLES).fetch_one(&self.pool).await?;
        let tables = sqlx::query_as::<_, TableInfo>(LIST_TABLES)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(TablePage { tables, total_count })
    }

    async fn table_schema(&self, table_name: &str) -> Result<TableSchema, DbError> {
        let exists: bool = sqlx::query_scalar(TABLE_EXISTS)
            .bind(table_name)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(DbError::TableNotFound(table_name.to_string()));
        }

        let columns = sqlx::query_as::<_, ColumnInfo>(TABLE_COLUMNS)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await?;
        let indexes = sqlx::query_as::<_, IndexInfo>(TABLE_INDEXES)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await?;
        let table_comment: Option<String> = sqlx::query_scalar(TABLE_COMMENT)
            .bind(table_name)
            .fetch_one(&self.pool)
            .await?;

        Ok(TableSchema {
            table_name: table_name.to_string(),
            table_comment,
            column_count: columns.len(),
            columns,
            indexes,
        })
    }

    async fn run_select(&self, sql: &str) -> Result<Vec<Map<String, Value>>, DbError> {
        let wrapped = wrap_as_json_rows(sql);
        let rows: Vec<Value> = sqlx::query_scalar(&wrapped).fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "Query executed");

        Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }
}
