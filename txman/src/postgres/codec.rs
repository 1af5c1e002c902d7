// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! SQL assembly, parameter binding, and row decoding for the Postgres backend

use sqlx::postgres::{PgArguments, PgConnection, PgRow};
use sqlx::{Column, Executor, Postgres, Row as _, TypeInfo};

use crate::engine::{Row, SqlValue, Statement};
use crate::txn::error::TxError;
use crate::txn::options::TxConfig;

/// PostgreSQL wire-protocol limit on bind parameters per statement.
const MAX_BIND_PARAMS: usize = 65535;

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// Render the non-default parts of `config` as one `SET TRANSACTION`
/// statement, to be issued before any user statement runs in the
/// transaction. `None` when every field is left to the driver default.
pub(crate) fn set_transaction_sql(config: &TxConfig) -> Option<String> {
    if config.is_default() {
        return None;
    }
    let mut modes = Vec::new();
    if let Some(level) = config.isolation_level {
        modes.push(format!("ISOLATION LEVEL {}", level.as_str()));
    }
    if let Some(mode) = config.access_mode {
        modes.push(mode.as_str().to_string());
    }
    if let Some(mode) = config.deferrable {
        modes.push(mode.as_str().to_string());
    }
    Some(format!("SET TRANSACTION {}", modes.join(", ")))
}

/// Bind `params` onto `query` in `$n` order.
pub(crate) fn bind<'q>(mut query: PgQuery<'q>, params: &[SqlValue]) -> PgQuery<'q> {
    for param in params {
        query = match param {
            // untyped null; Postgres infers the parameter type from context
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Int2(v) => query.bind(*v),
            SqlValue::Int4(v) => query.bind(*v),
            SqlValue::Int8(v) => query.bind(*v),
            SqlValue::Float4(v) => query.bind(*v),
            SqlValue::Float8(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
            SqlValue::Bytes(v) => query.bind(v.clone()),
            SqlValue::Uuid(v) => query.bind(*v),
            SqlValue::Timestamp(v) => query.bind(*v),
            SqlValue::Json(v) => query.bind(v.clone()),
        };
    }
    query
}

/// Decode one sqlx row into the driver-neutral [`Row`].
pub(crate) fn decode_row(row: &PgRow) -> Result<Row, TxError> {
    let mut columns = Vec::with_capacity(row.columns().len());
    let mut values = Vec::with_capacity(row.columns().len());
    for (index, column) in row.columns().iter().enumerate() {
        columns.push(column.name().to_string());
        values.push(decode_value(row, index, column.type_info().name())?);
    }
    Ok(Row::new(columns, values))
}

fn decode_value(row: &PgRow, index: usize, type_name: &str) -> Result<SqlValue, TxError> {
    fn decode_err(e: sqlx::Error) -> TxError {
        TxError::Decode(e.to_string())
    }

    let value = match type_name {
        "BOOL" => row
            .try_get::<Option<bool>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Bool),
        "INT2" => row
            .try_get::<Option<i16>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Int2),
        "INT4" => row
            .try_get::<Option<i32>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Int4),
        "INT8" => row
            .try_get::<Option<i64>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Int8),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Float4),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Float8),
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => row
            .try_get::<Option<String>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Text),
        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Bytes),
        "UUID" => row
            .try_get::<Option<uuid::Uuid>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Uuid),
        "TIMESTAMPTZ" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Timestamp),
        "TIMESTAMP" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, |v| SqlValue::Timestamp(v.and_utc())),
        "JSON" | "JSONB" => row
            .try_get::<Option<serde_json::Value>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Json),
        other => {
            return Err(TxError::Decode(format!(
                "unsupported column type {} at index {}",
                other, index
            )))
        }
    };
    Ok(value)
}

fn query_err(e: sqlx::Error) -> TxError {
    TxError::Query(e.to_string())
}

pub(crate) async fn run_execute<'c, E>(
    executor: E,
    sql: &str,
    params: &[SqlValue],
) -> Result<u64, TxError>
where
    E: Executor<'c, Database = Postgres>,
{
    bind(sqlx::query(sql), params)
        .execute(executor)
        .await
        .map(|done| done.rows_affected())
        .map_err(query_err)
}

pub(crate) async fn run_query<'c, E>(
    executor: E,
    sql: &str,
    params: &[SqlValue],
) -> Result<Vec<Row>, TxError>
where
    E: Executor<'c, Database = Postgres>,
{
    let rows = bind(sqlx::query(sql), params)
        .fetch_all(executor)
        .await
        .map_err(query_err)?;
    rows.iter().map(decode_row).collect()
}

pub(crate) async fn run_query_one<'c, E>(
    executor: E,
    sql: &str,
    params: &[SqlValue],
) -> Result<Row, TxError>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = bind(sqlx::query(sql), params)
        .fetch_one(executor)
        .await
        .map_err(query_err)?;
    decode_row(&row)
}

pub(crate) async fn run_query_opt<'c, E>(
    executor: E,
    sql: &str,
    params: &[SqlValue],
) -> Result<Option<Row>, TxError>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = bind(sqlx::query(sql), params)
        .fetch_optional(executor)
        .await
        .map_err(query_err)?;
    row.as_ref().map(decode_row).transpose()
}

/// Execute each statement in order on one connection.
pub(crate) async fn run_execute_batch(
    conn: &mut PgConnection,
    statements: &[Statement],
) -> Result<Vec<u64>, TxError> {
    let mut results = Vec::with_capacity(statements.len());
    for statement in statements {
        results.push(run_execute(&mut *conn, &statement.sql, &statement.params).await?);
    }
    Ok(results)
}

/// Load `rows` into `table` with chunked multi-row inserts, each chunk sized
/// under the wire parameter limit.
pub(crate) async fn run_bulk_load(
    conn: &mut PgConnection,
    table: &str,
    columns: &[&str],
    rows: &[Vec<SqlValue>],
) -> Result<u64, TxError> {
    if rows.is_empty() {
        return Ok(0);
    }
    if columns.is_empty() {
        return Err(TxError::Query("bulk load requires at least one column".to_string()));
    }
    for (index, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(TxError::Query(format!(
                "bulk load row {} has {} values, expected {}",
                index,
                row.len(),
                columns.len()
            )));
        }
    }

    let rows_per_chunk = (MAX_BIND_PARAMS / columns.len()).max(1);
    let mut loaded = 0u64;
    for chunk in rows.chunks(rows_per_chunk) {
        let sql = bulk_insert_sql(table, columns, chunk.len());
        let mut query = sqlx::query(&sql);
        for row in chunk {
            query = bind(query, row);
        }
        loaded += query
            .execute(&mut *conn)
            .await
            .map_err(query_err)?
            .rows_affected();
    }
    Ok(loaded)
}

/// `INSERT INTO "t" ("a", "b") VALUES ($1, $2), ($3, $4), ...`
pub(crate) fn bulk_insert_sql(table: &str, columns: &[&str], row_count: usize) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let mut placeholders = Vec::with_capacity(row_count);
    let mut param = 1;
    for _ in 0..row_count {
        let row_params = (0..columns.len())
            .map(|offset| format!("${}", param + offset))
            .collect::<Vec<_>>()
            .join(", ");
        param += columns.len();
        placeholders.push(format!("({})", row_params));
    }
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_ident(table),
        column_list,
        placeholders.join(", ")
    )
}

/// Quote an identifier, doubling embedded quotes.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
