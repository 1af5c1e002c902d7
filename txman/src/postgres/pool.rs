// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pool-side implementations
//!
//! `sqlx::PgPool` satisfies both collaborator seams: it begins configured
//! transactions ([`TransactionPool`]) and serves as the fallback execution
//! target when no transaction is bound to the call chain ([`QueryEngine`]).

use async_trait::async_trait;
use sqlx::PgPool;

use super::codec;
use super::handle::PgTxHandle;
use crate::engine::{QueryEngine, Row, SqlValue, Statement};
use crate::txn::error::TxError;
use crate::txn::options::TxConfig;
use crate::txn::pool::TransactionPool;

fn driver_err(e: sqlx::Error) -> TxError {
    TxError::Driver(e.to_string())
}

#[async_trait]
impl TransactionPool for PgPool {
    type Tx = PgTxHandle;

    async fn begin_tx(&self, config: &TxConfig) -> Result<PgTxHandle, TxError> {
        let mut tx = self.begin().await.map_err(driver_err)?;
        // Configuration must be applied before any user statement runs.
        if let Some(sql) = codec::set_transaction_sql(config) {
            sqlx::query(&sql)
                .execute(&mut *tx)
                .await
                .map_err(driver_err)?;
        }
        Ok(PgTxHandle::new(tx))
    }
}

#[async_trait]
impl QueryEngine for PgPool {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, TxError> {
        codec::run_execute(self, sql, params).await
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, TxError> {
        codec::run_query(self, sql, params).await
    }

    async fn query_one(&self, sql: &str, params: &[SqlValue]) -> Result<Row, TxError> {
        codec::run_query_one(self, sql, params).await
    }

    async fn query_opt(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>, TxError> {
        codec::run_query_opt(self, sql, params).await
    }

    async fn execute_batch(&self, statements: &[Statement]) -> Result<Vec<u64>, TxError> {
        let mut conn = self
            .acquire()
            .await
            .map_err(|e| TxError::Query(e.to_string()))?;
        codec::run_execute_batch(&mut *conn, statements).await
    }

    async fn bulk_load(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<SqlValue>],
    ) -> Result<u64, TxError> {
        let mut conn = self
            .acquire()
            .await
            .map_err(|e| TxError::Query(e.to_string()))?;
        codec::run_bulk_load(&mut *conn, table, columns, rows).await
    }
}
