// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Active transaction handle
//!
//! `PgTxHandle` owns one sqlx transaction behind an async mutex so a single
//! handle can be shared through the call-context carrier. Queries lock the
//! handle for their duration; the physical transaction is sequential, and the
//! carrier design keeps its users sequential too.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tokio::sync::Mutex;

use super::codec;
use crate::engine::{QueryEngine, Row, SqlValue, Statement};
use crate::txn::error::TxError;
use crate::txn::pool::TransactionHandle;

/// A begun Postgres transaction, usable as a query target until it is
/// committed or rolled back.
pub struct PgTxHandle {
    inner: Mutex<Option<Transaction<'static, Postgres>>>,
}

impl PgTxHandle {
    pub(crate) fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            inner: Mutex::new(Some(tx)),
        }
    }
}

fn completed() -> TxError {
    TxError::Query("transaction already completed".to_string())
}

#[async_trait]
impl QueryEngine for PgTxHandle {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, TxError> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or_else(completed)?;
        codec::run_execute(&mut **tx, sql, params).await
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, TxError> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or_else(completed)?;
        codec::run_query(&mut **tx, sql, params).await
    }

    async fn query_one(&self, sql: &str, params: &[SqlValue]) -> Result<Row, TxError> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or_else(completed)?;
        codec::run_query_one(&mut **tx, sql, params).await
    }

    async fn query_opt(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>, TxError> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or_else(completed)?;
        codec::run_query_opt(&mut **tx, sql, params).await
    }

    async fn execute_batch(&self, statements: &[Statement]) -> Result<Vec<u64>, TxError> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or_else(completed)?;
        codec::run_execute_batch(&mut **tx, statements).await
    }

    async fn bulk_load(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<SqlValue>],
    ) -> Result<u64, TxError> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or_else(completed)?;
        codec::run_bulk_load(&mut **tx, table, columns, rows).await
    }
}

#[async_trait]
impl TransactionHandle for PgTxHandle {
    async fn commit(&self) -> Result<(), TxError> {
        let tx = self
            .inner
            .lock()
            .await
            .take()
            .ok_or_else(|| TxError::Driver("transaction already completed".to_string()))?;
        tx.commit().await.map_err(|e| TxError::Driver(e.to_string()))
    }

    async fn rollback(&self) -> Result<(), TxError> {
        // After a failed commit the inner transaction is already consumed;
        // the driver abandons it when the connection is returned, so the
        // defensive rollback attempt is a no-op.
        let tx = self.inner.lock().await.take();
        match tx {
            None => Ok(()),
            Some(tx) => tx
                .rollback()
                .await
                .map_err(|e| TxError::Driver(e.to_string())),
        }
    }
}
