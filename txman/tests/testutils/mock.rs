// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Scripted in-memory pool and transaction handle
//!
//! The mock records every interaction with the backend in a shared journal
//! so tests can assert on the exact begin/execute/commit/rollback sequence a
//! coordinator run produced. Failures are scripted at construction time:
//! a pool that refuses to begin, a handle whose commit or rollback fails,
//! and statements whose text starts with `BROKEN` fail on execution.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use txman::{
    QueryEngine, Row, SqlValue, Statement, TransactionHandle, TransactionPool, TxConfig, TxError,
};

/// Shared event journal.
#[derive(Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

fn canned_row() -> Row {
    Row::new(vec!["value".to_string()], vec![SqlValue::Int8(42)])
}

fn run_statement(journal: &Journal, target: &str, sql: &str) -> Result<u64, TxError> {
    journal.record(format!("{}-exec:{}", target, sql));
    if sql.starts_with("BROKEN") {
        return Err(TxError::Query("forced statement failure".to_string()));
    }
    Ok(1)
}

/// Scripted pool. Doubles as the plain execution target, like the real one.
#[derive(Default)]
pub struct MockPool {
    journal: Journal,
    fail_begin: bool,
    fail_commit: bool,
    fail_rollback: bool,
    begin_configs: Mutex<Vec<TxConfig>>,
}

impl MockPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    pub fn fail_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub fn fail_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Configurations seen by `begin_tx`, in call order.
    pub fn begin_configs(&self) -> Vec<TxConfig> {
        self.begin_configs.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionPool for MockPool {
    type Tx = MockTx;

    async fn begin_tx(&self, config: &TxConfig) -> Result<MockTx, TxError> {
        if self.fail_begin {
            self.journal.record("begin-refused");
            return Err(TxError::Driver("pool exhausted".to_string()));
        }
        self.begin_configs.lock().unwrap().push(*config);
        self.journal.record("begin");
        Ok(MockTx {
            journal: self.journal.clone(),
            fail_commit: self.fail_commit,
            fail_rollback: self.fail_rollback,
            completed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl QueryEngine for MockPool {
    async fn execute(&self, sql: &str, _params: &[SqlValue]) -> Result<u64, TxError> {
        run_statement(&self.journal, "pool", sql)
    }

    async fn query(&self, sql: &str, _params: &[SqlValue]) -> Result<Vec<Row>, TxError> {
        run_statement(&self.journal, "pool", sql)?;
        Ok(vec![canned_row()])
    }

    async fn query_one(&self, sql: &str, _params: &[SqlValue]) -> Result<Row, TxError> {
        run_statement(&self.journal, "pool", sql)?;
        Ok(canned_row())
    }

    async fn query_opt(&self, sql: &str, _params: &[SqlValue]) -> Result<Option<Row>, TxError> {
        run_statement(&self.journal, "pool", sql)?;
        Ok(Some(canned_row()))
    }

    async fn execute_batch(&self, statements: &[Statement]) -> Result<Vec<u64>, TxError> {
        let mut results = Vec::with_capacity(statements.len());
        for statement in statements {
            results.push(run_statement(&self.journal, "pool", &statement.sql)?);
        }
        Ok(results)
    }

    async fn bulk_load(
        &self,
        table: &str,
        _columns: &[&str],
        rows: &[Vec<SqlValue>],
    ) -> Result<u64, TxError> {
        self.journal.record(format!("pool-bulk:{}", table));
        Ok(rows.len() as u64)
    }
}

/// Scripted transaction handle.
pub struct MockTx {
    journal: Journal,
    fail_commit: bool,
    fail_rollback: bool,
    completed: AtomicBool,
}

#[async_trait]
impl QueryEngine for MockTx {
    async fn execute(&self, sql: &str, _params: &[SqlValue]) -> Result<u64, TxError> {
        run_statement(&self.journal, "tx", sql)
    }

    async fn query(&self, sql: &str, _params: &[SqlValue]) -> Result<Vec<Row>, TxError> {
        run_statement(&self.journal, "tx", sql)?;
        Ok(vec![canned_row()])
    }

    async fn query_one(&self, sql: &str, _params: &[SqlValue]) -> Result<Row, TxError> {
        run_statement(&self.journal, "tx", sql)?;
        Ok(canned_row())
    }

    async fn query_opt(&self, sql: &str, _params: &[SqlValue]) -> Result<Option<Row>, TxError> {
        run_statement(&self.journal, "tx", sql)?;
        Ok(Some(canned_row()))
    }

    async fn execute_batch(&self, statements: &[Statement]) -> Result<Vec<u64>, TxError> {
        let mut results = Vec::with_capacity(statements.len());
        for statement in statements {
            results.push(run_statement(&self.journal, "tx", &statement.sql)?);
        }
        Ok(results)
    }

    async fn bulk_load(
        &self,
        table: &str,
        _columns: &[&str],
        rows: &[Vec<SqlValue>],
    ) -> Result<u64, TxError> {
        self.journal.record(format!("tx-bulk:{}", table));
        Ok(rows.len() as u64)
    }
}

#[async_trait]
impl TransactionHandle for MockTx {
    async fn commit(&self) -> Result<(), TxError> {
        if self.completed.swap(true, Ordering::SeqCst) {
            return Err(TxError::Driver("transaction already completed".to_string()));
        }
        if self.fail_commit {
            self.journal.record("commit-failed");
            return Err(TxError::Driver("forced commit failure".to_string()));
        }
        self.journal.record("commit");
        Ok(())
    }

    async fn rollback(&self) -> Result<(), TxError> {
        // Mirrors the real handle: rolling back an already-finalized
        // transaction is a no-op.
        if self.completed.swap(true, Ordering::SeqCst) {
            self.journal.record("rollback-noop");
            return Ok(());
        }
        if self.fail_rollback {
            self.journal.record("rollback-failed");
            return Err(TxError::Driver("forced rollback failure".to_string()));
        }
        self.journal.record("rollback");
        Ok(())
    }
}
