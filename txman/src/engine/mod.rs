// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query engine capability
//!
//! `QueryEngine` is the minimal surface every execution target exposes: a
//! plain pool connection and an active transaction both satisfy it, so
//! repository code is written once against the trait and stays oblivious to
//! whether its statements run inside a transaction.
//!
//! Targets are resolved through [`QueryEngineProvider`]: repositories hand it
//! the ambient [`Context`] and get back whatever is currently appropriate to
//! execute against.

pub mod value;

pub use value::{Row, SqlValue};

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::txn::error::TxError;

/// One statement with its parameters, for batched execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append one parameter, in `$n` order.
    pub fn bind(mut self, param: impl Into<SqlValue>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Common query surface of a pool connection or an active transaction.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Execute a statement and return the number of rows affected.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, TxError>;

    /// Run a query and return all result rows.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, TxError>;

    /// Run a query expected to return exactly one row.
    async fn query_one(&self, sql: &str, params: &[SqlValue]) -> Result<Row, TxError>;

    /// Run a query expected to return zero or one row.
    async fn query_opt(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>, TxError>;

    /// Execute a batch of statements on one connection, returning the number
    /// of rows affected by each statement in order.
    async fn execute_batch(&self, statements: &[Statement]) -> Result<Vec<u64>, TxError>;

    /// Load many rows into a table, returning the number of rows loaded.
    ///
    /// Atomic only when issued inside a transaction scope.
    async fn bulk_load(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<SqlValue>],
    ) -> Result<u64, TxError>;
}

/// Something that resolves the execution target for a call chain.
pub trait QueryEngineProvider: Send + Sync {
    /// The active transaction bound to `ctx` if there is one, otherwise the
    /// plain pool. Never fails; absence of a transaction is a normal state.
    fn query_engine(&self, ctx: &Context) -> Arc<dyn QueryEngine>;
}
