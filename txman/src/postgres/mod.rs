// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! PostgreSQL backend built on sqlx
//!
//! Implements the pool and handle collaborator seams for `sqlx::PgPool`:
//! the pool begins configured transactions and doubles as the fallback query
//! target, and [`PgTxHandle`] exposes an active transaction through the same
//! query capability. Construct a coordinator directly over a pool:
//!
//! `let manager = TxManager::new(Arc::new(pool));`

mod codec;
mod handle;
mod pool;

pub use handle::PgTxHandle;

use crate::txn::error::TxError;

impl From<sqlx::Error> for TxError {
    fn from(e: sqlx::Error) -> Self {
        TxError::Query(e.to_string())
    }
}

/// Coordinator type over a `sqlx::PgPool`.
pub type PgTxManager = crate::txn::manager::TxManager<sqlx::PgPool>;
