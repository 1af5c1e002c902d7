// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pool and transaction-handle collaborator seams
//!
//! The coordinator never talks to a driver directly. It begins transactions
//! through [`TransactionPool`] and finalizes them through
//! [`TransactionHandle`]; the `postgres` backend implements both, and tests
//! substitute scripted mocks.

use async_trait::async_trait;

use super::error::TxError;
use super::options::TxConfig;
use crate::engine::QueryEngine;

/// A source of physical transactions.
#[async_trait]
pub trait TransactionPool: Send + Sync + 'static {
    /// The handle type this pool hands out.
    type Tx: TransactionHandle + 'static;

    /// Open a physical transaction configured by `config`.
    ///
    /// Implementations return the raw driver failure; the coordinator wraps
    /// it with its begin marker.
    async fn begin_tx(&self, config: &TxConfig) -> Result<Self::Tx, TxError>;
}

/// One physical transaction: a query target that can be finalized.
///
/// Handles are shared through the call-context carrier, so finalization takes
/// `&self`; implementations use interior mutability and must tolerate a
/// rollback attempt after the underlying transaction is already gone (the
/// coordinator issues a defensive rollback when a commit fails).
#[async_trait]
pub trait TransactionHandle: QueryEngine {
    async fn commit(&self) -> Result<(), TxError>;

    async fn rollback(&self) -> Result<(), TxError>;
}
