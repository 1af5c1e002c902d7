// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction error types

use thiserror::Error;

/// Transaction and query errors.
///
/// Driver failures are carried as rendered text; the one place a typed cause
/// matters is [`TxError::Rollback`], where the error that triggered the
/// rollback is preserved as the `source` so callers can still reach it after
/// the rollback failure takes precedence.
#[derive(Error, Debug)]
pub enum TxError {
    #[error("can't begin transaction: {0}")]
    Begin(String),

    #[error("commit failed: {0}")]
    Commit(String),

    #[error("rollback failed: {reason}")]
    Rollback {
        reason: String,
        #[source]
        cause: Box<TxError>,
    },

    #[error("panic in transactional unit of work: {0}")]
    UnitOfWorkPanic(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("row decode failed: {0}")]
    Decode(String),

    #[error("driver error: {0}")]
    Driver(String),

    #[error("{0}")]
    Application(String),
}

impl TxError {
    /// Wrap an application-level failure produced inside a unit of work.
    pub fn application(message: impl Into<String>) -> Self {
        TxError::Application(message.into())
    }

    /// The error that triggered a failed rollback, if this is one.
    pub fn superseded(&self) -> Option<&TxError> {
        match self {
            TxError::Rollback { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
