// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction coordination module
//!
//! This module provides the transaction coordination core: a typed option
//! set folded into a per-transaction configuration, the pool and handle
//! collaborator seams, and the coordinator that detects nesting, binds the
//! active transaction into the call context, and makes exactly one
//! commit-or-rollback decision per top-level call.
//!
//! # Features
//! - Transaction lifecycle management (begin, commit, rollback)
//! - Transaction isolation levels, access modes, and deferrable mode
//! - Nested transactional calls flattened onto one physical transaction
//! - Panic containment at the transactional boundary

pub mod error;
pub mod manager;
pub mod options;
pub mod pool;

pub use error::TxError;
pub use manager::{TransactionManager, TxManager, UnitOfWork};
pub use options::{AccessMode, DeferrableMode, IsolationLevel, TxConfig, TxOption};
pub use pool::{TransactionHandle, TransactionPool};
