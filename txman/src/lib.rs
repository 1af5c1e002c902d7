// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Txman - Transaction coordination for PostgreSQL repositories
//!
//! Txman lets independent data-access components participate in a single
//! database transaction without knowing whether one is active, who started
//! it, or when it ends.
//!
//! # Features
//!
//! - **Implicit propagation**: the active transaction travels in an immutable
//!   typed [`Context`], so no handle is threaded through function signatures
//! - **Nesting flattening**: a transactional use case calling another
//!   transactional use case joins the open transaction instead of opening a
//!   second one
//! - **Exactly-once finalization**: normal return, returned error, and panic
//!   all converge on a single commit-or-rollback decision, with rollback
//!   failures surfaced rather than swallowed
//! - **Target resolution**: repositories ask for "whatever is appropriate to
//!   execute against" and receive either the active transaction or the pool
//!
//! # Usage
//!
//! ```ignore
//! let manager = Arc::new(TxManager::new(Arc::new(pool)));
//!
//! let ctx = Context::new();
//! manager
//!     .run_transaction(
//!         &ctx,
//!         |tx_ctx| async move {
//!             orders.create(&tx_ctx, &order).await?;
//!             stock.reserve(&tx_ctx, order.items()).await?;
//!             Ok(())
//!         },
//!         &[TxOption::Isolation(IsolationLevel::Serializable)],
//!     )
//!     .await?;
//! ```
//!
//! Repositories resolve their execution target from the ambient context and
//! never see the finalization logic:
//!
//! ```ignore
//! async fn create(&self, ctx: &Context, order: &Order) -> Result<(), TxError> {
//!     let engine = self.provider.query_engine(ctx);
//!     engine.execute("INSERT INTO orders ...", &params).await?;
//!     Ok(())
//! }
//! ```

// Public modules
pub mod context;
pub mod engine;
pub mod txn;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-export the public API
pub use context::Context;
pub use engine::{QueryEngine, QueryEngineProvider, Row, SqlValue, Statement};
pub use txn::{
    AccessMode, DeferrableMode, IsolationLevel, TransactionHandle, TransactionManager,
    TransactionPool, TxConfig, TxError, TxManager, TxOption, UnitOfWork,
};

#[cfg(feature = "postgres")]
pub use postgres::{PgTxHandle, PgTxManager};

/// Txman version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Txman crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
