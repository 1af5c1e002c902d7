// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction coordinator
//!
//! [`TxManager`] lets the functions of different repositories run within one
//! database transaction. A caller wraps its unit of work in
//! [`TxManager::run_transaction`]; repositories invoked inside it resolve
//! their execution target from the ambient context and stay oblivious to the
//! transaction boundary. A transactional call made while a transaction is
//! already bound to the chain joins it instead of opening a second one, so
//! arbitrarily nested use cases behave as one atomic unit with exactly one
//! commit-or-rollback decision, made by the outermost call.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, warn};

use super::error::TxError;
use super::options::{TxConfig, TxOption};
use super::pool::{TransactionHandle, TransactionPool};
use crate::context::Context;
use crate::engine::{QueryEngine, QueryEngineProvider};

/// A unit of work executed within a transactional scope.
pub type UnitOfWork<'a> = Box<dyn FnOnce(Context) -> BoxFuture<'a, Result<(), TxError>> + Send + 'a>;

/// Object-safe coordinator interface, for callers that inject the manager as
/// a trait object. [`TxManager::run_transaction`] is the generic form.
#[async_trait]
pub trait TransactionManager: QueryEngineProvider {
    async fn in_transaction<'a>(
        &self,
        ctx: &Context,
        work: UnitOfWork<'a>,
        options: &[TxOption],
    ) -> Result<(), TxError>;
}

/// Transaction coordinator over a connection pool.
///
/// Stateless beyond the injected pool; concurrent `run_transaction` calls on
/// independent call chains each get their own physical transaction.
pub struct TxManager<P: TransactionPool + QueryEngine> {
    pool: Arc<P>,
}

impl<P: TransactionPool + QueryEngine> TxManager<P> {
    pub fn new(pool: Arc<P>) -> Self {
        Self { pool }
    }

    /// Run `work` within a transaction.
    ///
    /// If the context already carries an active transaction the work joins
    /// it: the unit of work runs with the same context, its result is
    /// returned verbatim, and `options` are ignored (configuration belongs to
    /// the outermost boundary). Otherwise a transaction is begun with the
    /// folded `options`, bound into a derived context, and finalized exactly
    /// once when the work completes: commit on success, rollback on error or
    /// panic. A panic inside the work never escapes this call; it surfaces as
    /// [`TxError::UnitOfWorkPanic`] after the rollback.
    pub async fn run_transaction<T, F, Fut>(
        &self,
        ctx: &Context,
        work: F,
        options: &[TxOption],
    ) -> Result<T, TxError>
    where
        F: FnOnce(Context) -> Fut + Send,
        Fut: Future<Output = Result<T, TxError>> + Send,
        T: Send,
    {
        // Nested call: the enclosing call owns finalization.
        if ctx.contains::<P::Tx>() {
            if !options.is_empty() {
                debug!("joining active transaction; options ignored");
            }
            return work(ctx.clone()).await;
        }

        let config = TxConfig::from_options(options);
        let tx = match self.pool.begin_tx(&config).await {
            Ok(tx) => Arc::new(tx),
            Err(e) => return Err(TxError::Begin(e.to_string())),
        };
        debug!("transaction begun: {}", config);

        let tx_ctx = ctx.with_shared(Arc::clone(&tx));
        let outcome = match AssertUnwindSafe(work(tx_ctx)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("panic recovered in transactional unit of work: {}", message);
                Err(TxError::UnitOfWorkPanic(message))
            }
        };

        finalize(tx.as_ref(), outcome).await
    }
}

impl<P: TransactionPool + QueryEngine> QueryEngineProvider for TxManager<P> {
    fn query_engine(&self, ctx: &Context) -> Arc<dyn QueryEngine> {
        match ctx.value::<P::Tx>() {
            Some(tx) => tx,
            None => Arc::clone(&self.pool) as Arc<dyn QueryEngine>,
        }
    }
}

#[async_trait]
impl<P: TransactionPool + QueryEngine> TransactionManager for TxManager<P> {
    async fn in_transaction<'a>(
        &self,
        ctx: &Context,
        work: UnitOfWork<'a>,
        options: &[TxOption],
    ) -> Result<(), TxError> {
        self.run_transaction(ctx, |tx_ctx| work(tx_ctx), options).await
    }
}

/// Make the single commit-or-rollback decision for a completed unit of work.
///
/// Precedence: commit failure becomes the call's error and still triggers a
/// rollback attempt (the transaction may be left indeterminate by the
/// driver); a rollback failure supersedes whatever error drove it, keeping
/// the superseded error reachable as its source.
async fn finalize<T, H: TransactionHandle>(
    tx: &H,
    outcome: Result<T, TxError>,
) -> Result<T, TxError> {
    match outcome {
        Ok(value) => match tx.commit().await {
            Ok(()) => {
                debug!("transaction committed");
                Ok(value)
            }
            Err(commit_err) => {
                warn!("commit failed: {}", commit_err);
                let error = TxError::Commit(commit_err.to_string());
                match tx.rollback().await {
                    Ok(()) => Err(error),
                    Err(rollback_err) => Err(TxError::Rollback {
                        reason: rollback_err.to_string(),
                        cause: Box::new(error),
                    }),
                }
            }
        },
        Err(error) => match tx.rollback().await {
            Ok(()) => {
                debug!("transaction rolled back");
                Err(error)
            }
            Err(rollback_err) => {
                warn!("rollback failed: {}", rollback_err);
                Err(TxError::Rollback {
                    reason: rollback_err.to_string(),
                    cause: Box::new(error),
                })
            }
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
