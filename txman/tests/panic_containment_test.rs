// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Panic containment at the transactional boundary

#[path = "testutils/mod.rs"]
mod testutils;

use std::sync::Arc;

use testutils::mock::MockPool;
use txman::{Context, TxError, TxManager};

#[tokio::test]
async fn test_panic_is_converted_and_rolls_back() {
    testutils::init_logging();
    let pool = Arc::new(MockPool::new());
    let journal = pool.journal();
    let manager = TxManager::new(Arc::clone(&pool));

    let result: Result<(), TxError> = manager
        .run_transaction(
            &Context::new(),
            |_tx_ctx| async move { panic!("stock ledger corrupted") },
            &[],
        )
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, TxError::UnitOfWorkPanic(_)));
    assert!(err.to_string().contains("stock ledger corrupted"));
    assert_eq!(journal.events(), vec!["begin", "rollback"]);
}

#[tokio::test]
async fn test_panic_in_nested_call_is_caught_by_the_outer_boundary() {
    let pool = Arc::new(MockPool::new());
    let journal = pool.journal();
    let manager = TxManager::new(Arc::clone(&pool));
    let mgr = &manager;

    let result: Result<(), TxError> = mgr
        .run_transaction(
            &Context::new(),
            |tx_ctx| async move {
                mgr.run_transaction(
                    &tx_ctx,
                    |_inner_ctx| async move { panic!("invariant violated") },
                    &[],
                )
                .await
            },
            &[],
        )
        .await;

    // the nested call performs no finalization; the outer boundary converts
    // the panic and rolls back the single physical transaction
    let err = result.unwrap_err();
    assert!(matches!(err, TxError::UnitOfWorkPanic(_)));
    assert_eq!(journal.count("begin"), 1);
    assert_eq!(journal.count("rollback"), 1);
    assert_eq!(journal.count("commit"), 0);
}

#[tokio::test]
async fn test_panic_with_string_payload_keeps_the_message() {
    let pool = Arc::new(MockPool::new());
    let manager = TxManager::new(Arc::clone(&pool));
    let code = 17;

    let result: Result<(), TxError> = manager
        .run_transaction(
            &Context::new(),
            move |_tx_ctx| async move { panic!("unexpected state {}", code) },
            &[],
        )
        .await;

    assert!(result
        .unwrap_err()
        .to_string()
        .contains("unexpected state 17"));
}
