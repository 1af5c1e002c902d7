// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Shared utilities for txman integration tests

pub mod mock;

/// Initialize test logging once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
