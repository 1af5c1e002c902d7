// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction configuration and options
//!
//! A transaction is configured by folding an ordered sequence of [`TxOption`]
//! values over a zero-valued [`TxConfig`]. Unset fields mean "driver
//! default": the backend only emits configuration SQL for fields that were
//! explicitly set. Options supplied to a nested transactional call are
//! ignored; configuration is an attribute of the outermost boundary only.

use serde::{Deserialize, Serialize};

/// Transaction isolation levels as defined in the SQL standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IsolationLevel {
    /// READ UNCOMMITTED - Allows dirty reads, non-repeatable reads, and phantom reads
    ReadUncommitted,
    /// READ COMMITTED - Prevents dirty reads, but allows non-repeatable reads and phantom reads
    ReadCommitted,
    /// REPEATABLE READ - Prevents dirty reads and non-repeatable reads, but allows phantom reads
    RepeatableRead,
    /// SERIALIZABLE - Prevents dirty reads, non-repeatable reads, and phantom reads
    Serializable,
}

impl IsolationLevel {
    /// Get string representation for display and SQL rendering
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

impl std::fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IsolationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "READ UNCOMMITTED" | "READ_UNCOMMITTED" => Ok(IsolationLevel::ReadUncommitted),
            "READ COMMITTED" | "READ_COMMITTED" => Ok(IsolationLevel::ReadCommitted),
            "REPEATABLE READ" | "REPEATABLE_READ" => Ok(IsolationLevel::RepeatableRead),
            "SERIALIZABLE" => Ok(IsolationLevel::Serializable),
            _ => Err(format!("Unknown isolation level: {}", s)),
        }
    }
}

/// Transaction access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "READ ONLY",
            AccessMode::ReadWrite => "READ WRITE",
        }
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deferrable mode, meaningful only for read-only serializable transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeferrableMode {
    Deferrable,
    NotDeferrable,
}

impl DeferrableMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeferrableMode::Deferrable => "DEFERRABLE",
            DeferrableMode::NotDeferrable => "NOT DEFERRABLE",
        }
    }
}

impl std::fmt::Display for DeferrableMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One configuration mutation, applied in caller order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxOption {
    Isolation(IsolationLevel),
    Access(AccessMode),
    Deferrable(DeferrableMode),
}

/// Transaction configuration record.
///
/// Unset fields are left to the driver's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxConfig {
    pub isolation_level: Option<IsolationLevel>,
    pub access_mode: Option<AccessMode>,
    pub deferrable: Option<DeferrableMode>,
}

impl TxConfig {
    /// Fold an ordered option sequence over a fresh configuration.
    ///
    /// Later options override earlier ones that touch the same field.
    pub fn from_options(options: &[TxOption]) -> Self {
        let mut config = TxConfig::default();
        for option in options {
            config.apply(*option);
        }
        config
    }

    /// Apply one option to this configuration.
    pub fn apply(&mut self, option: TxOption) {
        match option {
            TxOption::Isolation(level) => self.isolation_level = Some(level),
            TxOption::Access(mode) => self.access_mode = Some(mode),
            TxOption::Deferrable(mode) => self.deferrable = Some(mode),
        }
    }

    /// Whether every field is left to the driver's default.
    pub fn is_default(&self) -> bool {
        self.isolation_level.is_none() && self.access_mode.is_none() && self.deferrable.is_none()
    }
}

impl std::fmt::Display for TxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} isolation level, {} access mode",
            self.isolation_level
                .map(|l| l.as_str())
                .unwrap_or("default"),
            self.access_mode.map(|m| m.as_str()).unwrap_or("default"),
        )
    }
}
