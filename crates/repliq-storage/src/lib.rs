// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Repliq engagement engine.
//!
//! Holds the three engine tables: automation configuration, per-platform
//! OAuth connections, and the dedup ledger. All access goes through
//! tokio-rusqlite's single background writer thread; the ledger's
//! atomicity contract depends on that.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
