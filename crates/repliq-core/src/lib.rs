// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Repliq engagement engine.
//!
//! This crate provides the error taxonomy, shared domain types, and the
//! `PlatformClient` capability trait implemented once per social platform.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RepliqError;
pub use traits::PlatformClient;
pub use types::Platform;
