// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types live in `repliq-core::types` so they can cross the
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use repliq_core::types::{Automation, Connection};
