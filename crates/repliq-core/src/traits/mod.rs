// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for platform adapters.

pub mod platform;

pub use platform::PlatformClient;
