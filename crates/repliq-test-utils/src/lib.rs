// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test doubles for the Repliq workspace.

pub mod mock_platform;

pub use mock_platform::MockPlatform;
