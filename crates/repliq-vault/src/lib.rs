// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted credential handling for the Repliq engine.
//!
//! OAuth access and refresh tokens are sealed with AES-256-GCM before they
//! touch the database and opened only at the moment an ingestion or action
//! step needs them.

pub mod cipher;
pub mod crypto;

pub use cipher::TokenCipher;
