// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Repliq engagement engine.
//!
//! Exposes the webhook verification handshake, the normalized delivery
//! endpoint, the scheduler-driven poll triggers, and a health probe.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod state;

pub use server::{build_router, start_server};
pub use state::AppState;
