// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP triggering interface for remindr.
//!
//! An external scheduler calls `prepare`, then `process` until the session
//! reports completion. `status` and `history` are read-only views.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::{auth_middleware, AuthConfig};
pub use server::{build_router, start_server, GatewayState, HealthState, ServerConfig};
