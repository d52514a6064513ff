// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for reminder sessions, their clients and the delivery cache.

pub mod clients;
pub mod delivery_cache;
pub mod sessions;
