// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery side of remindr: the HTTP messaging client, the capability
//! cache policy and the attempt executor that classifies provider answers.

pub mod cache;
pub mod client;
pub mod executor;

pub use cache::{CacheLookup, CacheWrite, VerificationCache};
pub use client::HttpDeliveryProvider;
pub use executor::{AttemptOptions, Executor, Verification, VerificationSource, CACHED_INCAPABLE};
