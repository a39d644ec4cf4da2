// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! Presentation Layer
//!
//! HTTP surface over the application use cases.

pub mod api;
pub mod error;

pub use api::{app, AppState};
pub use error::ApiError;
