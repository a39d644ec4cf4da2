// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! Benevole CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Command handlers and server bootstrap for the `benevole` binary

pub mod commands;
pub mod server;
