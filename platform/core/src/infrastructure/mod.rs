// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure
//!
//! Adapters for the domain contracts: repositories (in-memory and
//! PostgreSQL), password hashing and the in-process event bus.

pub mod db;
pub mod event_bus;
pub mod password;
pub mod repositories;
