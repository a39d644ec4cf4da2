// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Aggregates, value objects and persistence contracts for volunteer
//! registration and mission participation.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure business rules, no I/O

pub mod volunteer;
pub mod reference;
pub mod mission;
pub mod validation;
pub mod events;
pub mod credentials;
pub mod repository;
pub mod platform_config;
