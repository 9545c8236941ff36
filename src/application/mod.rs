//! Application layer containing the business logic orchestration.
//!
//! This module defines the `SplitService` which acts as the primary entry point
//! for managing groups and expenses and for querying balances. Membership is
//! checked here, before the storage ports or the balance engine are touched.

pub mod service;
