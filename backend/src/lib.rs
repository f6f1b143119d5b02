//! Engagement Drift Backend Library
//!
//! HTTP service around the shared engagement core: reads logs from
//! PostgreSQL, runs drift analysis, persists nudges and plan state.
//! Modules are public for use in integration tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod telemetry;
