//! Pension desk: tool functions for a conversational finance agent.
//!
//! Every tool opens its own SQLite connection, runs a handful of
//! parameterized statements and hands back a JSON-ready payload.
//! The only real decision logic lives in `fraud_detection` and
//! `deposit_schedule`; the rest are projections over the store.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod deposit_schedule;
pub mod error;
pub mod fraud_detection;
pub mod registry;
pub mod reports;
pub mod seed;
pub mod store;
pub mod types;
