//! HTTP front end for the points ledger.
//!
//! Decodes query parameters and JSON bodies into typed ledger calls and
//! encodes results and errors back as JSON with distinct status codes.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
