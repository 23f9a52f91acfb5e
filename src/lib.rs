//! Terminal client for the Allure-Lite report service.
//!
//! The library holds the UI-independent core (report list, upload state
//! machine, render-fault guard), the HTTP client for the report API, and the
//! terminal front ends built on top of them.

pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod core;
pub mod logging;
