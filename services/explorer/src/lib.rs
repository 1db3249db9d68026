//! Floodsar explorer service library.
//!
//! Exposes the service modules so the binary and the integration tests
//! share one router and one dispatcher.

pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod notify;
pub mod pages;
pub mod queue;
pub mod requestor;
pub mod server;
pub mod socket;
pub mod state;
