//! predictoor-bot — prediction-market bot skeleton
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod backend;
pub mod config;
pub mod runner;
