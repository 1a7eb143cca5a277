//! Integration tests for predictoor-bot.
//!
//! Exercise the public API end to end: load a config file, resolve the
//! wallet key, and drive the backends through the `Backend` trait.

mod backend_contract;
mod config_files;
