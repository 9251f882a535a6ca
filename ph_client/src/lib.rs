//! Internal modules for the PortfolioHub client.
//!
//! This library provides configuration, logging, command parsing and the
//! terminal navigator used by the ph_client binary.

pub mod commands;
pub mod config;
pub mod logging;
pub mod terminal;
