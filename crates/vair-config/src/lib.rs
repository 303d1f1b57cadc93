//! Virtual eNB configuration management
//!
//! This crate provides configuration loading and parsing for the virtual air interface:
//! - TOML configuration file parsing
//! - Stack configuration structures for both links

pub mod stack_config;
pub mod toml_config;

pub use stack_config::*;
pub use toml_config::*;
