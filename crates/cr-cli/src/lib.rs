//! ChainRoute CLI library components.
//!
//! This library exposes the CLI command modules for testing purposes.

pub mod commands;
