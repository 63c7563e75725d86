//! Command-line interface for fieldcrm.

pub mod args;
pub mod commands;
