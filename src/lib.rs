//! fieldcrm - automation filters and message templates for a field-service CRM
//!
//! This crate evaluates automation filter conditions against record snapshots,
//! decides which automation workflows would fire for an event, and renders
//! email/SMS templates by keyword substitution. Nothing is sent or executed.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod output;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::CrmError;
