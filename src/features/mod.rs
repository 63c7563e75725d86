//! Feature implementations for fieldcrm.
//!
//! This module contains:
//! - Automation workflows (pipelines, triggers, eligibility checks)
//! - Message templates (keywords, rendering, Terms & Conditions)
//! - Shell integration

pub mod automation;
pub mod shell;
pub mod templates;
