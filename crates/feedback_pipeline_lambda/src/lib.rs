//! AWS-oriented adapters and handlers for the feedback pipeline.
//!
//! This crate owns runtime integration details (Lambda handlers, collaborator
//! traits for the SNS topic and the DynamoDB table, environment configuration
//! and logging). The contract types live in `feedback_pipeline_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod telemetry;
