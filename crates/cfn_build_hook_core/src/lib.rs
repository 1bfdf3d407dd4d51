//! Shared custom-resource lifecycle primitives.
//!
//! This crate owns the CloudFormation event and response contracts, callback
//! URL parsing, and the build launch request. It intentionally excludes AWS SDK
//! and Lambda runtime concerns.

pub mod build_request;
pub mod callback_url;
pub mod contract;
pub mod settings;
