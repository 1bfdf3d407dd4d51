//! AWS-oriented adapters and handlers for the build-hook custom resource.
//!
//! This crate owns runtime integration details (the Lambda entry point, the
//! build service, image registry and callback adapters, and logging) and
//! re-exports the lifecycle contract from `cfn_build_hook_core` as `runtime`.

pub mod adapters;
pub mod handlers;
pub mod logging;

pub use cfn_build_hook_core as runtime;
