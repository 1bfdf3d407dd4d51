use thiserror::Error;
use tracing::info;

use crate::adapters::build_service::BuildLauncher;
use crate::runtime::build_request::{BuildLaunchRequest, BuildRunHandle};
use crate::runtime::contract::{LifecycleEvent, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    /// The event did not carry what a build launch needs.
    #[error(transparent)]
    InvalidRequest(#[from] ValidationError),
    /// The build service refused the start request; holds its message verbatim.
    #[error("{0}")]
    Rejected(String),
}

/// Starts the build job that finishes the resource and signals CloudFormation
/// on its own.
pub struct BuildTrigger<'a> {
    launcher: &'a dyn BuildLauncher,
}

impl<'a> BuildTrigger<'a> {
    pub fn new(launcher: &'a dyn BuildLauncher) -> Self {
        Self { launcher }
    }

    pub fn start(&self, event: &LifecycleEvent) -> Result<BuildRunHandle, LaunchError> {
        let request = BuildLaunchRequest::from_event(event)?;
        info!(project = %request.project_name, "kicking off build");

        let handle = self
            .launcher
            .start_build(&request)
            .map_err(LaunchError::Rejected)?;

        info!(
            project = %request.project_name,
            build_id = handle.build_id.as_deref().unwrap_or_default(),
            build_arn = handle.build_arn.as_deref().unwrap_or_default(),
            "build accepted"
        );
        Ok(handle)
    }
}
