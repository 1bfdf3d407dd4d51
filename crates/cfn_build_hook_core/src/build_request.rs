use serde::{Deserialize, Serialize};

use crate::callback_url::parse_callback_url;
use crate::contract::{LifecycleEvent, ValidationError};

pub const BUILD_PROJECT_PROPERTY: &str = "BuildProjectName";

pub const ENV_URL_PATH: &str = "url_path";
pub const ENV_URL_QUERY: &str = "url_query";
pub const ENV_SIGNAL_URL: &str = "cfn_signal_url";
pub const ENV_STACK_ID: &str = "cfn_stack_id";
pub const ENV_REQUEST_ID: &str = "cfn_request_id";
pub const ENV_LOGICAL_RESOURCE_ID: &str = "cfn_logical_resource_id";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvironmentOverride {
    pub name: String,
    pub value: String,
}

impl EnvironmentOverride {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// A start-build request carrying everything the build job needs to signal
/// CloudFormation itself once it finishes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildLaunchRequest {
    pub project_name: String,
    pub environment: Vec<EnvironmentOverride>,
}

impl BuildLaunchRequest {
    pub fn from_event(event: &LifecycleEvent) -> Result<Self, ValidationError> {
        let project_name = event
            .property_str(BUILD_PROJECT_PROPERTY)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ValidationError::new(format!(
                    "ResourceProperties.{BUILD_PROJECT_PROPERTY} is required"
                ))
            })?;

        let signal_url = event
            .callback_url()
            .ok_or_else(|| ValidationError::new("ResponseURL is required to launch a build"))?;
        let target = parse_callback_url(signal_url)?;

        Ok(Self {
            project_name: project_name.to_string(),
            environment: vec![
                EnvironmentOverride::new(ENV_URL_PATH, target.path),
                EnvironmentOverride::new(ENV_URL_QUERY, target.query),
                EnvironmentOverride::new(ENV_SIGNAL_URL, signal_url),
                EnvironmentOverride::new(ENV_STACK_ID, event.stack_id.as_str()),
                EnvironmentOverride::new(ENV_REQUEST_ID, event.request_id.as_str()),
                EnvironmentOverride::new(
                    ENV_LOGICAL_RESOURCE_ID,
                    event.logical_resource_id.as_str(),
                ),
            ],
        })
    }

    pub fn environment_value(&self, name: &str) -> Option<&str> {
        self.environment
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }
}

/// What the build service acknowledged for a started build.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildRunHandle {
    pub build_id: Option<String>,
    pub build_arn: Option<String>,
}
