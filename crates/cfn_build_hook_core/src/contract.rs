use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Physical id reported for every response. It is fixed so that repeated
/// signals for the same event serialize identically and CloudFormation never
/// sees a replacement.
pub const PHYSICAL_RESOURCE_ID: &str = "1233244324";

pub const VALID_REQUEST_TYPES: [RequestType; 3] =
    [RequestType::Create, RequestType::Update, RequestType::Delete];

pub type ResourceProperties = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Create" => Some(Self::Create),
            "Update" => Some(Self::Update),
            "Delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CloudFormation custom-resource request as delivered to the function.
///
/// `request_type` keeps the raw text: an unknown type is an expected input
/// that still has to be answered, so it must survive deserialization even
/// when it is not a string at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LifecycleEvent {
    #[serde(rename = "RequestType", deserialize_with = "request_type_text")]
    pub request_type: String,
    #[serde(rename = "StackId")]
    pub stack_id: String,
    #[serde(rename = "RequestId")]
    pub request_id: String,
    #[serde(rename = "LogicalResourceId")]
    pub logical_resource_id: String,
    #[serde(rename = "ResponseURL", default)]
    pub response_url: Option<String>,
    #[serde(rename = "ResourceProperties", default)]
    pub resource_properties: ResourceProperties,
}

// Non-string request types are rendered as JSON text so they reach the
// invalid-type response instead of failing the whole event.
fn request_type_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        other => other.to_string(),
    })
}

impl LifecycleEvent {
    pub fn kind(&self) -> Option<RequestType> {
        RequestType::parse(&self.request_type)
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.resource_properties.get(key).and_then(Value::as_str)
    }

    /// The callback URL, treating an empty string the same as a missing one.
    pub fn callback_url(&self) -> Option<&str> {
        self.response_url
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }
}

/// Identity of the running function, taken from the runtime context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub invoked_function_arn: String,
}

impl InvocationContext {
    pub fn new(invoked_function_arn: impl Into<String>) -> Self {
        Self {
            invoked_function_arn: invoked_function_arn.into(),
        }
    }

    /// Owning account, i.e. the fifth field of
    /// `arn:partition:lambda:region:account:function:name`.
    pub fn account_id(&self) -> Option<&str> {
        self.invoked_function_arn
            .split(':')
            .nth(4)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponsePayload {
    #[serde(rename = "StackId")]
    pub stack_id: String,
    #[serde(rename = "RequestId")]
    pub request_id: String,
    #[serde(rename = "LogicalResourceId")]
    pub logical_resource_id: String,
    #[serde(rename = "Status")]
    pub status: ResponseStatus,
    #[serde(rename = "Reason", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "PhysicalResourceId")]
    pub physical_resource_id: String,
}

impl ResponsePayload {
    /// Base response for an event: SUCCESS, no reason, fixed physical id.
    pub fn for_event(event: &LifecycleEvent) -> Self {
        Self {
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            status: ResponseStatus::Success,
            reason: None,
            physical_resource_id: PHYSICAL_RESOURCE_ID.to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("response payload should serialize")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
