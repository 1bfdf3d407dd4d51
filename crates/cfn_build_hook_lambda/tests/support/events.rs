use cfn_build_hook_lambda::runtime::contract::{InvocationContext, LifecycleEvent};
use serde_json::{json, Value};

pub const RESPONSE_URL: &str =
    "https://cfn-responses.example.com/arn%3Aaws%3Acloudformation/req-1?X-Amz-Signature=abc";
pub const FUNCTION_ARN: &str = "arn:aws:lambda:us-east-1:123456789012:function:build-hook";

pub fn raw_event(request_type: &str, properties: Value) -> Value {
    json!({
        "RequestType": request_type,
        "ServiceToken": FUNCTION_ARN,
        "ResponseURL": RESPONSE_URL,
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/awx/guid",
        "RequestId": "req-1",
        "LogicalResourceId": "BuildHook",
        "ResourceType": "Custom::BuildHook",
        "ResourceProperties": properties
    })
}

pub fn lifecycle_event(request_type: &str, properties: Value) -> LifecycleEvent {
    serde_json::from_value(raw_event(request_type, properties)).expect("event should parse")
}

pub fn registry_properties() -> Value {
    json!({
        "BuildProjectName": "awx-images",
        "AWXTaskRegistry": "repo-a",
        "AWXWebRegistry": "repo-b",
        "MemcachedRegistry": "repo-c",
        "RabbitMQRegistry": "repo-d",
        "SidecarRegistry": "repo-e"
    })
}

pub fn invocation_context() -> InvocationContext {
    InvocationContext::new(FUNCTION_ARN)
}
