//! Entry point for one custom-resource lifecycle event.
//!
//! Create and Update hand completion off to the build job: on a successful
//! launch nothing is signalled here, because the build reports back to
//! CloudFormation itself. Every other outcome, including a launch failure and
//! an unknown request type, is answered synchronously with exactly one
//! response.

use serde_json::Value;
use tracing::{error, info, info_span};

use crate::adapters::build_service::BuildLauncher;
use crate::adapters::callback::CallbackTransport;
use crate::adapters::image_registry::ImageRegistry;
use crate::handlers::build_trigger::BuildTrigger;
use crate::handlers::image_cleaner::ImageCleaner;
use crate::handlers::response_signaler::ResponseSignaler;
use crate::runtime::contract::{
    InvocationContext, LifecycleEvent, RequestType, ResponsePayload, ResponseStatus,
    VALID_REQUEST_TYPES,
};

/// External collaborators for one invocation.
#[derive(Clone, Copy)]
pub struct HandlerDependencies<'a> {
    pub build_launcher: &'a dyn BuildLauncher,
    pub image_registry: &'a dyn ImageRegistry,
    pub callback: &'a dyn CallbackTransport,
}

/// Logs the inbound event as received, then decodes and dispatches it.
///
/// Fails only when the payload is not a lifecycle event at all; such a payload
/// has no identifiers to answer with.
pub fn handle_raw_event(
    event: Value,
    context: &InvocationContext,
    deps: &HandlerDependencies<'_>,
) -> Result<Option<ResponsePayload>, serde_json::Error> {
    let request_id = event
        .get("RequestId")
        .and_then(Value::as_str)
        .unwrap_or("__None__")
        .to_string();
    let span = info_span!("lifecycle_event", request_id = %request_id);
    let _entered = span.enter();

    info!(event = %event, "received lifecycle event");
    let event: LifecycleEvent = serde_json::from_value(event).map_err(|error| {
        error!(error = %error, "payload is not a custom-resource lifecycle event");
        error
    })?;

    Ok(handle_lifecycle_event(&event, context, deps))
}

/// Returns `None` only for a successful Create/Update launch.
pub fn handle_lifecycle_event(
    event: &LifecycleEvent,
    context: &InvocationContext,
    deps: &HandlerDependencies<'_>,
) -> Option<ResponsePayload> {
    let signaler = ResponseSignaler::new(event, deps.callback);

    match event.kind() {
        Some(RequestType::Create | RequestType::Update) => {
            match BuildTrigger::new(deps.build_launcher).start(event) {
                Ok(_) => {
                    info!("build running; the build job will signal CloudFormation");
                    None
                }
                Err(launch_error) => {
                    error!(error = %launch_error, detail = ?launch_error, "build launch failed");
                    Some(signaler.signal(
                        Some(ResponseStatus::Failed),
                        Some(&launch_error.to_string()),
                    ))
                }
            }
        }
        Some(RequestType::Delete) => {
            info!("cleaning up repositories and images");
            let cleaner = ImageCleaner::new(deps.image_registry, context.account_id());
            match cleaner.purge_all(event) {
                Ok(deleted) => {
                    info!(deleted, "cleanup complete; signalling success");
                    Some(signaler.signal(None, None))
                }
                Err(cleanup_error) => {
                    error!(error = %cleanup_error, detail = ?cleanup_error, "image cleanup failed");
                    Some(signaler.signal(
                        Some(ResponseStatus::Failed),
                        Some(&cleanup_error.to_string()),
                    ))
                }
            }
        }
        None => {
            let message = invalid_request_type_message(&event.request_type);
            error!("{message}");
            Some(signaler.signal(Some(ResponseStatus::Failed), Some(&message)))
        }
    }
}

pub fn invalid_request_type_message(request_type: &str) -> String {
    let expected = VALID_REQUEST_TYPES
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Invalid request type: {request_type} (expecting: {expected})")
}
