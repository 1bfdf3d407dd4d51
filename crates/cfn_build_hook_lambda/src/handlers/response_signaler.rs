use tracing::{debug, error, info};

use crate::adapters::callback::CallbackTransport;
use crate::runtime::callback_url::parse_callback_url;
use crate::runtime::contract::{LifecycleEvent, ResponsePayload, ResponseStatus};

/// Builds lifecycle responses for one event and delivers them to its
/// `ResponseURL`.
///
/// Delivery is fire-and-forget: the status code is not validated, nothing is
/// retried, and transport failures are only logged. The payload is returned to
/// the caller either way.
pub struct ResponseSignaler<'a> {
    event: &'a LifecycleEvent,
    transport: &'a dyn CallbackTransport,
}

impl<'a> ResponseSignaler<'a> {
    pub fn new(event: &'a LifecycleEvent, transport: &'a dyn CallbackTransport) -> Self {
        Self { event, transport }
    }

    pub fn payload(&self, status: Option<ResponseStatus>, reason: Option<&str>) -> ResponsePayload {
        let mut payload = ResponsePayload::for_event(self.event);
        if let Some(status) = status {
            payload.status = status;
        }
        if let Some(reason) = reason {
            payload.reason = Some(reason.to_string());
        }
        payload
    }

    pub fn signal(&self, status: Option<ResponseStatus>, reason: Option<&str>) -> ResponsePayload {
        let payload = self.payload(status, reason);

        let Some(url) = self.event.callback_url() else {
            debug!("event has no ResponseURL; returning response without sending");
            return payload;
        };

        let target = match parse_callback_url(url) {
            Ok(value) => value,
            Err(error) => {
                error!(error = %error, "cannot send CloudFormation response");
                return payload;
            }
        };

        debug!(host = %target.host, "sending CloudFormation response");
        match self.transport.put(&target, &payload.to_json()) {
            Ok(status_code) => info!(status_code, status = ?payload.status, "sent CloudFormation response"),
            Err(error) => error!(error = %error, "failed to send CloudFormation response"),
        }

        payload
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::runtime::callback_url::CallbackTarget;

    struct CapturingTransport {
        requests: Mutex<Vec<(CallbackTarget, String)>>,
        outcome: Result<u16, String>,
    }

    impl CapturingTransport {
        fn new(outcome: Result<u16, String>) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                outcome,
            }
        }

        fn requests(&self) -> Vec<(CallbackTarget, String)> {
            self.requests.lock().expect("poisoned mutex").clone()
        }
    }

    impl CallbackTransport for CapturingTransport {
        fn put(&self, target: &CallbackTarget, body: &str) -> Result<u16, String> {
            self.requests
                .lock()
                .expect("poisoned mutex")
                .push((target.clone(), body.to_string()));
            self.outcome.clone()
        }
    }

    fn sample_event(response_url: Option<&str>) -> LifecycleEvent {
        serde_json::from_value(json!({
            "RequestType": "Delete",
            "ResponseURL": response_url,
            "StackId": "stack-1",
            "RequestId": "req-1",
            "LogicalResourceId": "BuildHook"
        }))
        .expect("event should parse")
    }

    #[test]
    fn puts_json_payload_to_callback_host_and_path() {
        let event = sample_event(Some("https://signal.example.com/stack/req?sig=abc"));
        let transport = CapturingTransport::new(Ok(200));

        let payload = ResponseSignaler::new(&event, &transport).signal(None, None);

        assert_eq!(payload.status, ResponseStatus::Success);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let (target, body) = &requests[0];
        assert_eq!(target.host, "signal.example.com");
        assert_eq!(target.request_target(), "/stack/req?sig=abc");
        assert_eq!(body, &payload.to_json());
    }

    #[test]
    fn overrides_status_and_reason() {
        let event = sample_event(Some("https://signal.example.com/x"));
        let transport = CapturingTransport::new(Ok(200));

        let payload = ResponseSignaler::new(&event, &transport)
            .signal(Some(ResponseStatus::Failed), Some("build rejected"));

        assert_eq!(payload.status, ResponseStatus::Failed);
        assert_eq!(payload.reason.as_deref(), Some("build rejected"));
        let body: serde_json::Value =
            serde_json::from_str(&transport.requests()[0].1).expect("body should be json");
        assert_eq!(body["Status"], "FAILED");
        assert_eq!(body["Reason"], "build rejected");
    }

    #[test]
    fn skips_delivery_without_response_url() {
        let event = sample_event(None);
        let transport = CapturingTransport::new(Ok(200));

        let payload = ResponseSignaler::new(&event, &transport).signal(None, None);

        assert_eq!(payload.stack_id, "stack-1");
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn returns_payload_when_transport_fails() {
        let event = sample_event(Some("https://signal.example.com/x"));
        let transport = CapturingTransport::new(Err("connection reset".to_string()));

        let payload = ResponseSignaler::new(&event, &transport)
            .signal(Some(ResponseStatus::Failed), Some("boom"));

        assert_eq!(payload.status, ResponseStatus::Failed);
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn returns_payload_when_url_is_unusable() {
        let event = sample_event(Some("not a url"));
        let transport = CapturingTransport::new(Ok(200));

        let payload = ResponseSignaler::new(&event, &transport).signal(None, None);

        assert_eq!(payload.status, ResponseStatus::Success);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn identical_signals_produce_identical_bodies() {
        let event = sample_event(Some("https://signal.example.com/x"));
        let transport = CapturingTransport::new(Ok(200));
        let signaler = ResponseSignaler::new(&event, &transport);

        signaler.signal(Some(ResponseStatus::Failed), Some("same"));
        signaler.signal(Some(ResponseStatus::Failed), Some("same"));

        let requests = transport.requests();
        assert_eq!(requests[0].1, requests[1].1);
    }
}
