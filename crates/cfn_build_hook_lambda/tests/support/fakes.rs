use std::collections::BTreeMap;
use std::sync::Mutex;

use cfn_build_hook_lambda::adapters::build_service::BuildLauncher;
use cfn_build_hook_lambda::adapters::callback::CallbackTransport;
use cfn_build_hook_lambda::adapters::image_registry::ImageRegistry;
use cfn_build_hook_lambda::handlers::dispatcher::HandlerDependencies;
use cfn_build_hook_lambda::runtime::build_request::{BuildLaunchRequest, BuildRunHandle};
use cfn_build_hook_lambda::runtime::callback_url::CallbackTarget;
use serde_json::Value;

#[derive(Default)]
pub struct FakeBuildService {
    pub rejection: Option<String>,
    requests: Mutex<Vec<BuildLaunchRequest>>,
}

impl FakeBuildService {
    pub fn rejecting(message: &str) -> Self {
        Self {
            rejection: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<BuildLaunchRequest> {
        self.requests.lock().expect("poisoned mutex").clone()
    }
}

impl BuildLauncher for FakeBuildService {
    fn start_build(&self, request: &BuildLaunchRequest) -> Result<BuildRunHandle, String> {
        self.requests
            .lock()
            .expect("poisoned mutex")
            .push(request.clone());
        match &self.rejection {
            Some(message) => Err(message.clone()),
            None => Ok(BuildRunHandle {
                build_id: Some(format!("{}:build-1", request.project_name)),
                build_arn: None,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    List {
        registry_id: Option<String>,
        repository: String,
    },
    Delete {
        registry_id: Option<String>,
        repository: String,
        digests: Vec<String>,
    },
}

#[derive(Default)]
pub struct FakeRegistry {
    images: BTreeMap<String, Vec<String>>,
    failing_list: Option<String>,
    failing_delete: Option<String>,
    calls: Mutex<Vec<RegistryCall>>,
}

impl FakeRegistry {
    pub fn with_images(mut self, repository: &str, digests: &[&str]) -> Self {
        self.images.insert(
            repository.to_string(),
            digests.iter().map(|digest| digest.to_string()).collect(),
        );
        self
    }

    pub fn failing_list(mut self, repository: &str) -> Self {
        self.failing_list = Some(repository.to_string());
        self
    }

    pub fn failing_delete(mut self, repository: &str) -> Self {
        self.failing_delete = Some(repository.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    pub fn listed_repositories(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RegistryCall::List { repository, .. } => Some(repository),
                RegistryCall::Delete { .. } => None,
            })
            .collect()
    }

    pub fn delete_calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RegistryCall::Delete {
                    repository,
                    digests,
                    ..
                } => Some((repository, digests)),
                RegistryCall::List { .. } => None,
            })
            .collect()
    }
}

impl ImageRegistry for FakeRegistry {
    fn list_image_digests(
        &self,
        registry_id: Option<&str>,
        repository: &str,
    ) -> Result<Vec<String>, String> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push(RegistryCall::List {
                registry_id: registry_id.map(str::to_string),
                repository: repository.to_string(),
            });
        if self.failing_list.as_deref() == Some(repository) {
            return Err(format!("The repository '{repository}' does not exist"));
        }
        Ok(self.images.get(repository).cloned().unwrap_or_default())
    }

    fn batch_delete_images(
        &self,
        registry_id: Option<&str>,
        repository: &str,
        digests: &[String],
    ) -> Result<(), String> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push(RegistryCall::Delete {
                registry_id: registry_id.map(str::to_string),
                repository: repository.to_string(),
                digests: digests.to_vec(),
            });
        if self.failing_delete.as_deref() == Some(repository) {
            return Err("AccessDeniedException".to_string());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct CapturingCallback {
    requests: Mutex<Vec<(CallbackTarget, String)>>,
}

impl CapturingCallback {
    pub fn requests(&self) -> Vec<(CallbackTarget, String)> {
        self.requests.lock().expect("poisoned mutex").clone()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .map(|(_, body)| serde_json::from_str(&body).expect("callback body should be json"))
            .collect()
    }
}

impl CallbackTransport for CapturingCallback {
    fn put(&self, target: &CallbackTarget, body: &str) -> Result<u16, String> {
        self.requests
            .lock()
            .expect("poisoned mutex")
            .push((target.clone(), body.to_string()));
        Ok(200)
    }
}

pub struct Harness {
    pub builds: FakeBuildService,
    pub registry: FakeRegistry,
    pub callback: CapturingCallback,
}

impl Harness {
    pub fn new(builds: FakeBuildService, registry: FakeRegistry) -> Self {
        Self {
            builds,
            registry,
            callback: CapturingCallback::default(),
        }
    }

    pub fn deps(&self) -> HandlerDependencies<'_> {
        HandlerDependencies {
            build_launcher: &self.builds,
            image_registry: &self.registry,
            callback: &self.callback,
        }
    }
}
