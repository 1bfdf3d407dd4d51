use aws_sdk_codebuild::error::DisplayErrorContext;
use aws_sdk_codebuild::types::{EnvironmentVariable, EnvironmentVariableType};
use aws_sdk_ecr::types::ImageIdentifier;
use cfn_build_hook_lambda::adapters::build_service::BuildLauncher;
use cfn_build_hook_lambda::adapters::callback::CallbackTransport;
use cfn_build_hook_lambda::adapters::image_registry::ImageRegistry;
use cfn_build_hook_lambda::handlers::dispatcher::{handle_raw_event, HandlerDependencies};
use cfn_build_hook_lambda::logging::{init_logging, LogLevelControl};
use cfn_build_hook_lambda::runtime::build_request::{BuildLaunchRequest, BuildRunHandle};
use cfn_build_hook_lambda::runtime::callback_url::CallbackTarget;
use cfn_build_hook_lambda::runtime::contract::InvocationContext;
use cfn_build_hook_lambda::runtime::settings::LogLevels;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::warn;

struct CodeBuildLauncher {
    client: aws_sdk_codebuild::Client,
}

impl BuildLauncher for CodeBuildLauncher {
    fn start_build(&self, request: &BuildLaunchRequest) -> Result<BuildRunHandle, String> {
        let overrides = request
            .environment
            .iter()
            .map(|entry| {
                EnvironmentVariable::builder()
                    .name(&entry.name)
                    .value(&entry.value)
                    .r#type(EnvironmentVariableType::Plaintext)
                    .build()
                    .map_err(|error| {
                        format!("invalid environment override '{}': {error}", entry.name)
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let project_name = request.project_name.clone();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .start_build()
                    .project_name(project_name)
                    .set_environment_variables_override(Some(overrides))
                    .send()
                    .await
                    .map(|output| {
                        let build = output.build_value();
                        BuildRunHandle {
                            build_id: build.and_then(|value| value.id()).map(str::to_string),
                            build_arn: build.and_then(|value| value.arn()).map(str::to_string),
                        }
                    })
                    .map_err(|error| DisplayErrorContext(&error).to_string())
            })
        })
    }
}

struct EcrImageRegistry {
    client: aws_sdk_ecr::Client,
}

impl ImageRegistry for EcrImageRegistry {
    fn list_image_digests(
        &self,
        registry_id: Option<&str>,
        repository: &str,
    ) -> Result<Vec<String>, String> {
        let registry_id = registry_id.map(str::to_string);
        let repository = repository.to_string();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut pages = client
                    .describe_images()
                    .set_registry_id(registry_id)
                    .repository_name(repository)
                    .into_paginator()
                    .send();

                let mut digests = Vec::new();
                while let Some(page) = pages.next().await {
                    let page = page.map_err(|error| DisplayErrorContext(&error).to_string())?;
                    digests.extend(
                        page.image_details()
                            .iter()
                            .filter_map(|detail| detail.image_digest())
                            .map(str::to_string),
                    );
                }
                Ok::<_, String>(digests)
            })
        })
    }

    fn batch_delete_images(
        &self,
        registry_id: Option<&str>,
        repository: &str,
        digests: &[String],
    ) -> Result<(), String> {
        let registry_id = registry_id.map(str::to_string);
        let repository = repository.to_string();
        let image_ids = digests
            .iter()
            .map(|digest| ImageIdentifier::builder().image_digest(digest).build())
            .collect::<Vec<_>>();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .batch_delete_image()
                    .set_registry_id(registry_id)
                    .repository_name(&repository)
                    .set_image_ids(Some(image_ids))
                    .send()
                    .await
                    .map_err(|error| DisplayErrorContext(&error).to_string())?;

                for failure in output.failures() {
                    warn!(
                        repository = %repository,
                        digest = failure
                            .image_id()
                            .and_then(|id| id.image_digest())
                            .unwrap_or_default(),
                        reason = failure.failure_reason().unwrap_or_default(),
                        "image was not deleted"
                    );
                }
                Ok::<_, String>(())
            })
        })
    }
}

struct HttpsCallbackTransport {
    http_client: reqwest::Client,
}

impl CallbackTransport for HttpsCallbackTransport {
    fn put(&self, target: &CallbackTarget, body: &str) -> Result<u16, String> {
        let url = target.https_url();
        let body = body.to_string();
        let client = self.http_client.clone();

        // The presigned URL is signed without a Content-Type, so none is sent.
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put(url)
                    .body(body)
                    .send()
                    .await
                    .map(|response| response.status().as_u16())
                    .map_err(|error| format!("failed to send lifecycle response: {error}"))
            })
        })
    }
}

struct RuntimeDependencies {
    build_launcher: CodeBuildLauncher,
    image_registry: EcrImageRegistry,
    callback: HttpsCallbackTransport,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
    log_control: &LogLevelControl,
) -> Result<Value, Error> {
    if let Err(error) = log_control.apply(&LogLevels::from_raw_event(&event.payload)) {
        warn!(error = %error, "keeping previous log levels");
    }

    let context = InvocationContext::new(event.context.invoked_function_arn.clone());
    let dependencies = HandlerDependencies {
        build_launcher: &deps.build_launcher,
        image_registry: &deps.image_registry,
        callback: &deps.callback,
    };

    let response = handle_raw_event(event.payload, &context, &dependencies)
        .map_err(|error| Error::from(format!("invalid lifecycle event: {error}")))?;

    match response {
        Some(payload) => serde_json::to_value(payload)
            .map_err(|error| Error::from(format!("failed to serialize response: {error}"))),
        None => Ok(Value::Null),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let log_control = init_logging();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        build_launcher: CodeBuildLauncher {
            client: aws_sdk_codebuild::Client::new(&aws_config),
        },
        image_registry: EcrImageRegistry {
            client: aws_sdk_ecr::Client::new(&aws_config),
        },
        callback: HttpsCallbackTransport {
            http_client: reqwest::Client::builder()
                .https_only(true)
                .build()
                .map_err(|error| Error::from(format!("failed to build http client: {error}")))?,
        },
    };

    let deps = &deps;
    let log_control = &log_control;
    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, deps, log_control).await
    }))
    .await
}
