use thiserror::Error;
use tracing::debug;

use crate::adapters::image_registry::ImageRegistry;
use crate::runtime::contract::LifecycleEvent;
use crate::runtime::settings::registry_property_keys;

/// Most digests the registry accepts in one batch-delete call.
pub const MAX_DIGESTS_PER_DELETE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleanupError {
    #[error("ResourceProperties.{registry} must name the repository to clean up")]
    MissingRepository { registry: String },
    #[error("failed to list images in repository '{repository}': {message}")]
    ListFailed { repository: String, message: String },
    #[error("failed to delete images in repository '{repository}': {message}")]
    DeleteFailed { repository: String, message: String },
}

/// Empties the image repositories named by a Delete event.
///
/// Cleanup is fail-fast: the first repository that cannot be listed or purged
/// stops the loop, and the error is reported back so CloudFormation can retry
/// the Delete.
pub struct ImageCleaner<'a> {
    registry: &'a dyn ImageRegistry,
    account_id: Option<&'a str>,
}

impl<'a> ImageCleaner<'a> {
    pub fn new(registry: &'a dyn ImageRegistry, account_id: Option<&'a str>) -> Self {
        Self {
            registry,
            account_id,
        }
    }

    /// Returns the number of image digests deleted across all repositories.
    pub fn purge_all(&self, event: &LifecycleEvent) -> Result<usize, CleanupError> {
        let mut deleted = 0;
        for registry in registry_property_keys(&event.resource_properties) {
            debug!(registry = %registry, "cleaning up registry");
            let repository = event
                .property_str(&registry)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| CleanupError::MissingRepository {
                    registry: registry.clone(),
                })?;

            deleted += self.purge_one(repository)?;
        }
        Ok(deleted)
    }

    /// An empty repository is a no-op: no delete call is made.
    pub fn purge_one(&self, repository: &str) -> Result<usize, CleanupError> {
        debug!(
            repository,
            account_id = self.account_id.unwrap_or_default(),
            "listing images"
        );
        let digests = self
            .registry
            .list_image_digests(self.account_id, repository)
            .map_err(|message| CleanupError::ListFailed {
                repository: repository.to_string(),
                message,
            })?;

        if digests.is_empty() {
            debug!(repository, "repository is already empty");
            return Ok(0);
        }

        for chunk in digests.chunks(MAX_DIGESTS_PER_DELETE) {
            debug!(repository, count = chunk.len(), "deleting images");
            self.registry
                .batch_delete_images(self.account_id, repository, chunk)
                .map_err(|message| CleanupError::DeleteFailed {
                    repository: repository.to_string(),
                    message,
                })?;
        }

        Ok(digests.len())
    }
}
