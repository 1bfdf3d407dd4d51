/// Container image registry operations used during Delete cleanup.
///
/// `registry_id` is the owning account; `None` lets the service default to the
/// caller's own registry.
pub trait ImageRegistry {
    fn list_image_digests(
        &self,
        registry_id: Option<&str>,
        repository: &str,
    ) -> Result<Vec<String>, String>;

    fn batch_delete_images(
        &self,
        registry_id: Option<&str>,
        repository: &str,
        digests: &[String],
    ) -> Result<(), String>;
}
