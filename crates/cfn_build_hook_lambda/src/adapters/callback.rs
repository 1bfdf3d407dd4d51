use crate::runtime::callback_url::CallbackTarget;

pub trait CallbackTransport {
    /// Sends `body` as an HTTPS PUT to `target`. The returned status code is
    /// informational only.
    fn put(&self, target: &CallbackTarget, body: &str) -> Result<u16, String>;
}
