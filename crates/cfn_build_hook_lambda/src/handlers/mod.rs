pub mod build_trigger;
pub mod dispatcher;
pub mod image_cleaner;
pub mod response_signaler;
