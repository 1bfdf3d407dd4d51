pub mod build_service;
pub mod callback;
pub mod image_registry;
