// Job and candidate profiles: validation, extraction at creation, immutable storage.

pub mod handlers;
pub mod repository;
pub mod service;
