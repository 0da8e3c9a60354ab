//! Domain layer - models, errors, repositories and services.

pub mod error;
pub mod model;
pub mod repos;
pub mod service;
