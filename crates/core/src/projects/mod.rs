//! Downloaded project files and their remote counterparts.

mod project_catalog;
mod project_service;
mod projects_model;

pub use project_catalog::{ProjectCatalog, PROJECT_FILES_KEY};
pub use project_service::ProjectService;
pub use projects_model::*;
