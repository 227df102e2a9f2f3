pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod storage;
pub mod upstream;
pub mod utils;

pub use crate::api::AppState;
pub use crate::config::AppConfig;
pub use crate::core::{PipelineRunner, SnapshotPipeline};
pub use crate::storage::JsonFileStore;
pub use crate::utils::error::{AppError, Result};
