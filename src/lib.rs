pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{CrmClient, InMemoryPlatform, TemplateMailer};
pub use config::{cli::Cli, SyncConfig};
pub use core::{PassSettings, SyncEngine, SyncPass};
pub use utils::error::{Result, SyncError};
