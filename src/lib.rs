pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::AppConfig;
pub use core::{etl::ImportEngine, pipeline::ConversionImportPipeline};
pub use server::{router, AppState};
pub use utils::error::{ImportError, Result};
