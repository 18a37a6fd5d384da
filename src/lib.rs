pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod layout;
pub mod model;
pub mod server;

pub use config::{AppConfig, DataConfig, LayoutConfig, ServerConfig};
pub use dataset::Dataset;
pub use error::{MingleError, MingleResult};
pub use model::*;
