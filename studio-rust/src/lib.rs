pub mod backup;
mod config;
mod errors;
mod gate;
mod generator;
pub mod history;
pub mod prompt;
pub mod render;
pub mod schema;
mod settings;
pub mod storage;
mod studio;
pub mod templates;
mod types;

pub use config::{StudioConfig, API_KEY_VARS, DEFAULT_DATA_DIR, DEFAULT_MODEL};
pub use errors::*;
pub use gate::{AdminGate, DEFAULT_ADMIN_PIN};
pub use generator::{parse_funnel_response, FunnelGenerator};
pub use settings::*;
pub use studio::{Studio, StudioStats};
pub use types::*;
