mod api;
mod model;

pub use api::FinishReason;
pub use model::{GoogleModel, GoogleModelOptions};
