mod engine;
mod error;
mod types;

pub use engine::{Engine, EngineBuilder, structured_layout};
pub use error::{CoreError, CoreErrorCode, Result};
pub use types::{FieldEntry, Game};
