pub mod config;
pub mod error;
pub mod types;

pub use config::{AttachmentConfig, ChatConfig, GeneralConfig, GiasConfig};
pub use error::{GiasError, Result};
pub use types::Timestamp;
