pub mod config;
pub mod config_loader;
pub mod record;
pub mod validator;

pub use config::{AppConfig, PubSubConfig, ServerConfig};
pub use config_loader::ConfigLoader;
pub use record::PriceRecord;
pub use validator::{validate_record, FieldError, ValidationError};
