pub mod client;
pub mod error;
pub mod publisher;

pub use client::{PubSubClientConfig, PubSubPublisher};
pub use error::{PublishError, Result};
pub use publisher::Publisher;
