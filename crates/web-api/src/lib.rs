pub mod handlers;
pub mod response;
pub mod server;

pub use response::{BatchResponse, RequestError, ResponseMetadata};
pub use server::ApiServer;
