pub mod api;
pub mod config;
pub mod error;

pub use api::{ApiResult, CallArguments, FlashArrayClient, Reference};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
