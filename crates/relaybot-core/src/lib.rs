pub mod config;
pub mod error;
pub mod store;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use store::{ConfigStore, StoreError};
