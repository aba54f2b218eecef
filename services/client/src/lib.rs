pub mod adapters;
pub mod auth;
pub mod config;
pub mod error;

pub use auth::AuthFlow;
pub use config::Config;
pub use error::ClientError;
