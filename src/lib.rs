pub mod aggregator;
pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod model;
pub mod request;
pub mod server;
pub mod types;

pub use aggregator::Aggregator;
pub use config::Config;
pub use error::{Error, Result};
