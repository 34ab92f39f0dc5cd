pub mod api;
pub mod config;
pub mod error;
pub mod generator;
pub mod task;
pub mod upload;

pub use error::{Error, Result};
