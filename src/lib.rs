pub mod cli;
pub mod config;
pub mod engine;
pub mod models;
pub mod validation;

pub use validation::{CoreError, Result};
