//! Data model shared by the engine and the validation rules.

pub mod app_config;
pub mod document;
pub mod env_var;
pub mod port;
pub mod repository;
pub mod system;
pub mod website;

pub use app_config::*;
pub use document::*;
pub use env_var::*;
pub use port::*;
pub use repository::*;
pub use system::*;
pub use website::*;
