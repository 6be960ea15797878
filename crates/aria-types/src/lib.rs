pub mod message;
pub mod event;
pub mod session;
pub mod config;
pub mod strings;
pub mod wire;
pub mod error;


pub use error::WidgetError;
pub type Result<T> = std::result::Result<T, WidgetError>;
