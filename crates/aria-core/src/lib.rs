pub mod ports;
pub mod event_bus;
pub mod session;
pub mod format;
pub mod links;
pub mod gateway;
pub mod validate;
pub mod controller;

mod tests;
