//! Event distribution for the notification sink.

pub mod bus;

pub use bus::EventBus;
