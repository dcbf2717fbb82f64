//! Shared domain types for the Souk marketplace.
//!
//! This crate contains the entities the rest of the system moves around:
//! User, Item, Comment, the resolved caller Identity, domain events, and
//! the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod comment;
pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod item;
pub mod user;
