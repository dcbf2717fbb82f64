//! Business logic and repository trait definitions for Souk.
//!
//! This crate defines the "ports" (repository traits, credential store,
//! token service) that the infrastructure layer implements, plus the
//! three graph services and the authorization gate that enforce the
//! marketplace invariants. It depends only on `souk-types` -- never on
//! `souk-infra` or any database/IO crate.

pub mod event;
pub mod repository;
pub mod service;
