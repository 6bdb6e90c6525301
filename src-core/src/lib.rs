//! My Love core library
//!
//! Local-first storage, daily message rotation and mood sync for the My Love
//! app. The binary and the integration tests both build on this crate.

pub mod app;
pub mod config;
pub mod countdown;
pub mod database;
pub mod dates;
pub mod error;
pub mod rotation;
pub mod services;
pub mod sync;
pub mod validation;
