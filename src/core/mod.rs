//! Domain types, configuration and the pure logic shared by every binary.

pub mod config;
pub mod mapping;
pub mod messages;
pub mod models;
pub mod validation;
