//! imgcache - content-addressed image cache server
//!
//! This library crate exposes the configuration and HTTP layer for
//! integration testing. The storage logic lives in `imgcache-store`.

pub mod config;
pub mod server;
