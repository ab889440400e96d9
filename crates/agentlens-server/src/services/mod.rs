//! Request-independent logic behind the HTTP handlers.

pub mod query;
pub mod tables;
