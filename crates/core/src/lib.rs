//! Domain types for recurring attendance check-in.
//!
//! Everything in this crate is free of I/O: models shared by the storage and
//! HTTP layers, the error taxonomy, the time zone evaluator used by the event
//! opener, and the role/permission matrix.

pub mod errors;
pub mod models;
pub mod permissions;
pub mod timezone;
