/// Caller resolution and the periodic trigger secret check
pub mod auth;
/// Mapping of domain errors to HTTP responses
pub mod error_handling;
