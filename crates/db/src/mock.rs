//! In-memory storage used by tests across the workspace.

mod memory;

pub use memory::InMemoryStore;
