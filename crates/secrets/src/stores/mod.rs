//! Built-in secret stores (no external dependencies)

mod memory;

pub use memory::InMemorySecretStore;
