//! Account datastore adapters implementing [`fedgate_auth::AccountStore`].

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;
