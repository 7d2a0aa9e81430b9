//! Card repository trait and backends.
//!
//! The generator talks to a [`CardRepository`]; the in-memory backend is
//! always available, the SQLite backend behind the `sqlite` feature.

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;
mod traits;

pub use memory::InMemoryCardRepository;
#[cfg(feature = "sqlite")]
pub use sqlite::{open_database, SqliteCardRepository};
pub use traits::{CardQuery, CardRepository, CommanderFilter, RepositoryError};
