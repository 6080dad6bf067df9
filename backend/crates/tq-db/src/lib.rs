pub mod connection;
pub mod error;
pub mod repositories;

pub use connection::database::{create_pool, run_migrations};
pub use error::{DbError, Result};
pub use repositories::message_repository::MessageRepository;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
/// Largest page `find_by_tenant` will return.
pub const MAX_PAGE_LIMIT: u32 = 100;
