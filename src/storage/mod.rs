// storage/mod.rs
// SQLite persistence: connection pool and the response cache

pub mod cache;
pub mod pool;

// Re-export commonly used items
pub use cache::ResponseCache;
pub use pool::{init_db_pool_with_path, quote_ident, DbPool};
