//! SQLite persistence for the session log and random number log.

mod pool;
mod schema;

pub use pool::DatabasePool;
pub use schema::*;
