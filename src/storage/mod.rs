//! SQLite-backed persistence for the wordlist subsystem.

mod migrations;
mod pool;

pub use migrations::run_migrations;
pub use pool::init_db_pool;
