//! Persistence layer — local storage for fetched notification threads.

pub mod libsql_backend;

pub use libsql_backend::LibSqlStore;
