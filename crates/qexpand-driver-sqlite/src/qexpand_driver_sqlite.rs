//! SQLite collaborator for running expanded queries

mod connection;

pub use connection::SqliteConnection;
