pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;
