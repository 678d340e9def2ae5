#[cfg(test)]
pub mod memory;
pub mod user_repository;

pub use user_repository::{UserRepository, UserStore};
