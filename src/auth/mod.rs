pub mod extractors;
pub mod oauth1;
pub mod provider;
pub mod services;
pub mod session;
